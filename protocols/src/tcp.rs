use pnet::packet::tcp::TcpPacket;

use crate::frame::DecodeError;

pub const MIN_HEADER_LEN: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TcpHeader {
    pub src_port: u16,
    pub dst_port: u16,
    pub sequence: u32,
    /// Header length in 32-bit words.
    pub data_offset: u8,
    pub flags: u8,
}

impl TcpHeader {
    pub fn header_len(&self) -> usize {
        usize::from(self.data_offset) * 4
    }

    pub fn decode(data: &[u8]) -> Result<(TcpHeader, &[u8]), DecodeError> {
        let tcp = TcpPacket::new(data).ok_or(DecodeError::Truncated {
            layer: "tcp",
            need: MIN_HEADER_LEN,
            have: data.len(),
        })?;

        let header = TcpHeader {
            src_port: tcp.get_source(),
            dst_port: tcp.get_destination(),
            sequence: tcp.get_sequence(),
            data_offset: tcp.get_data_offset(),
            // CWR..FIN, the low byte of the flags field
            flags: data[13],
        };

        if header.header_len() < MIN_HEADER_LEN {
            return Err(DecodeError::Unsupported(format!("TCP data offset of {}", header.data_offset)));
        }
        DecodeError::ensure_len("tcp options", data, header.header_len())?;

        Ok((header, &data[header.header_len()..]))
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
