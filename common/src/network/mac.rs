//! # Hardware Addresses
//!
//! EUI-48 values and the IEEE address blocks used to attribute them to a vendor.

use std::fmt;
use std::ops::BitAnd;
use std::str::FromStr;

use pnet::util::MacAddr;

use crate::error::AddrError;

/// A 48-bit hardware address, first byte most significant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HardwareAddr([u8; 6]);

impl HardwareAddr {
    pub const BYTE_COUNT: usize = 6;

    pub const NULL: HardwareAddr = HardwareAddr([0; 6]);
    pub const BROADCAST: HardwareAddr = HardwareAddr([0xff; 6]);

    /// Top 24 bits, an MA-L assignment.
    pub const OUI_MASK: HardwareAddr = HardwareAddr([0xff, 0xff, 0xff, 0x00, 0x00, 0x00]);
    /// Top 28 bits, an MA-M assignment.
    pub const OUI28_MASK: HardwareAddr = HardwareAddr([0xff, 0xff, 0xff, 0xf0, 0x00, 0x00]);
    /// Top 36 bits, an MA-S assignment.
    pub const OUI36_MASK: HardwareAddr = HardwareAddr([0xff, 0xff, 0xff, 0xff, 0xf0, 0x00]);

    pub const fn new(octets: [u8; 6]) -> Self {
        Self(octets)
    }

    /// Uses the low 48 bits of `value`.
    pub const fn from_u64(value: u64) -> Self {
        let b = value.to_be_bytes();
        Self([b[2], b[3], b[4], b[5], b[6], b[7]])
    }

    pub const fn to_u64(self) -> u64 {
        let [a, b, c, d, e, f] = self.0;
        u64::from_be_bytes([0, 0, a, b, c, d, e, f])
    }

    pub const fn octets(self) -> [u8; 6] {
        self.0
    }

    pub fn is_null(self) -> bool {
        self == Self::NULL
    }

    /// I/G bit set: multicast or broadcast.
    pub const fn is_group(self) -> bool {
        self.0[0] & 0x01 != 0
    }

    pub const fn is_individual(self) -> bool {
        !self.is_group()
    }

    /// U/L bit set: locally administered.
    pub const fn is_local(self) -> bool {
        self.0[0] & 0x02 != 0
    }

    pub const fn is_universal(self) -> bool {
        !self.is_local()
    }

    /// Company ID: the low nibble of the first byte is `1010`.
    pub const fn is_cid(self) -> bool {
        self.0[0] & 0x0f == 0x0a
    }

    /// Uppercase hex, octets separated by `delimiter` if given.
    pub fn to_string_with(self, delimiter: Option<char>) -> String {
        let mut out = String::with_capacity(17);
        for (i, byte) in self.0.iter().enumerate() {
            if i > 0 {
                if let Some(d) = delimiter {
                    out.push(d);
                }
            }
            out.push_str(&format!("{byte:02X}"));
        }
        out
    }
}

impl FromStr for HardwareAddr {
    type Err = AddrError;

    /// Accepts 12 hex digits, optionally split by `:`, `-` or `.`
    /// (`00:1A:2B:3C:4D:5E`, `00-1a-2b-3c-4d-5e`, `001a.2b3c.4d5e`, `001A2B3C4D5E`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits: String = s.chars().filter(|c| !matches!(c, ':' | '-' | '.')).collect();
        if digits.len() != 12 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(AddrError::InvalidArgument(format!("not a MAC address: {s:?}")));
        }

        let mut octets = [0u8; 6];
        for (i, octet) in octets.iter_mut().enumerate() {
            *octet = u8::from_str_radix(&digits[2 * i..2 * i + 2], 16)
                .map_err(|e| AddrError::InvalidArgument(format!("{s:?}: {e}")))?;
        }
        Ok(Self(octets))
    }
}

impl fmt::Display for HardwareAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_with(Some(':')))
    }
}

impl BitAnd for HardwareAddr {
    type Output = HardwareAddr;

    fn bitand(self, rhs: HardwareAddr) -> HardwareAddr {
        Self::from_u64(self.to_u64() & rhs.to_u64())
    }
}

impl From<MacAddr> for HardwareAddr {
    fn from(mac: MacAddr) -> Self {
        let MacAddr(a, b, c, d, e, f) = mac;
        Self([a, b, c, d, e, f])
    }
}

impl From<HardwareAddr> for MacAddr {
    fn from(addr: HardwareAddr) -> Self {
        let [a, b, c, d, e, f] = addr.0;
        MacAddr::new(a, b, c, d, e, f)
    }
}

/// IEEE registry block an address prefix was assigned from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddrBlock {
    /// MA-L, 24-bit prefix.
    Oui,
    /// MA-M, 28-bit prefix.
    Oui28,
    /// MA-S, 36-bit prefix.
    Oui36,
    /// Company ID, never attributed to a vendor.
    Cid,
}

impl AddrBlock {
    /// Most specific first, the order the cache is consulted in.
    pub const CACHEABLE: [AddrBlock; 3] = [AddrBlock::Oui36, AddrBlock::Oui28, AddrBlock::Oui];

    pub fn mask(self) -> HardwareAddr {
        match self {
            AddrBlock::Oui | AddrBlock::Cid => HardwareAddr::OUI_MASK,
            AddrBlock::Oui28 => HardwareAddr::OUI28_MASK,
            AddrBlock::Oui36 => HardwareAddr::OUI36_MASK,
        }
    }

    /// Maps a registry label as returned by lookup APIs (`oui`, `ma-m`, ...).
    pub fn from_label(label: &str) -> Option<AddrBlock> {
        match label.to_ascii_lowercase().as_str() {
            "oui" | "oui24" | "ma-l" => Some(AddrBlock::Oui),
            "oui28" | "ma-m" => Some(AddrBlock::Oui28),
            "oui36" | "ma-s" => Some(AddrBlock::Oui36),
            "cid" => Some(AddrBlock::Cid),
            _ => None,
        }
    }
}

impl fmt::Display for AddrBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AddrBlock::Oui => "MA-L",
            AddrBlock::Oui28 => "MA-M",
            AddrBlock::Oui36 => "MA-S",
            AddrBlock::Cid => "CID",
        })
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
