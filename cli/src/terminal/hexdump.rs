use std::fmt::Write as _;

const ROW_LEN: usize = 16;

/// Classic 16 bytes per row dump with offset and ASCII column.
///
/// ```text
/// 00000  ff ff ff ff ff ff 02 00  00 00 00 01 08 06 00 01  | ................
/// ```
pub fn hexdump(data: &[u8]) -> Vec<String> {
    if data.is_empty() {
        return vec![format_row(0, &[])];
    }
    data.chunks(ROW_LEN)
        .enumerate()
        .map(|(i, chunk)| format_row(i * ROW_LEN, chunk))
        .collect()
}

fn format_row(offset: usize, chunk: &[u8]) -> String {
    let mut row = format!("{offset:05x} ");
    for (col, byte) in chunk.iter().enumerate() {
        if col == ROW_LEN / 2 {
            row.push(' ');
        }
        let _ = write!(row, " {byte:02x}");
    }

    if chunk.len() <= ROW_LEN / 2 {
        row.push(' ');
    }
    row.push_str(&"   ".repeat(ROW_LEN - chunk.len()));

    row.push_str("  | ");
    row.extend(chunk.iter().map(|&b| if (0x20..0x7f).contains(&b) { b as char } else { '.' }));
    row
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
