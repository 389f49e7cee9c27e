use colored::Color;

pub const PRIMARY: Color = Color::BrightGreen;
pub const SEPARATOR: Color = Color::BrightBlack;
pub const HIGHLIGHT: Color = Color::BrightWhite;
pub const CID: Color = Color::Yellow;
pub const CHECKSUM_BAD: Color = Color::Red;
