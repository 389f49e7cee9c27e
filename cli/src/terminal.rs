pub mod colors;
pub mod hexdump;
pub mod logging;
pub mod print;
