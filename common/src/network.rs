pub mod addr;
pub mod host;
pub mod interface;
pub mod mac;
pub mod range;
pub mod target;
