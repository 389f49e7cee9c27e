//! Shared value types for arpscout.
//!
//! Everything in here is pure: address arithmetic, range expressions, the scan result
//! record and the vendor value type. Nothing in this crate touches the network except
//! [`network::interface`], which only reads the local interface table.

pub mod config;
pub mod error;
pub mod network;
pub mod vendors;
