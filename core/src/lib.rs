//! Scanning machinery of arpscout: host discovery, the worker engine, vendor resolution
//! and the per-expression [`discovery::DiscoveryService`] entry point.

pub mod discovery;
pub mod network;
pub mod probe;
pub mod scanner;
pub mod vendors;
