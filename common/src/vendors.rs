//! # Vendor Values
//!
//! What the scanner knows about the manufacturer behind a MAC address.

use std::fmt;
use std::str::FromStr;

use crate::error::AddrError;

/// Where a [`Vendor`] came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum VendorSource {
    Cache,
    Api,
    #[default]
    None,
}

impl VendorSource {
    /// Single character annotation printed next to the vendor name.
    pub fn symbol(self) -> char {
        match self {
            VendorSource::Cache => 'c',
            VendorSource::Api => 'a',
            VendorSource::None => '-',
        }
    }
}

impl fmt::Display for VendorSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A 24-bit RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const fn from_u32(value: u32) -> Self {
        let [_, r, g, b] = value.to_be_bytes();
        Self(r, g, b)
    }

    pub const fn to_u32(self) -> u32 {
        u32::from_be_bytes([0, self.0, self.1, self.2])
    }

    /// Parses a CSS `#rrggbb` string. Black, the "no colour" value, becomes `None`.
    pub fn from_css(s: &str) -> Result<Option<Rgb>, AddrError> {
        let hex = s
            .trim()
            .strip_prefix('#')
            .filter(|h| h.len() == 6)
            .ok_or_else(|| AddrError::InvalidArgument(format!("not a CSS colour: {s:?}")))?;
        let value = u32::from_str_radix(hex, 16)
            .map_err(|e| AddrError::InvalidArgument(format!("{s:?}: {e}")))?;
        Ok((value != 0).then_some(Rgb::from_u32(value)))
    }

    /// CSS form of an optional colour, `#000000` for none.
    pub fn to_css(colour: Option<Rgb>) -> String {
        format!("#{:06x}", colour.map_or(0, Rgb::to_u32))
    }
}

impl FromStr for Rgb {
    type Err = AddrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Rgb::from_css(s)?.unwrap_or(Rgb(0, 0, 0)))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.to_u32())
    }
}

/// Vendor of a hardware address. An empty name means unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vendor {
    pub name: String,
    pub colour: Option<Rgb>,
    pub source: VendorSource,
}

impl Vendor {
    pub fn new(name: impl Into<String>, colour: Option<Rgb>, source: VendorSource) -> Self {
        Self { name: name.into(), colour, source }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
    }

    pub fn with_source(mut self, source: VendorSource) -> Self {
        self.source = source;
        self
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
