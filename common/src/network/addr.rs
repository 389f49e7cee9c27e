//! # IPv4 Address Model
//!
//! Plain value types for IPv4 addresses and subnet masks.
//!
//! Both types wrap the raw 32-bit value, the first octet being the most significant.
//! Bitwise operators never fail and always work on that raw value; only the string and
//! prefix constructors validate their input.

use std::fmt;
use std::net::Ipv4Addr;
use std::ops::{BitAnd, BitOr, BitXor, Not};
use std::str::FromStr;

use crate::error::AddrError;

/// An IPv4 address.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Addr4(u32);

impl Addr4 {
    pub const OCTET_COUNT: usize = 4;
    pub const BIT_COUNT: u32 = 32;

    /// All bits 0.
    pub const NULL: Addr4 = Addr4(0);
    /// All bits 1.
    pub const MAX: Addr4 = Addr4(u32::MAX);
    pub const BROADCAST: Addr4 = Addr4(u32::MAX);

    pub const fn new(hi: u8, mid_hi: u8, mid_lo: u8, lo: u8) -> Self {
        Self(u32::from_be_bytes([hi, mid_hi, mid_lo, lo]))
    }

    pub const fn from_value(value: u32) -> Self {
        Self(value)
    }

    pub const fn value(self) -> u32 {
        self.0
    }

    pub const fn octets(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }

    pub const fn octet_high(self) -> u8 {
        self.octets()[0]
    }

    pub const fn octet_mid_hi(self) -> u8 {
        self.octets()[1]
    }

    pub const fn octet_mid_lo(self) -> u8 {
        self.octets()[2]
    }

    pub const fn octet_low(self) -> u8 {
        self.octets()[3]
    }
}

impl FromStr for Addr4 {
    type Err = AddrError;

    /// Expected format: `a.b.c.d`, four unsigned decimal tokens.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens: Vec<&str> = s.split('.').collect();
        if tokens.len() != Self::OCTET_COUNT || !tokens.iter().all(|t| is_uint(t)) {
            return Err(AddrError::InvalidArgument(format!("not an IPv4 address: {s:?}")));
        }

        let mut octets = [0u8; 4];
        for (octet, token) in octets.iter_mut().zip(&tokens) {
            *octet = parse_octet(token)
                .ok_or_else(|| AddrError::OutOfRange(format!("octet {token} in {s:?}")))?;
        }
        Ok(Self(u32::from_be_bytes(octets)))
    }
}

impl fmt::Display for Addr4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.octets();
        write!(f, "{a}.{b}.{c}.{d}")
    }
}

impl From<u32> for Addr4 {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<Ipv4Addr> for Addr4 {
    fn from(addr: Ipv4Addr) -> Self {
        Self(u32::from(addr))
    }
}

impl From<Addr4> for Ipv4Addr {
    fn from(addr: Addr4) -> Self {
        Ipv4Addr::from(addr.0)
    }
}

/// A subnet mask: leading 1-bits followed only by 0-bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubnetMask4(u32);

impl SubnetMask4 {
    /// `/0`
    pub const NULL: SubnetMask4 = SubnetMask4(0);
    /// `/32`
    pub const MAX: SubnetMask4 = SubnetMask4(u32::MAX);

    /// Builds the mask for the CIDR prefix length `/size`.
    pub fn from_prefix(size: u8) -> Result<Self, AddrError> {
        match u32::from(size) {
            0 => Ok(Self::NULL),
            n if n <= Addr4::BIT_COUNT => Ok(Self(u32::MAX << (Addr4::BIT_COUNT - n))),
            _ => Err(AddrError::OutOfRange(format!("prefix size /{size}"))),
        }
    }

    pub fn from_value(value: u32) -> Result<Self, AddrError> {
        let host = !value;
        // the host part must be 2^k - 1
        if host & host.wrapping_add(1) != 0 {
            return Err(AddrError::NonContiguousMask(Addr4(value).to_string()));
        }
        Ok(Self(value))
    }

    pub const fn value(self) -> u32 {
        self.0
    }

    pub const fn as_addr(self) -> Addr4 {
        Addr4(self.0)
    }

    /// Number of leading one-bits, the `X` in `<IP>/X`.
    pub const fn prefix_size(self) -> u8 {
        self.0.leading_ones() as u8
    }

    /// Complement of the mask, isolates the host identifier.
    pub const fn host_mask(self) -> Addr4 {
        Addr4(!self.0)
    }
}

impl Default for SubnetMask4 {
    fn default() -> Self {
        Self::MAX
    }
}

impl TryFrom<Addr4> for SubnetMask4 {
    type Error = AddrError;

    fn try_from(addr: Addr4) -> Result<Self, Self::Error> {
        Self::from_value(addr.value())
    }
}

impl FromStr for SubnetMask4 {
    type Err = AddrError;

    /// Accepts `X.X.X.X`, `/X`, `/X.X.X.X` or `<IP>/X`. The IP part of the last form is
    /// only checked for validity.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((ip, mask)) = s.split_once('/') else {
            return Self::try_from(s.parse::<Addr4>()?);
        };

        if !ip.is_empty() {
            ip.parse::<Addr4>()?;
        }

        if is_uint(mask) {
            let size: u8 = mask
                .parse()
                .map_err(|_| AddrError::OutOfRange(format!("prefix size /{mask}")))?;
            Self::from_prefix(size)
        } else if mask.contains('.') {
            Self::try_from(mask.parse::<Addr4>()?)
        } else {
            Err(AddrError::InvalidArgument(format!("not a subnet mask: {s:?}")))
        }
    }
}

impl fmt::Display for SubnetMask4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_addr().fmt(f)
    }
}

/// Formats `addr` in CIDR notation, e.g. `192.168.1.1/24`.
pub fn cidr_string(addr: Addr4, mask: SubnetMask4) -> String {
    format!("{addr}/{}", mask.prefix_size())
}

fn is_uint(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}

fn parse_octet(token: &str) -> Option<u8> {
    token.parse::<u32>().ok().and_then(|v| u8::try_from(v).ok())
}

macro_rules! impl_bit_op {
    ($trait:ident, $fn:ident, $op:tt, $lhs:ty, $rhs:ty, $out:ident) => {
        impl $trait<$rhs> for $lhs {
            type Output = $out;

            fn $fn(self, rhs: $rhs) -> $out {
                $out(self.0 $op rhs.0)
            }
        }
    };
}

impl_bit_op!(BitAnd, bitand, &, Addr4, Addr4, Addr4);
impl_bit_op!(BitOr, bitor, |, Addr4, Addr4, Addr4);
impl_bit_op!(BitXor, bitxor, ^, Addr4, Addr4, Addr4);

impl_bit_op!(BitAnd, bitand, &, Addr4, SubnetMask4, Addr4);
impl_bit_op!(BitOr, bitor, |, Addr4, SubnetMask4, Addr4);
impl_bit_op!(BitXor, bitxor, ^, Addr4, SubnetMask4, Addr4);
impl_bit_op!(BitAnd, bitand, &, SubnetMask4, Addr4, Addr4);
impl_bit_op!(BitOr, bitor, |, SubnetMask4, Addr4, Addr4);
impl_bit_op!(BitXor, bitxor, ^, SubnetMask4, Addr4, Addr4);

// AND and OR of two prefixes is again a prefix, XOR generally is not
impl_bit_op!(BitAnd, bitand, &, SubnetMask4, SubnetMask4, SubnetMask4);
impl_bit_op!(BitOr, bitor, |, SubnetMask4, SubnetMask4, SubnetMask4);
impl_bit_op!(BitXor, bitxor, ^, SubnetMask4, SubnetMask4, Addr4);

impl Not for Addr4 {
    type Output = Addr4;

    fn not(self) -> Addr4 {
        Addr4(!self.0)
    }
}

impl Not for SubnetMask4 {
    type Output = Addr4;

    fn not(self) -> Addr4 {
        Addr4(!self.0)
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
