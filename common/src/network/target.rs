//! # Scan Target Model
//!
//! Parses the target expressions accepted on the command line.
//!
//! A target is written `ADDR[-END][/MASK]`:
//! * A single IP address (e.g., `192.168.1.7`).
//! * A range, where the end may be abbreviated (e.g., `192.168.1.1-100`, `192.168.3.0-4.255`).
//! * A subnet, as a prefix length or dotted mask (e.g., `192.168.1.0/24`, `10.0.0.0/255.0.0.0`).
//! * A range restricted to a subnet (e.g., `192.168.1.200-254/26`).
//!
//! Turning an expression into concrete addresses is the job of [`crate::network::range`].

use std::fmt;
use std::str::FromStr;

use crate::error::{AddrError, RangeError};
use crate::network::addr::{Addr4, SubnetMask4};

/// End of a range expression, with the number of dotted tokens the user actually wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndAddr {
    pub addr: Addr4,
    /// 1 for `-50`, 2 for `-4.255`, 4 for a full address.
    pub tokens: usize,
}

/// A parsed, not yet resolved, target expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeExpr {
    pub start: Addr4,
    pub end: Option<EndAddr>,
    pub mask: Option<SubnetMask4>,
}

impl RangeExpr {
    pub fn host(start: Addr4) -> Self {
        Self { start, end: None, mask: None }
    }
}

impl FromStr for RangeExpr {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        let (body, mask) = match s.split_once('/') {
            Some((_, mask_str)) if mask_str.contains('-') => {
                return Err(RangeError::InvalidEnd(format!("mask must follow the range: {s}")));
            }
            Some((body, mask_str)) => (body, Some(format!("/{mask_str}").parse::<SubnetMask4>()?)),
            None => (s, None),
        };

        let Some((start_str, end_str)) = body.split_once('-') else {
            return Ok(Self { start: body.parse()?, end: None, mask });
        };

        let start: Addr4 = start_str.parse()?;
        let end = parse_range_end_addr(end_str, start, s)?;

        Ok(Self { start, end: Some(end), mask })
    }
}

impl fmt::Display for RangeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.start)?;
        if let Some(end) = self.end {
            write!(f, "-{}", end.addr)?;
        }
        if let Some(mask) = self.mask {
            write!(f, "/{}", mask.prefix_size())?;
        }
        Ok(())
    }
}

/// Helper to parse the end address of a range.
///
/// Handles abbreviated forms like "192.168.1.1-50" (implies 192.168.1.50)
/// and full forms like "192.168.1.1-192.168.1.255". Missing leading octets are
/// borrowed from the start address.
fn parse_range_end_addr(end_str: &str, start: Addr4, original_s: &str) -> Result<EndAddr, RangeError> {
    if end_str.is_empty() {
        return Err(RangeError::InvalidEnd(format!("end range cannot be empty: {original_s}")));
    }

    let tokens: Vec<&str> = end_str.split('.').collect();
    if tokens.len() > Addr4::OCTET_COUNT {
        return Err(RangeError::InvalidEnd(format!("end range has too many octets: {end_str}")));
    }

    let mut end_octets = start.octets();
    let first = Addr4::OCTET_COUNT - tokens.len();
    for (slot, token) in end_octets[first..].iter_mut().zip(&tokens) {
        if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
            return Err(RangeError::InvalidEnd(format!("invalid end range '{end_str}'")));
        }
        *slot = token
            .parse::<u8>()
            .map_err(|_| AddrError::OutOfRange(format!("octet {token} in {original_s:?}")))?;
    }

    let [a, b, c, d] = end_octets;
    Ok(EndAddr { addr: Addr4::new(a, b, c, d), tokens: tokens.len() })
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;

    fn end(s: &str) -> Result<EndAddr, RangeError> {
        parse_range_end_addr(s, Addr4::new(192, 168, 1, 10), "192.168.1.10-?")
    }

    #[test]
    fn test_parse_range_end_addr_helper() {
        // Test partial 1-octet end
        assert_eq!(end("50"), Ok(EndAddr { addr: Addr4::new(192, 168, 1, 50), tokens: 1 }));

        // Test partial 2-octet end
        assert_eq!(end("2.66"), Ok(EndAddr { addr: Addr4::new(192, 168, 2, 66), tokens: 2 }));

        // Test partial 3-octet end
        assert_eq!(end("10.2.1"), Ok(EndAddr { addr: Addr4::new(192, 10, 2, 1), tokens: 3 }));

        // Test full end
        assert_eq!(
            end("10.20.30.40"),
            Ok(EndAddr { addr: Addr4::new(10, 20, 30, 40), tokens: 4 })
        );

        // --- Error Cases ---

        // Invalid octet
        assert!(matches!(end("2.256"), Err(RangeError::Addr(AddrError::OutOfRange(_)))));

        // Too many octets
        assert!(matches!(end("1.2.3.4.5"), Err(RangeError::InvalidEnd(_))));

        // Empty octets
        assert!(matches!(end(""), Err(RangeError::InvalidEnd(_))));
        assert!(matches!(end("1..2"), Err(RangeError::InvalidEnd(_))));
        assert!(matches!(end("x"), Err(RangeError::InvalidEnd(_))));
    }

    #[test]
    fn test_from_str_full_parsing() {
        let host: RangeExpr = "192.168.1.7".parse().unwrap();
        assert_eq!(host, RangeExpr::host(Addr4::new(192, 168, 1, 7)));

        let cidr: RangeExpr = "10.0.0.0/8".parse().unwrap();
        assert_eq!(cidr.end, None);
        assert_eq!(cidr.mask.map(SubnetMask4::prefix_size), Some(8));

        let dotted: RangeExpr = "10.0.0.0/255.255.0.0".parse().unwrap();
        assert_eq!(dotted.mask.map(SubnetMask4::prefix_size), Some(16));

        let range: RangeExpr = "192.168.3.0-4.255".parse().unwrap();
        assert_eq!(range.end.map(|e| e.addr), Some(Addr4::new(192, 168, 4, 255)));
        assert_eq!(range.end.map(|e| e.tokens), Some(2));
        assert_eq!(range.mask, None);

        let both: RangeExpr = "192.168.1.200-254/26".parse().unwrap();
        assert_eq!(both.start, Addr4::new(192, 168, 1, 200));
        assert_eq!(both.end.map(|e| e.addr), Some(Addr4::new(192, 168, 1, 254)));
        assert_eq!(both.mask.map(SubnetMask4::prefix_size), Some(26));
        assert_eq!(both.to_string(), "192.168.1.200-192.168.1.254/26");
    }

    #[test]
    fn test_from_str_errors() {
        assert!(matches!(
            "not-an-ip".parse::<RangeExpr>(),
            Err(RangeError::Addr(AddrError::InvalidArgument(_)))
        ));
        assert!(matches!(
            "10.0.0.1/33".parse::<RangeExpr>(),
            Err(RangeError::Addr(AddrError::OutOfRange(_)))
        ));
        assert!(matches!(
            "10.0.0.256-1.1.1.1".parse::<RangeExpr>(),
            Err(RangeError::Addr(AddrError::OutOfRange(_)))
        ));
        assert!(matches!(
            "10.0.0.0/255.0.255.0".parse::<RangeExpr>(),
            Err(RangeError::Addr(AddrError::NonContiguousMask(_)))
        ));
        assert!(matches!("10.0.0.0/24-50".parse::<RangeExpr>(), Err(RangeError::InvalidEnd(_))));
    }
}
