//! # Range Resolution
//!
//! Turns a [`RangeExpr`] into the ordered list of host addresses to probe.
//!
//! When no mask is given one is inferred:
//! * `a.b.c.0` on its own is treated as `a.b.c.0/24`.
//! * Any other lone address is a single host.
//! * A range inside one `/24` of `192.168.0.0/16` assumes that `/24` ([`private_block_mask`]).
//! * Any other range assumes `32 - 8 * n`, `n` being the number of octets written after the `-`.
//!
//! These rules cover the common cases only, they are not a general CIDR parser.
//!
//! Network and broadcast addresses of the mask are dropped unless the expression names
//! exactly one address.

use crate::error::RangeError;
use crate::network::addr::{Addr4, SubnetMask4};
use crate::network::target::RangeExpr;

/// Largest number of addresses a single expression may expand to.
pub const MAX_RANGE_SIZE: u64 = 1 << 24;

const PRIVATE_BLOCK: Addr4 = Addr4::new(192, 168, 0, 0);
const PRIVATE_BLOCK_PREFIX: u8 = 16;
const DEFAULT_PREFIX: u8 = 24;

/// Addresses to scan, in ascending order, and the mask used to filter them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRange {
    pub targets: Vec<Addr4>,
    pub mask: SubnetMask4,
    /// The mask was not written by the user.
    pub mask_inferred: bool,
}

impl ResolvedRange {
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn first(&self) -> Option<Addr4> {
        self.targets.first().copied()
    }

    pub fn last(&self) -> Option<Addr4> {
        self.targets.last().copied()
    }
}

/// The `192.168.0.0/16` convention: home networks are almost always a `/24`.
///
/// Returns `/24` if `start` lies in `192.168.0.0/16` and `end` in the same `/24`.
pub fn private_block_mask(start: Addr4, end: Addr4) -> Option<SubnetMask4> {
    let block = SubnetMask4::from_prefix(PRIVATE_BLOCK_PREFIX).ok()?;
    let net = SubnetMask4::from_prefix(DEFAULT_PREFIX).ok()?;

    ((start & block) == PRIVATE_BLOCK && (start & net) == (end & net)).then_some(net)
}

/// Expands `expr` into concrete host addresses.
///
/// A reversed range (end before start) yields an empty result; reporting that is up to
/// the caller.
pub fn resolve(expr: &RangeExpr) -> Result<ResolvedRange, RangeError> {
    // `/32` behaves exactly like no mask at all
    let given = expr.mask.filter(|m| *m != SubnetMask4::MAX);
    let start = expr.start;

    let (mask, count): (SubnetMask4, u64) = match (expr.end, given) {
        (Some(end), mask) => {
            let mask = match mask.or_else(|| private_block_mask(start, end.addr)) {
                Some(m) => m,
                None => mask_for_tokens(end.tokens)?,
            };
            let count = if end.addr < start {
                0
            } else {
                u64::from(end.addr.value() - start.value()) + 1
            };
            (mask, count)
        }
        (None, None) if start.octet_low() == 0 => {
            let mask = SubnetMask4::from_prefix(DEFAULT_PREFIX)?;
            (mask, block_size(mask))
        }
        (None, None) => {
            return Ok(ResolvedRange {
                targets: vec![start],
                mask: SubnetMask4::from_prefix(8)?,
                mask_inferred: true,
            });
        }
        (None, Some(mask)) if start.octet_low() == 0 => (mask, block_size(mask)),
        (None, Some(mask)) => {
            let end = start | mask.host_mask();
            (mask, u64::from(end.value() - start.value()) + 1)
        }
    };

    if count > MAX_RANGE_SIZE {
        return Err(RangeError::TooLarge(count));
    }

    let host_mask = mask.host_mask();
    let first = u64::from(start.value());
    let targets = (first..first + count)
        .filter_map(|v| u32::try_from(v).ok())
        .map(Addr4::from)
        .filter(|addr| count == 1 || !is_reserved_host(*addr, host_mask))
        .collect();

    Ok(ResolvedRange { targets, mask, mask_inferred: given.is_none() })
}

/// True for the all-zero (network) and all-one (broadcast) host id.
fn is_reserved_host(addr: Addr4, host_mask: Addr4) -> bool {
    let host = addr & host_mask;
    host == Addr4::NULL || host == host_mask
}

fn mask_for_tokens(tokens: usize) -> Result<SubnetMask4, RangeError> {
    let written = u32::try_from(tokens)
        .ok()
        .filter(|t| (1..=4).contains(t))
        .ok_or_else(|| RangeError::InvalidEnd(format!("{tokens} octets in end address")))?;
    let prefix = Addr4::BIT_COUNT - 8 * written;
    Ok(SubnetMask4::from_prefix(prefix as u8)?)
}

fn block_size(mask: SubnetMask4) -> u64 {
    u64::from(mask.host_mask().value()) + 1
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
