use thiserror::Error;

/// Construction failures of the address value types.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddrError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("out of range: {0}")]
    OutOfRange(String),

    #[error("non-contiguous subnet mask: {0}")]
    NonContiguousMask(String),
}

/// Failures while turning a range expression into a target list.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RangeError {
    #[error(transparent)]
    Addr(#[from] AddrError),

    #[error("invalid end address: {0}")]
    InvalidEnd(String),

    #[error("range of {0} addresses is too large")]
    TooLarge(u64),
}
