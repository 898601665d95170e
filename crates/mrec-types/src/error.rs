use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("unexpected end of input while reading {0}")]
    UnexpectedEof(&'static str),

    #[error("varint overflows 64 bits")]
    VarintOverflow,

    #[error("{0} trailing byte(s) after value")]
    TrailingBytes(usize),

    #[error("invalid byte length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("unsupported CID version {0}")]
    UnsupportedCidVersion(u64),

    #[error("invalid multibase string: {0}")]
    InvalidMultibase(String),
}
