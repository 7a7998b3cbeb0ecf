//! Protocol error types.

use thiserror::Error;

/// Errors produced while encoding or decoding BCP messages.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("invalid signature: {0:02x?}")]
    InvalidSignature([u8; 8]),

    #[error("version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: u8, actual: u8 },

    #[error("checksum mismatch: expected {expected:#010x}, computed {actual:#010x}")]
    ChecksumMismatch { expected: u32, actual: u32 },

    #[error("unknown type tag: {0:#04x}")]
    UnknownTag(u8),

    #[error("invalid size width: {0} (must be 1, 2, 4 or 8)")]
    InvalidSizeWidth(u8),

    #[error("negative content size: {0}")]
    NegativeSize(i64),

    #[error("truncated input while reading {0}")]
    Truncated(&'static str),

    #[error("{0} unconsumed bytes after content")]
    TrailingBytes(usize),

    #[error("map content holds an odd number of arguments: {0}")]
    OddMapEntryCount(usize),

    #[error("invalid UTF-8 in {0}")]
    InvalidUtf8(&'static str),

    #[error("nesting exceeds {0} levels")]
    NestingTooDeep(usize),

    #[error("unsupported value kind: {0}")]
    UnsupportedType(&'static str),

    #[error("compression error: {0}")]
    Compression(#[from] std::io::Error),
}

/// Non-fatal subversion disagreement observed while decoding a message.
///
/// Decoding still completes; the mismatch is returned next to the decoded
/// call so callers can decide policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("subversion mismatch: expected {expected}, got {actual}")]
pub struct SubversionMismatch {
    pub expected: u8,
    pub actual: u8,
}
