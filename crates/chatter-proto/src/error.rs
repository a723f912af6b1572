//! Error types for the chatter wire codec.

use thiserror::Error;

/// Convenience type alias for Results using [`ProtoError`].
pub type Result<T, E = ProtoError> = std::result::Result<T, E>;

/// Errors raised while decoding a typed buffer.
///
/// Every variant is terminal for the message being decoded: the caller is
/// expected to discard the frame and treat the peer as misbehaving.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProtoError {
    /// The buffer ended before the requested field was complete.
    #[error("truncated buffer: needed {needed} more bytes at offset {offset}")]
    Truncated {
        /// Bytes missing to complete the read.
        needed: usize,
        /// Offset at which the read started.
        offset: usize,
    },

    /// A length-prefixed string was not valid UTF-8.
    #[error("string at offset {offset} is not valid utf-8")]
    InvalidUtf8 {
        /// Offset of the string's length prefix.
        offset: usize,
    },

    /// A declared string length exceeds the sane per-field limit.
    #[error("string length {length} exceeds limit {limit}")]
    StringTooLong {
        /// Declared length in bytes.
        length: usize,
        /// Maximum accepted length.
        limit: usize,
    },

    /// A result code not present in [`ChannelResult`](crate::ChannelResult).
    #[error("unknown result code {0}")]
    UnknownResult(u16),

    /// A count field implies more entries than the buffer can hold.
    #[error("list count {count} exceeds remaining buffer")]
    ImplausibleCount {
        /// The declared entry count.
        count: u32,
    },
}
