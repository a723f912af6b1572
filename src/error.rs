//! Unified error handling for the channel core.
//!
//! Protocol-level outcomes (`NotIdentified`, `AlreadyInChannel`, ...) are not
//! errors here: they travel back to the requester as a
//! [`ChannelResult`](chatter_proto::ChannelResult) inside a normal reply.
//! `HandlerError` covers only the fatal class, where the caller is expected
//! to drop the connection rather than answer it.

use crate::user::ConnectionId;
use chatter_proto::ProtoError;
use thiserror::Error;

/// Fatal errors crossing the component boundary.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The inbound payload failed to decode; the peer violated the protocol.
    #[error("malformed payload: {0}")]
    Decode(#[from] ProtoError),

    /// No identity record exists for a connection that must have one.
    #[error("no user record for connection {0}")]
    UnknownConnection(ConnectionId),
}

impl HandlerError {
    /// Static error code for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Decode(_) => "decode",
            Self::UnknownConnection(_) => "unknown_connection",
        }
    }
}

/// Result type for component entry points.
pub type HandlerResult<T> = Result<T, HandlerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes() {
        let err = HandlerError::UnknownConnection(ConnectionId::new(7));
        assert_eq!(err.error_code(), "unknown_connection");
        assert_eq!(format!("{err}"), "no user record for connection 7");

        let err = HandlerError::from(ProtoError::UnknownResult(9));
        assert_eq!(err.error_code(), "decode");
    }
}
