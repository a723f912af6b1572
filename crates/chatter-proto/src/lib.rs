//! # chatter-proto
//!
//! Wire codec for the chatter protocol.
//!
//! The chatter wire format routes every inbound frame by a component tag and a
//! per-component numeric message type; payloads are flat sequences of
//! fixed-width big-endian integers and length-prefixed UTF-8 strings. This
//! crate provides:
//!
//! - [`BufferReader`] / [`BufferWriter`] - the typed buffer primitives
//! - [`ComponentType`], [`ChannelMessageType`], [`ChannelResult`] - the
//!   numeric identifiers of the channel component
//! - Typed payload structs ([`JoinRequest`], [`JoinReply`], [`LeaveRequest`],
//!   [`LeaveReply`], [`MemberBroadcast`]) with `encode`/`decode`
//!
//! Decoding is strict: a truncated or malformed buffer fails the whole
//! message, and the server treats that as a protocol violation by the peer.

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod buffer;
pub mod error;
pub mod payload;
pub mod types;

pub use self::buffer::{BufferReader, BufferWriter};
pub use self::error::{ProtoError, Result};
pub use self::payload::{Identity, JoinReply, JoinRequest, LeaveReply, LeaveRequest, MemberBroadcast};
pub use self::types::{ChannelMessageType, ChannelResult, ComponentType};
