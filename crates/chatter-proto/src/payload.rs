//! Typed payloads for the channel component.
//!
//! Field order is fixed by the wire protocol and must not change:
//!
//! - Join request: `channel_name`
//! - Join reply: `result`, then on `Ok` only: `operator_count`,
//!   `operator_count x (username, hostname)`, `member_count`,
//!   `member_count x (username, hostname)`
//! - Leave request: `channel_name`
//! - Leave reply: `result`, then on `Ok` only: `channel_name`
//! - Member broadcast (`UserJoined`/`UserLeft`): `result`, `username`,
//!   `hostname`

use crate::buffer::{BufferReader, BufferWriter};
use crate::error::{ProtoError, Result};
use crate::types::ChannelResult;
use bytes::Bytes;

/// A user's display identity as carried in replies and broadcasts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Display username.
    pub username: String,
    /// Display hostname.
    pub hostname: String,
}

impl Identity {
    /// Construct an identity pair.
    pub fn new(username: impl Into<String>, hostname: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            hostname: hostname.into(),
        }
    }

    fn write(&self, w: &mut BufferWriter) {
        w.write_string(&self.username);
        w.write_string(&self.hostname);
    }

    fn read(r: &mut BufferReader<'_>) -> Result<Self> {
        Ok(Self {
            username: r.read_string()?,
            hostname: r.read_string()?,
        })
    }
}

fn read_identity_list(r: &mut BufferReader<'_>) -> Result<Vec<Identity>> {
    let count = r.read_u32()?;
    // Each entry needs at least two length prefixes; anything beyond that
    // claim is a hostile count.
    if count as usize > r.remaining() / 8 {
        return Err(ProtoError::ImplausibleCount { count });
    }
    let mut list = Vec::with_capacity(count as usize);
    for _ in 0..count {
        list.push(Identity::read(r)?);
    }
    Ok(list)
}

fn read_result(r: &mut BufferReader<'_>) -> Result<ChannelResult> {
    let raw = r.read_u16()?;
    ChannelResult::from_u16(raw).ok_or(ProtoError::UnknownResult(raw))
}

/// Inbound request to join a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinRequest {
    /// Requested channel name.
    pub channel_name: String,
}

impl JoinRequest {
    /// Encode to a wire payload.
    pub fn encode(&self) -> Bytes {
        let mut w = BufferWriter::with_capacity(4 + self.channel_name.len());
        w.write_string(&self.channel_name);
        w.freeze()
    }

    /// Decode from a wire payload.
    pub fn decode(payload: &[u8]) -> Result<Self> {
        let mut r = BufferReader::new(payload);
        Ok(Self {
            channel_name: r.read_string()?,
        })
    }
}

/// Reply to a join request.
///
/// The operator and member snapshots are present only when `result` is
/// [`ChannelResult::Ok`]; every other outcome is a bare result code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinReply {
    /// Terminal result of the join.
    pub result: ChannelResult,
    /// Current operators, present on `Ok`.
    pub operators: Vec<Identity>,
    /// Current members (including the joiner), present on `Ok`.
    pub members: Vec<Identity>,
}

impl JoinReply {
    /// A reply carrying only a result code.
    pub fn status(result: ChannelResult) -> Self {
        Self {
            result,
            operators: Vec::new(),
            members: Vec::new(),
        }
    }

    /// Encode to a wire payload.
    pub fn encode(&self) -> Bytes {
        let mut w = BufferWriter::new();
        w.write_u16(self.result.as_u16());
        if self.result == ChannelResult::Ok {
            w.write_u32(self.operators.len() as u32);
            for identity in &self.operators {
                identity.write(&mut w);
            }
            w.write_u32(self.members.len() as u32);
            for identity in &self.members {
                identity.write(&mut w);
            }
        }
        w.freeze()
    }

    /// Decode from a wire payload.
    pub fn decode(payload: &[u8]) -> Result<Self> {
        let mut r = BufferReader::new(payload);
        let result = read_result(&mut r)?;
        if result != ChannelResult::Ok {
            return Ok(Self::status(result));
        }
        let operators = read_identity_list(&mut r)?;
        let members = read_identity_list(&mut r)?;
        Ok(Self {
            result,
            operators,
            members,
        })
    }
}

/// Inbound request to leave a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaveRequest {
    /// Channel name to leave.
    pub channel_name: String,
}

impl LeaveRequest {
    /// Encode to a wire payload.
    pub fn encode(&self) -> Bytes {
        let mut w = BufferWriter::with_capacity(4 + self.channel_name.len());
        w.write_string(&self.channel_name);
        w.freeze()
    }

    /// Decode from a wire payload.
    pub fn decode(payload: &[u8]) -> Result<Self> {
        let mut r = BufferReader::new(payload);
        Ok(Self {
            channel_name: r.read_string()?,
        })
    }
}

/// Reply to a leave request. The channel name echoes back only on `Ok`.
///
/// An absent name on `Ok` is encoded as an empty string; channel names are
/// never empty, so the two forms round-trip cleanly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaveReply {
    /// Terminal result of the leave.
    pub result: ChannelResult,
    /// The channel that was left, present on `Ok`.
    pub channel_name: Option<String>,
}

impl LeaveReply {
    /// A reply carrying only a result code.
    pub fn status(result: ChannelResult) -> Self {
        Self {
            result,
            channel_name: None,
        }
    }

    /// Encode to a wire payload.
    pub fn encode(&self) -> Bytes {
        let mut w = BufferWriter::new();
        w.write_u16(self.result.as_u16());
        if self.result == ChannelResult::Ok {
            w.write_string(self.channel_name.as_deref().unwrap_or(""));
        }
        w.freeze()
    }

    /// Decode from a wire payload.
    pub fn decode(payload: &[u8]) -> Result<Self> {
        let mut r = BufferReader::new(payload);
        let result = read_result(&mut r)?;
        let channel_name = if result == ChannelResult::Ok {
            let name = r.read_string()?;
            (!name.is_empty()).then_some(name)
        } else {
            None
        };
        Ok(Self {
            result,
            channel_name,
        })
    }
}

/// Broadcast sent to every member when a user joins or leaves.
///
/// `result` is [`ChannelResult::UserJoined`] or [`ChannelResult::UserLeft`];
/// the identity is the affected user's, not the recipient's.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberBroadcast {
    /// `UserJoined` or `UserLeft`.
    pub result: ChannelResult,
    /// Username of the user who joined or left.
    pub username: String,
    /// Hostname of the user who joined or left.
    pub hostname: String,
}

impl MemberBroadcast {
    /// Encode to a wire payload.
    pub fn encode(&self) -> Bytes {
        let mut w =
            BufferWriter::with_capacity(2 + 8 + self.username.len() + self.hostname.len());
        w.write_u16(self.result.as_u16());
        w.write_string(&self.username);
        w.write_string(&self.hostname);
        w.freeze()
    }

    /// Decode from a wire payload.
    pub fn decode(payload: &[u8]) -> Result<Self> {
        let mut r = BufferReader::new(payload);
        Ok(Self {
            result: read_result(&mut r)?,
            username: r.read_string()?,
            hostname: r.read_string()?,
        })
    }
}
