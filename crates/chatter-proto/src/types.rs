//! Numeric identifiers used on the wire by the channel component.

use std::fmt;

/// Component routing tag carried on every frame.
///
/// The transport dispatches an inbound frame to the component whose tag it
/// carries; components never see frames addressed elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ComponentType {
    /// Connection/system housekeeping.
    System = 0,
    /// Identity and authentication.
    User = 1,
    /// Channel membership and routing.
    Channel = 2,
}

impl ComponentType {
    /// Numeric wire value.
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Parse a wire value. Returns `None` for tags this build does not know.
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::System),
            1 => Some(Self::User),
            2 => Some(Self::Channel),
            _ => None,
        }
    }
}

/// Message types understood (inbound) or produced (outbound) by the
/// channel component.
///
/// `JoinChannel`/`LeaveChannel` double as broadcast keys on the way out, as
/// the original protocol reuses the request type for the matching
/// member-facing notification. The `Complete*` types are reply-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ChannelMessageType {
    /// Join request (inbound) / `UserJoined` broadcast (outbound).
    JoinChannel = 0,
    /// Join reply to the requester.
    CompleteJoinChannel = 1,
    /// Leave request (inbound) / `UserLeft` broadcast (outbound).
    LeaveChannel = 2,
    /// Leave reply to the requester.
    CompleteLeaveChannel = 3,
}

impl ChannelMessageType {
    /// Numeric wire value.
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Parse a wire value.
    pub const fn from_u16(value: u16) -> Option<Self> {
        match value {
            0 => Some(Self::JoinChannel),
            1 => Some(Self::CompleteJoinChannel),
            2 => Some(Self::LeaveChannel),
            3 => Some(Self::CompleteLeaveChannel),
            _ => None,
        }
    }
}

/// Result codes shared by join and leave, replies and broadcasts.
///
/// `UserJoined` and `UserLeft` are broadcast-only: they never appear in a
/// direct reply, only in notifications fanned out to channel members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ChannelResult {
    /// Operation succeeded.
    Ok = 0,
    /// Join created the channel; the requester is its sole operator.
    ChannelCreated = 1,
    /// Requester has not identified with the user component.
    NotIdentified = 2,
    /// Channel name is missing the `#` marker, or no such channel exists.
    InvalidChannelName = 3,
    /// Requester is already a member of the channel.
    AlreadyInChannel = 4,
    /// Requester is not a member of the channel.
    NotInChannel = 5,
    /// Broadcast: a user joined the channel.
    UserJoined = 6,
    /// Broadcast: a user left the channel.
    UserLeft = 7,
}

impl ChannelResult {
    /// Numeric wire value.
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Parse a wire value.
    pub const fn from_u16(value: u16) -> Option<Self> {
        match value {
            0 => Some(Self::Ok),
            1 => Some(Self::ChannelCreated),
            2 => Some(Self::NotIdentified),
            3 => Some(Self::InvalidChannelName),
            4 => Some(Self::AlreadyInChannel),
            5 => Some(Self::NotInChannel),
            6 => Some(Self::UserJoined),
            7 => Some(Self::UserLeft),
            _ => None,
        }
    }

    /// Static label for metrics and logs.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::ChannelCreated => "channel_created",
            Self::NotIdentified => "not_identified",
            Self::InvalidChannelName => "invalid_channel_name",
            Self::AlreadyInChannel => "already_in_channel",
            Self::NotInChannel => "not_in_channel",
            Self::UserJoined => "user_joined",
            Self::UserLeft => "user_left",
        }
    }
}

impl fmt::Display for ChannelResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
