//! Disconnect sweep.
//!
//! When a connection's transport link is lost, every enabled channel is
//! visited exactly once: if the connection was a member, the remaining
//! enabled members get a `UserLeft` broadcast (payload identical to a
//! normal leave) and the membership is removed; the operator slot is
//! cleared regardless, as a stray operator entry without membership is
//! possible in principle and cheap to sweep.
//!
//! The disconnecting user's identity comes from the roster itself, not the
//! user lookup: by the time the sweep runs, the user subsystem may already
//! have dropped its record.

use super::ChannelComponent;
use crate::metrics;
use crate::observer::EventBuffer;
use crate::user::ConnectionId;
use chatter_proto::{ChannelMessageType, ChannelResult, MemberBroadcast};
use tracing::{debug, info};

pub(super) fn run(component: &ChannelComponent, conn: ConnectionId) {
    metrics::record_sweep();
    let mut events = EventBuffer::new();
    let mut left = 0usize;

    for channel in component.directory.enabled_channels() {
        let mut roster = channel.roster();

        let Some(user) = roster.members.get(&conn).cloned() else {
            roster.operators.remove(&conn);
            continue;
        };

        let broadcast = MemberBroadcast {
            result: ChannelResult::UserLeft,
            username: user.username.clone(),
            hostname: user.hostname.clone(),
        }
        .encode();
        let mut fanout = 0;
        for (member_conn, member) in &roster.members {
            if *member_conn == conn {
                continue;
            }
            if member.is_enabled() {
                component.send(*member_conn, ChannelMessageType::LeaveChannel, broadcast.clone());
                fanout += 1;
            }
        }

        events.left(channel.name(), &user);
        roster.remove(conn);
        let emptied = roster.members.is_empty();
        if emptied {
            channel.disable();
        }
        drop(roster);

        metrics::record_fanout(fanout);
        if emptied {
            component.directory.evict(&channel);
            metrics::channel_closed();
            info!(channel = %channel.name(), "channel disabled, last member disconnected");
        }
        left += 1;
    }

    events.dispatch(&component.observers_snapshot());
    debug!(conn = %conn, channels = left, "disconnect sweep complete");
}
