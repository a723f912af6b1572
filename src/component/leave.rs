//! Leave handling.
//!
//! Notify-then-remove: the `UserLeft` broadcast goes to every enabled
//! member while the leaver is still on the roster, so the leaver hears its
//! own departure as one of the recipients. Only then is the membership
//! (and any operator slot) removed, the channel disabled if it emptied, and
//! the direct `Ok` reply sent.

use super::ChannelComponent;
use crate::error::HandlerResult;
use crate::metrics;
use crate::observer::EventBuffer;
use crate::user::{ChatUser, ConnectionId};
use chatter_proto::{
    ChannelMessageType, ChannelResult, LeaveReply, LeaveRequest, MemberBroadcast,
};
use std::sync::Arc;
use tracing::{debug, info};

pub(super) fn handle_leave(
    component: &ChannelComponent,
    conn: ConnectionId,
    request: LeaveRequest,
) -> HandlerResult<()> {
    let user = component.lookup_user(conn)?;
    let mut events = EventBuffer::new();

    let result = run(component, conn, &user, &request.channel_name, &mut events);

    metrics::record_leave_result(result);
    events.dispatch(&component.observers_snapshot());
    debug!(conn = %conn, channel = %request.channel_name, result = %result, "leave handled");
    Ok(())
}

fn run(
    component: &ChannelComponent,
    conn: ConnectionId,
    user: &Arc<ChatUser>,
    channel_name: &str,
    events: &mut EventBuffer,
) -> ChannelResult {
    if !user.is_identified() {
        return refuse(component, conn, user, ChannelResult::NotIdentified, events);
    }
    if !channel_name.contains('#') {
        return refuse(
            component,
            conn,
            user,
            ChannelResult::InvalidChannelName,
            events,
        );
    }

    // A disabled channel is indistinguishable from an absent one.
    let Some(channel) = component.directory.find(channel_name) else {
        return refuse(
            component,
            conn,
            user,
            ChannelResult::InvalidChannelName,
            events,
        );
    };

    let mut roster = channel.roster();
    if !roster.members.contains_key(&conn) {
        drop(roster);
        return refuse(component, conn, user, ChannelResult::NotInChannel, events);
    }

    let broadcast = MemberBroadcast {
        result: ChannelResult::UserLeft,
        username: user.username.clone(),
        hostname: user.hostname.clone(),
    }
    .encode();
    let mut fanout = 0;
    for (member_conn, member) in &roster.members {
        if member.is_enabled() {
            component.send(*member_conn, ChannelMessageType::LeaveChannel, broadcast.clone());
            fanout += 1;
        }
    }

    events.left(channel.name(), user);
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
        info!(channel = %channel.name(), "channel disabled, last member left");
    }

    component.send(
        conn,
        ChannelMessageType::CompleteLeaveChannel,
        LeaveReply {
            result: ChannelResult::Ok,
            channel_name: Some(channel.name().to_string()),
        }
        .encode(),
    );
    events.leave_completed(ChannelResult::Ok, user);
    info!(conn = %conn, channel = %channel.name(), user = %user.username, "user left channel");
    ChannelResult::Ok
}

fn refuse(
    component: &ChannelComponent,
    conn: ConnectionId,
    user: &Arc<ChatUser>,
    result: ChannelResult,
    events: &mut EventBuffer,
) -> ChannelResult {
    component.send(
        conn,
        ChannelMessageType::CompleteLeaveChannel,
        LeaveReply::status(result).encode(),
    );
    events.leave_completed(result, user);
    result
}
