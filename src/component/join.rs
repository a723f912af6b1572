//! Join handling.
//!
//! Sequencing for a non-creating join: the requester's `Ok` reply (with the
//! operator and member snapshots) goes out first, then the `UserJoined`
//! broadcast to every enabled member, the new one included. Both happen
//! under the roster guard so no concurrent join or leave can produce a torn
//! member view; the sends themselves are queue pushes and never block.

use super::ChannelComponent;
use crate::error::HandlerResult;
use crate::metrics;
use crate::observer::EventBuffer;
use crate::user::{ChatUser, ConnectionId};
use chatter_proto::{
    ChannelMessageType, ChannelResult, JoinReply, JoinRequest, MemberBroadcast,
};
use std::sync::Arc;
use tracing::{debug, info};

pub(super) fn handle_join(
    component: &ChannelComponent,
    conn: ConnectionId,
    request: JoinRequest,
) -> HandlerResult<()> {
    let user = component.lookup_user(conn)?;
    let mut events = EventBuffer::new();

    let result = run(component, conn, &user, &request.channel_name, &mut events);

    metrics::record_join_result(result);
    events.dispatch(&component.observers_snapshot());
    debug!(conn = %conn, channel = %request.channel_name, result = %result, "join handled");
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

    loop {
        let (channel, created) = match component.directory.find(channel_name) {
            Some(channel) => (channel, false),
            None => {
                let max = component.config().limits.max_channels;
                if max > 0 && component.directory.len() >= max {
                    debug!(channel = %channel_name, max, "channel cap reached, refusing create");
                    return refuse(
                        component,
                        conn,
                        user,
                        ChannelResult::InvalidChannelName,
                        events,
                    );
                }
                component
                    .directory
                    .create_or_get(channel_name, conn, Arc::clone(user))
            }
        };

        if created {
            metrics::channel_opened();
            component.send(
                conn,
                ChannelMessageType::CompleteJoinChannel,
                JoinReply::status(ChannelResult::ChannelCreated).encode(),
            );
            events.created(channel.name());
            events.joined(channel.name(), user);
            events.join_completed(ChannelResult::ChannelCreated, user);
            info!(conn = %conn, channel = %channel.name(), user = %user.username, "channel created");
            return ChannelResult::ChannelCreated;
        }

        let mut roster = channel.roster();
        // A concurrent last-member leave may have disabled and evicted the
        // channel between the lookup and this lock; start over against the
        // current directory state.
        if !channel.is_enabled() {
            drop(roster);
            continue;
        }

        if roster.members.contains_key(&conn) {
            drop(roster);
            return refuse(
                component,
                conn,
                user,
                ChannelResult::AlreadyInChannel,
                events,
            );
        }

        roster.members.insert(conn, Arc::clone(user));

        // Reply with a consistent snapshot of both lists, then broadcast.
        let reply = JoinReply {
            result: ChannelResult::Ok,
            operators: roster.operator_identities(),
            members: roster.member_identities(),
        };
        component.send(conn, ChannelMessageType::CompleteJoinChannel, reply.encode());

        // One shared payload, one queue push per enabled member.
        let broadcast = MemberBroadcast {
            result: ChannelResult::UserJoined,
            username: user.username.clone(),
            hostname: user.hostname.clone(),
        }
        .encode();
        let mut fanout = 0;
        for (member_conn, member) in &roster.members {
            if member.is_enabled() {
                component.send(*member_conn, ChannelMessageType::JoinChannel, broadcast.clone());
                fanout += 1;
            }
        }
        drop(roster);

        metrics::record_fanout(fanout);
        events.joined(channel.name(), user);
        events.join_completed(ChannelResult::Ok, user);
        info!(conn = %conn, channel = %channel.name(), user = %user.username, "user joined channel");
        return ChannelResult::Ok;
    }
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
        ChannelMessageType::CompleteJoinChannel,
        JoinReply::status(result).encode(),
    );
    events.join_completed(result, user);
    result
}
