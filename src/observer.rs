//! Observer hooks for channel state changes.
//!
//! Observers run outside every lock: handlers collect events while holding
//! a roster guard and dispatch them only after the guard is released, so an
//! observer can take its time (or even call back into the component)
//! without stalling other connections. A panicking observer is logged and
//! isolated; nothing propagates into transport code.

use crate::user::ChatUser;
use chatter_proto::ChannelResult;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use tracing::warn;

/// Hooks fired on channel state transitions.
///
/// All methods have empty default bodies; implement only what you need.
/// The `*_completed` hooks fire on every terminal outcome of a request,
/// successful or not, with the result code that was sent to the requester.
pub trait ChannelObserver: Send + Sync {
    /// A channel was created (first join to its name).
    fn on_channel_created(&self, _channel: &str) {}

    /// A user was added to a channel's membership.
    fn on_channel_joined(&self, _channel: &str, _user: &ChatUser) {}

    /// A user left a channel, by request or by disconnect.
    fn on_channel_left(&self, _channel: &str, _user: &ChatUser) {}

    /// A join request reached a terminal outcome.
    fn on_join_completed(&self, _result: ChannelResult, _user: &ChatUser) {}

    /// A leave request reached a terminal outcome.
    fn on_leave_completed(&self, _result: ChannelResult, _user: &ChatUser) {}
}

/// One recorded state transition, replayed to observers after unlock.
#[derive(Debug, Clone)]
pub(crate) enum ChannelEvent {
    Created {
        channel: String,
    },
    Joined {
        channel: String,
        user: Arc<ChatUser>,
    },
    Left {
        channel: String,
        user: Arc<ChatUser>,
    },
    JoinCompleted {
        result: ChannelResult,
        user: Arc<ChatUser>,
    },
    LeaveCompleted {
        result: ChannelResult,
        user: Arc<ChatUser>,
    },
}

/// Event accumulator carried through a handler's critical sections.
#[derive(Debug, Default)]
pub(crate) struct EventBuffer {
    events: Vec<ChannelEvent>,
}

impl EventBuffer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn created(&mut self, channel: &str) {
        self.events.push(ChannelEvent::Created {
            channel: channel.to_string(),
        });
    }

    pub(crate) fn joined(&mut self, channel: &str, user: &Arc<ChatUser>) {
        self.events.push(ChannelEvent::Joined {
            channel: channel.to_string(),
            user: Arc::clone(user),
        });
    }

    pub(crate) fn left(&mut self, channel: &str, user: &Arc<ChatUser>) {
        self.events.push(ChannelEvent::Left {
            channel: channel.to_string(),
            user: Arc::clone(user),
        });
    }

    pub(crate) fn join_completed(&mut self, result: ChannelResult, user: &Arc<ChatUser>) {
        self.events.push(ChannelEvent::JoinCompleted {
            result,
            user: Arc::clone(user),
        });
    }

    pub(crate) fn leave_completed(&mut self, result: ChannelResult, user: &Arc<ChatUser>) {
        self.events.push(ChannelEvent::LeaveCompleted {
            result,
            user: Arc::clone(user),
        });
    }

    /// Replay every recorded event to every observer, in order.
    ///
    /// Must be called with no channel or directory locks held.
    pub(crate) fn dispatch(self, observers: &[Arc<dyn ChannelObserver>]) {
        for event in &self.events {
            for observer in observers {
                let result = catch_unwind(AssertUnwindSafe(|| match event {
                    ChannelEvent::Created { channel } => observer.on_channel_created(channel),
                    ChannelEvent::Joined { channel, user } => {
                        observer.on_channel_joined(channel, user)
                    }
                    ChannelEvent::Left { channel, user } => observer.on_channel_left(channel, user),
                    ChannelEvent::JoinCompleted { result, user } => {
                        observer.on_join_completed(*result, user)
                    }
                    ChannelEvent::LeaveCompleted { result, user } => {
                        observer.on_leave_completed(*result, user)
                    }
                }));
                if result.is_err() {
                    warn!("channel observer panicked; event dropped for that observer");
                }
            }
        }
    }
}
