//! A single chat channel: its membership and operator sets.

use crate::user::{ChatUser, ConnectionId};
use chatter_proto::Identity;
use parking_lot::{Mutex, MutexGuard};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Membership and operator maps, guarded together.
///
/// One composite guard per channel replaces the original pair of
/// independent per-map mutexes; a join or leave mutates both maps as one
/// critical section, which keeps operators a subset of members by
/// construction. Never acquire a roster guard while holding a directory
/// map reference.
#[derive(Debug, Default)]
pub struct Roster {
    /// All members, keyed by connection. `BTreeMap` gives list replies a
    /// stable enumeration order (by connection id).
    pub members: BTreeMap<ConnectionId, Arc<ChatUser>>,
    /// Operators; always a subset of `members`.
    pub operators: BTreeMap<ConnectionId, Arc<ChatUser>>,
}

impl Roster {
    /// Remove a connection from the roster.
    ///
    /// Clears the operator slot along with the membership so the subset
    /// invariant holds on every exit path.
    pub fn remove(&mut self, conn: ConnectionId) -> Option<Arc<ChatUser>> {
        self.operators.remove(&conn);
        self.members.remove(&conn)
    }

    /// Identity snapshot of enabled operators, in enumeration order.
    pub fn operator_identities(&self) -> Vec<Identity> {
        self.operators
            .values()
            .filter(|user| user.is_enabled())
            .map(|user| user.identity())
            .collect()
    }

    /// Identity snapshot of enabled members, in enumeration order.
    pub fn member_identities(&self) -> Vec<Identity> {
        self.members
            .values()
            .filter(|user| user.is_enabled())
            .map(|user| user.identity())
            .collect()
    }
}

/// A named channel.
///
/// Owned by the [`Directory`](crate::state::Directory); handlers hold
/// `Arc<Channel>` only for the duration of a request. A channel whose last
/// member leaves is disabled and then evicted from the directory; the
/// disabled flag covers the window in which a stale handle is still held
/// by an in-flight sweep or handler.
#[derive(Debug)]
pub struct Channel {
    name: String,
    enabled: AtomicBool,
    roster: Mutex<Roster>,
}

impl Channel {
    /// Create a channel with its first member, who is also its sole
    /// operator.
    ///
    /// The channel is fully formed before anyone else can see it; the
    /// directory inserts the returned handle under its own guard.
    pub fn new(
        name: impl Into<String>,
        creator: ConnectionId,
        creator_user: Arc<ChatUser>,
    ) -> Arc<Self> {
        let mut roster = Roster::default();
        roster.members.insert(creator, Arc::clone(&creator_user));
        roster.operators.insert(creator, creator_user);
        Arc::new(Self {
            name: name.into(),
            enabled: AtomicBool::new(true),
            roster: Mutex::new(roster),
        })
    }

    /// The channel's name, `#` marker included.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the channel is live. Disabled channels are invisible to
    /// lookups and sweeps even if a handle still exists somewhere.
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Mark the channel logically deleted. Called with the roster guard
    /// held, when the last member is removed.
    pub fn disable(&self) {
        self.enabled.store(false, Ordering::Release);
    }

    /// Lock the roster.
    pub fn roster(&self) -> MutexGuard<'_, Roster> {
        self.roster.lock()
    }

    /// Current member count (takes the roster guard).
    pub fn member_count(&self) -> usize {
        self.roster.lock().members.len()
    }
}
