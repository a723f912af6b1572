//! Connection identifiers and the user-identity seam.
//!
//! Identity records are owned by the user subsystem; this core holds shared
//! handles and only ever reads them. The lookup itself is injected as a
//! trait object so the core never reaches into a service registry.

use chatter_proto::Identity;
use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Opaque identifier for one transport connection.
///
/// Assigned by the transport at accept time. The ordering of the raw value
/// gives channel rosters their stable enumeration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Wrap a raw connection number.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw connection number.
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Shared, read-mostly identity record for one connected user.
///
/// The flags are atomics because the owning user subsystem flips them from
/// its own tasks while channel handlers read them concurrently.
#[derive(Debug)]
pub struct ChatUser {
    /// Display username.
    pub username: String,
    /// Display hostname.
    pub hostname: String,
    identified: AtomicBool,
    enabled: AtomicBool,
}

impl ChatUser {
    /// New, enabled, not-yet-identified user record.
    pub fn new(username: impl Into<String>, hostname: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            hostname: hostname.into(),
            identified: AtomicBool::new(false),
            enabled: AtomicBool::new(true),
        }
    }

    /// Whether the user has identified; gates all channel participation.
    pub fn is_identified(&self) -> bool {
        self.identified.load(Ordering::Acquire)
    }

    /// Flip the identified flag (user subsystem only).
    pub fn set_identified(&self, identified: bool) {
        self.identified.store(identified, Ordering::Release);
    }

    /// Soft-delete flag mirrored from the user subsystem. Disabled users
    /// stay in rosters but are skipped by broadcasts and snapshots.
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Flip the enabled flag (user subsystem only).
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
    }

    /// The wire identity pair for replies and broadcasts.
    pub fn identity(&self) -> Identity {
        Identity::new(self.username.clone(), self.hostname.clone())
    }
}

/// Resolves a connection to its identity record.
///
/// Injected into the component at construction; a `None` from here for a
/// connection that sent a channel request is an internal error and the
/// connection gets dropped.
pub trait UserLookup: Send + Sync {
    /// Identity record for `conn`, if one exists.
    fn chat_user(&self, conn: ConnectionId) -> Option<Arc<ChatUser>>;
}

/// Concurrent connection-to-user table.
///
/// The default [`UserLookup`] implementation used by the embedding server
/// and by tests.
#[derive(Debug, Default)]
pub struct UserTable {
    users: DashMap<ConnectionId, Arc<ChatUser>>,
}

impl UserTable {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user record for a connection, replacing any previous one.
    pub fn insert(&self, conn: ConnectionId, user: Arc<ChatUser>) {
        self.users.insert(conn, user);
    }

    /// Drop the record for a closed connection.
    pub fn remove(&self, conn: ConnectionId) -> Option<Arc<ChatUser>> {
        self.users.remove(&conn).map(|(_, user)| user)
    }

    /// Number of registered connections.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl UserLookup for UserTable {
    fn chat_user(&self, conn: ConnectionId) -> Option<Arc<ChatUser>> {
        self.users.get(&conn).map(|entry| entry.value().clone())
    }
}
