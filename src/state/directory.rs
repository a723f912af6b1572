//! The process-wide channel registry.

use crate::state::channel::Channel;
use crate::user::{ChatUser, ConnectionId};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;

/// Registry of all live channels, keyed by name.
///
/// The map's internal sharding is the registry guard: it covers only the
/// set of channel handles, never a channel's roster. Callers clone the
/// `Arc<Channel>` out of the map before taking a roster guard, so the two
/// critical sections never nest.
///
/// Disabled channels are evicted eagerly (see [`Directory::evict`]) rather
/// than left flagged in place, so the registry does not grow with dead
/// entries. The enabled check in [`Directory::find`] covers the short
/// window between a channel being disabled and its entry being removed.
#[derive(Debug, Default)]
pub struct Directory {
    channels: DashMap<String, Arc<Channel>>,
}

impl Directory {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an enabled channel by name.
    pub fn find(&self, name: &str) -> Option<Arc<Channel>> {
        self.channels
            .get(name)
            .map(|entry| entry.value().clone())
            .filter(|channel| channel.is_enabled())
    }

    /// Atomically fetch the channel for `name`, creating it with `creator`
    /// as sole member and operator if absent.
    ///
    /// Returns the channel and whether this call created it. The channel is
    /// fully constructed before it becomes visible, and two concurrent
    /// calls for the same absent name yield exactly one creation. An entry
    /// still holding a disabled channel (evicting racers) is replaced as if
    /// it were absent: a disabled channel's name is free for reuse.
    pub fn create_or_get(
        &self,
        name: &str,
        creator: ConnectionId,
        creator_user: Arc<ChatUser>,
    ) -> (Arc<Channel>, bool) {
        match self.channels.entry(name.to_string()) {
            Entry::Occupied(mut entry) => {
                let existing = entry.get().clone();
                if existing.is_enabled() {
                    (existing, false)
                } else {
                    let fresh = Channel::new(name, creator, creator_user);
                    entry.insert(Arc::clone(&fresh));
                    (fresh, true)
                }
            }
            Entry::Vacant(entry) => {
                let fresh = Channel::new(name, creator, creator_user);
                entry.insert(Arc::clone(&fresh));
                (fresh, true)
            }
        }
    }

    /// Remove a disabled channel's entry.
    ///
    /// Guarded by handle identity: if the name was already reused by a new
    /// channel, the new entry is left alone.
    pub fn evict(&self, channel: &Arc<Channel>) {
        self.channels
            .remove_if(channel.name(), |_, current| Arc::ptr_eq(current, channel));
    }

    /// Snapshot of every enabled channel.
    ///
    /// Used by the disconnect sweep; channels created after the snapshot is
    /// taken are simply not visited, which the sweep contract allows.
    pub fn enabled_channels(&self) -> Vec<Arc<Channel>> {
        self.channels
            .iter()
            .filter(|entry| entry.value().is_enabled())
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Number of registered channels, disabled stragglers included.
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// Whether no channels are registered.
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Drop every channel. Shutdown path only.
    pub fn clear(&self) {
        self.channels.clear();
    }
}
