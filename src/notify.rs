//! The notifier seam between the channel core and the transport.
//!
//! The core runs its broadcasts while holding a channel's roster guard, so
//! delivery must never block: [`Notifier::unicast`] is a pure enqueue, and
//! the transport drains each connection's queue from its own writer task.

use crate::user::ConnectionId;
use bytes::Bytes;
use chatter_proto::{ChannelMessageType, ComponentType};
use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::debug;

/// One outbound frame, ready for the transport to tag and write.
#[derive(Debug, Clone)]
pub struct Outbound {
    /// Component tag for the frame header.
    pub component: ComponentType,
    /// Message type for the frame header.
    pub message_type: ChannelMessageType,
    /// Encoded payload. Shared (`Bytes`) so a broadcast clones cheaply.
    pub payload: Bytes,
}

/// Delivers a typed message to a single connection.
///
/// Implementations must not block: the core calls this inside roster
/// critical sections. Delivery failure is the transport's concern and is
/// never retried by the core.
pub trait Notifier: Send + Sync {
    /// Enqueue `payload` for `conn`.
    fn unicast(
        &self,
        conn: ConnectionId,
        component: ComponentType,
        message_type: ChannelMessageType,
        payload: Bytes,
    );
}

/// Per-connection outbound queues backed by unbounded tokio channels.
///
/// The transport registers a queue when a connection is accepted and drains
/// the receiver from the connection's writer task. Sends to an unregistered
/// or closed connection are dropped; the disconnect sweep will clean the
/// membership up shortly after.
#[derive(Debug, Default)]
pub struct QueuedNotifier {
    queues: DashMap<ConnectionId, mpsc::UnboundedSender<Outbound>>,
}

impl QueuedNotifier {
    /// Empty notifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection, returning the receiver its writer task drains.
    ///
    /// Re-registering a connection id replaces the old queue; frames still
    /// sitting in the replaced queue are lost with it.
    pub fn register(&self, conn: ConnectionId) -> mpsc::UnboundedReceiver<Outbound> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.queues.insert(conn, tx);
        rx
    }

    /// Drop a connection's queue on disconnect.
    pub fn unregister(&self, conn: ConnectionId) {
        self.queues.remove(&conn);
    }

    /// Number of registered connections.
    pub fn len(&self) -> usize {
        self.queues.len()
    }

    /// Whether no connections are registered.
    pub fn is_empty(&self) -> bool {
        self.queues.is_empty()
    }
}

impl Notifier for QueuedNotifier {
    fn unicast(
        &self,
        conn: ConnectionId,
        component: ComponentType,
        message_type: ChannelMessageType,
        payload: Bytes,
    ) {
        let Some(tx) = self.queues.get(&conn).map(|entry| entry.value().clone()) else {
            debug!(conn = %conn, "dropping frame for unregistered connection");
            return;
        };
        if tx
            .send(Outbound {
                component,
                message_type,
                payload,
            })
            .is_err()
        {
            debug!(conn = %conn, "dropping frame for closed connection");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registered_connection_receives_frames() {
        let notifier = QueuedNotifier::new();
        let conn = ConnectionId::new(1);
        let mut rx = notifier.register(conn);

        notifier.unicast(
            conn,
            ComponentType::Channel,
            ChannelMessageType::CompleteJoinChannel,
            Bytes::from_static(b"\x00\x01"),
        );

        let frame = rx.try_recv().unwrap();
        assert_eq!(frame.component, ComponentType::Channel);
        assert_eq!(frame.message_type, ChannelMessageType::CompleteJoinChannel);
        assert_eq!(&frame.payload[..], b"\x00\x01");
    }

    #[test]
    fn unregistered_connection_drops_silently() {
        let notifier = QueuedNotifier::new();
        // No panic, no effect.
        notifier.unicast(
            ConnectionId::new(99),
            ComponentType::Channel,
            ChannelMessageType::JoinChannel,
            Bytes::new(),
        );
        assert!(notifier.is_empty());
    }

    #[test]
    fn closed_receiver_drops_silently() {
        let notifier = QueuedNotifier::new();
        let conn = ConnectionId::new(2);
        let rx = notifier.register(conn);
        drop(rx);

        notifier.unicast(
            conn,
            ComponentType::Channel,
            ChannelMessageType::LeaveChannel,
            Bytes::new(),
        );
        notifier.unregister(conn);
        assert!(notifier.is_empty());
    }
}
