//! The channel component: membership protocol handler and lifecycle.
//!
//! The transport routes every inbound frame tagged
//! [`ComponentType::Channel`] to [`ChannelComponent::handle`] and calls the
//! lifecycle methods at the matching points of a connection's or the
//! process's life. Everything here is synchronous: each operation is a
//! bounded critical section over in-memory maps, invoked concurrently from
//! per-connection tasks.

mod join;
mod leave;
mod sweep;

use crate::config::Config;
use crate::error::{HandlerError, HandlerResult};
use crate::metrics;
use crate::notify::Notifier;
use crate::observer::ChannelObserver;
use crate::state::Directory;
use crate::user::{ChatUser, ConnectionId, UserLookup};
use bytes::Bytes;
use chatter_proto::{ChannelMessageType, ComponentType, JoinRequest, LeaveRequest};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{info, warn};

/// Channel membership and routing component.
pub struct ChannelComponent {
    config: Config,
    directory: Directory,
    users: Arc<dyn UserLookup>,
    notifier: Arc<dyn Notifier>,
    observers: RwLock<Vec<Arc<dyn ChannelObserver>>>,
}

impl ChannelComponent {
    /// Build the component with its injected collaborators.
    pub fn new(config: Config, users: Arc<dyn UserLookup>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            config,
            directory: Directory::new(),
            users,
            notifier,
            observers: RwLock::new(Vec::new()),
        }
    }

    /// Register an observer for channel state transitions.
    pub fn add_observer(&self, observer: Arc<dyn ChannelObserver>) {
        self.observers.write().push(observer);
    }

    /// The component tag this handler answers for.
    pub const fn component_type(&self) -> ComponentType {
        ComponentType::Channel
    }

    /// The channel registry. Exposed read-only for embedder introspection.
    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    /// Process one inbound frame already routed to this component.
    ///
    /// Returns `Ok(false)` when `message_type` is not one this component
    /// consumes (the caller tries other components or disconnects), and
    /// `Err` on decode failure or a missing user record, both of which the
    /// caller must answer by dropping the connection.
    pub fn handle(
        &self,
        conn: ConnectionId,
        message_type: u16,
        payload: &[u8],
    ) -> HandlerResult<bool> {
        let Some(message_type) = ChannelMessageType::from_u16(message_type) else {
            return Ok(false);
        };

        let outcome = match message_type {
            ChannelMessageType::JoinChannel => JoinRequest::decode(payload)
                .map_err(HandlerError::from)
                .and_then(|request| join::handle_join(self, conn, request)),
            ChannelMessageType::LeaveChannel => LeaveRequest::decode(payload)
                .map_err(HandlerError::from)
                .and_then(|request| leave::handle_leave(self, conn, request)),
            // Reply and broadcast types are outbound-only.
            ChannelMessageType::CompleteJoinChannel
            | ChannelMessageType::CompleteLeaveChannel => return Ok(false),
        };

        match outcome {
            Ok(()) => Ok(true),
            Err(e) => {
                metrics::record_handler_error(e.error_code());
                warn!(conn = %conn, error = %e, "channel handler failed; caller should disconnect");
                Err(e)
            }
        }
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Startup hook.
    pub fn initialize(&self) {
        info!(server = %self.config.server.name, "channel component initialized");
    }

    /// Final teardown: clears all channel state.
    pub fn shutdown(&self) {
        self.clear_channels();
    }

    /// The server began accepting connections.
    pub fn on_start(&self) {}

    /// The server stopped accepting connections; clears all channel state.
    pub fn on_stop(&self) {
        self.clear_channels();
    }

    /// A connection was accepted. The channel component has no per-connection
    /// setup; membership starts with the first join.
    pub fn on_client_connected(&self, _conn: ConnectionId) {}

    /// A connection was lost; runs the disconnect sweep.
    pub fn on_client_disconnected(&self, conn: ConnectionId) {
        sweep::run(self, conn);
    }

    fn clear_channels(&self) {
        let count = self.directory.len();
        self.directory.clear();
        metrics::reset_active_channels();
        if count > 0 {
            info!(channels = count, "cleared channel state");
        }
    }

    // ------------------------------------------------------------------
    // Internals shared by the handlers
    // ------------------------------------------------------------------

    pub(crate) fn config(&self) -> &Config {
        &self.config
    }

    pub(crate) fn lookup_user(&self, conn: ConnectionId) -> HandlerResult<Arc<ChatUser>> {
        self.users
            .chat_user(conn)
            .ok_or(HandlerError::UnknownConnection(conn))
    }

    /// Enqueue one frame for one connection, tagged with this component.
    pub(crate) fn send(
        &self,
        conn: ConnectionId,
        message_type: ChannelMessageType,
        payload: Bytes,
    ) {
        self.notifier
            .unicast(conn, ComponentType::Channel, message_type, payload);
    }

    /// Clone the observer list so dispatch runs without the lock.
    pub(crate) fn observers_snapshot(&self) -> Vec<Arc<dyn ChannelObserver>> {
        self.observers.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::Notifier;
    use crate::user::UserTable;
    use chatter_proto::JoinRequest;

    struct NullNotifier;

    impl Notifier for NullNotifier {
        fn unicast(
            &self,
            _conn: ConnectionId,
            _component: ComponentType,
            _message_type: ChannelMessageType,
            _payload: Bytes,
        ) {
        }
    }

    fn component() -> (ChannelComponent, Arc<UserTable>) {
        let users = Arc::new(UserTable::new());
        let component = ChannelComponent::new(
            Config::default(),
            users.clone() as Arc<dyn UserLookup>,
            Arc::new(NullNotifier),
        );
        (component, users)
    }

    #[test]
    fn foreign_message_types_are_not_handled() {
        let (component, _) = component();
        let handled = component
            .handle(ConnectionId::new(1), 9999, &[])
            .unwrap();
        assert!(!handled);
    }

    #[test]
    fn reply_types_are_not_inbound() {
        let (component, _) = component();
        let handled = component
            .handle(
                ConnectionId::new(1),
                ChannelMessageType::CompleteJoinChannel.as_u16(),
                &[],
            )
            .unwrap();
        assert!(!handled);
    }

    #[test]
    fn malformed_payload_is_fatal() {
        let (component, _) = component();
        let err = component
            .handle(
                ConnectionId::new(1),
                ChannelMessageType::JoinChannel.as_u16(),
                &[0x00],
            )
            .unwrap_err();
        assert_eq!(err.error_code(), "decode");
    }

    #[test]
    fn missing_user_record_is_fatal() {
        let (component, _) = component();
        let payload = JoinRequest {
            channel_name: "#general".into(),
        }
        .encode();
        let err = component
            .handle(
                ConnectionId::new(1),
                ChannelMessageType::JoinChannel.as_u16(),
                &payload,
            )
            .unwrap_err();
        assert_eq!(err.error_code(), "unknown_connection");
    }

    #[test]
    fn shutdown_clears_channels() {
        use crate::user::ChatUser;

        let (component, users) = component();
        let conn = ConnectionId::new(1);
        let alice = Arc::new(ChatUser::new("alice", "host-a"));
        alice.set_identified(true);
        users.insert(conn, alice);

        let payload = JoinRequest {
            channel_name: "#general".into(),
        }
        .encode();
        component
            .handle(conn, ChannelMessageType::JoinChannel.as_u16(), &payload)
            .unwrap();
        assert_eq!(component.directory().len(), 1);

        component.shutdown();
        assert!(component.directory().is_empty());
    }
}
