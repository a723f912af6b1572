//! Shared test harness: an in-memory user table and a recording notifier.

#![allow(dead_code)]

use bytes::Bytes;
use chatterd::proto::{
    ChannelMessageType, ChannelResult, ComponentType, JoinReply, JoinRequest, LeaveReply,
    LeaveRequest, MemberBroadcast,
};
use chatterd::{ChannelComponent, ChatUser, Config, ConnectionId, Notifier, UserTable};
use parking_lot::Mutex;
use std::sync::{Arc, Once};
use tracing_subscriber::EnvFilter;

static TRACING: Once = Once::new();

/// Install a per-binary fmt subscriber so `RUST_LOG` controls test output.
fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// One frame captured from the component's notifier seam.
#[derive(Debug, Clone)]
pub struct SentFrame {
    pub conn: ConnectionId,
    pub component: ComponentType,
    pub message_type: ChannelMessageType,
    pub payload: Bytes,
}

/// Notifier that records every unicast instead of delivering it.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    frames: Mutex<Vec<SentFrame>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain all captured frames.
    pub fn take(&self) -> Vec<SentFrame> {
        std::mem::take(&mut *self.frames.lock())
    }

    /// Captured frames addressed to one connection, oldest first.
    pub fn frames_for(&self, conn: ConnectionId) -> Vec<SentFrame> {
        self.frames
            .lock()
            .iter()
            .filter(|frame| frame.conn == conn)
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.frames.lock().clear();
    }
}

impl Notifier for RecordingNotifier {
    fn unicast(
        &self,
        conn: ConnectionId,
        component: ComponentType,
        message_type: ChannelMessageType,
        payload: Bytes,
    ) {
        self.frames.lock().push(SentFrame {
            conn,
            component,
            message_type,
            payload,
        });
    }
}

/// A channel component wired to test doubles.
pub struct Harness {
    pub component: Arc<ChannelComponent>,
    pub users: Arc<UserTable>,
    pub notifier: Arc<RecordingNotifier>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        init_tracing();
        let users = Arc::new(UserTable::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let component = Arc::new(ChannelComponent::new(
            config,
            users.clone(),
            notifier.clone(),
        ));
        component.initialize();
        Self {
            component,
            users,
            notifier,
        }
    }

    /// Register an identified user for a fresh connection.
    pub fn connect(&self, raw: u64, username: &str) -> ConnectionId {
        let conn = self.connect_unidentified(raw, username);
        self.users
            .chat_user_or_panic(conn)
            .set_identified(true);
        conn
    }

    /// Register a user that has not identified yet.
    pub fn connect_unidentified(&self, raw: u64, username: &str) -> ConnectionId {
        let conn = ConnectionId::new(raw);
        let user = Arc::new(ChatUser::new(username, format!("host-{username}")));
        self.users.insert(conn, user);
        conn
    }

    /// Send a join request through the component boundary.
    pub fn join(&self, conn: ConnectionId, channel: &str) {
        let payload = JoinRequest {
            channel_name: channel.to_string(),
        }
        .encode();
        let handled = self
            .component
            .handle(conn, ChannelMessageType::JoinChannel.as_u16(), &payload)
            .expect("join should not be fatal");
        assert!(handled);
    }

    /// Send a leave request through the component boundary.
    pub fn leave(&self, conn: ConnectionId, channel: &str) {
        let payload = LeaveRequest {
            channel_name: channel.to_string(),
        }
        .encode();
        let handled = self
            .component
            .handle(conn, ChannelMessageType::LeaveChannel.as_u16(), &payload)
            .expect("leave should not be fatal");
        assert!(handled);
    }

    /// The most recent join reply sent to `conn`.
    pub fn last_join_reply(&self, conn: ConnectionId) -> JoinReply {
        let frame = self
            .notifier
            .frames_for(conn)
            .into_iter()
            .filter(|frame| frame.message_type == ChannelMessageType::CompleteJoinChannel)
            .next_back()
            .expect("no join reply for connection");
        JoinReply::decode(&frame.payload).expect("join reply should decode")
    }

    /// The most recent leave reply sent to `conn`.
    pub fn last_leave_reply(&self, conn: ConnectionId) -> LeaveReply {
        let frame = self
            .notifier
            .frames_for(conn)
            .into_iter()
            .filter(|frame| frame.message_type == ChannelMessageType::CompleteLeaveChannel)
            .next_back()
            .expect("no leave reply for connection");
        LeaveReply::decode(&frame.payload).expect("leave reply should decode")
    }

    /// All membership broadcasts delivered to `conn`, decoded, oldest first.
    pub fn broadcasts_for(&self, conn: ConnectionId) -> Vec<MemberBroadcast> {
        self.notifier
            .frames_for(conn)
            .into_iter()
            .filter(|frame| {
                matches!(
                    frame.message_type,
                    ChannelMessageType::JoinChannel | ChannelMessageType::LeaveChannel
                )
            })
            .map(|frame| {
                MemberBroadcast::decode(&frame.payload).expect("broadcast should decode")
            })
            .collect()
    }

    /// Broadcasts for `conn` with the given result code.
    pub fn broadcasts_with(
        &self,
        conn: ConnectionId,
        result: ChannelResult,
    ) -> Vec<MemberBroadcast> {
        self.broadcasts_for(conn)
            .into_iter()
            .filter(|broadcast| broadcast.result == result)
            .collect()
    }
}

trait UserTableExt {
    fn chat_user_or_panic(&self, conn: ConnectionId) -> Arc<ChatUser>;
}

impl UserTableExt for UserTable {
    fn chat_user_or_panic(&self, conn: ConnectionId) -> Arc<ChatUser> {
        use chatterd::UserLookup;
        self.chat_user(conn).expect("user registered by harness")
    }
}
