//! Integration tests for the observer extension points.

mod common;

use chatterd::proto::ChannelResult;
use chatterd::{ChannelObserver, ChatUser};
use common::Harness;
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Default)]
struct Recorder {
    log: Mutex<Vec<String>>,
}

impl Recorder {
    fn entries(&self) -> Vec<String> {
        self.log.lock().clone()
    }
}

impl ChannelObserver for Recorder {
    fn on_channel_created(&self, channel: &str) {
        self.log.lock().push(format!("created:{channel}"));
    }

    fn on_channel_joined(&self, channel: &str, user: &ChatUser) {
        self.log
            .lock()
            .push(format!("joined:{channel}:{}", user.username));
    }

    fn on_channel_left(&self, channel: &str, user: &ChatUser) {
        self.log
            .lock()
            .push(format!("left:{channel}:{}", user.username));
    }

    fn on_join_completed(&self, result: ChannelResult, user: &ChatUser) {
        self.log
            .lock()
            .push(format!("join_done:{result}:{}", user.username));
    }

    fn on_leave_completed(&self, result: ChannelResult, user: &ChatUser) {
        self.log
            .lock()
            .push(format!("leave_done:{result}:{}", user.username));
    }
}

#[test]
fn create_join_leave_fire_hooks_in_order() {
    let h = Harness::new();
    let recorder = Arc::new(Recorder::default());
    h.component.add_observer(recorder.clone());

    let alice = h.connect(1, "alice");
    let bob = h.connect(2, "bob");

    h.join(alice, "#general");
    h.join(bob, "#general");
    h.leave(bob, "#general");

    assert_eq!(
        recorder.entries(),
        vec![
            "created:#general".to_string(),
            "joined:#general:alice".to_string(),
            "join_done:channel_created:alice".to_string(),
            "joined:#general:bob".to_string(),
            "join_done:ok:bob".to_string(),
            "left:#general:bob".to_string(),
            "leave_done:ok:bob".to_string(),
        ]
    );
}

#[test]
fn failed_requests_still_complete() {
    let h = Harness::new();
    let recorder = Arc::new(Recorder::default());
    h.component.add_observer(recorder.clone());

    let alice = h.connect(1, "alice");
    h.join(alice, "no-marker");
    h.leave(alice, "#nowhere");

    assert_eq!(
        recorder.entries(),
        vec![
            "join_done:invalid_channel_name:alice".to_string(),
            "leave_done:invalid_channel_name:alice".to_string(),
        ]
    );
}

#[test]
fn disconnect_sweep_fires_left_hooks() {
    let h = Harness::new();
    let recorder = Arc::new(Recorder::default());

    let alice = h.connect(1, "alice");
    h.join(alice, "#one");
    h.join(alice, "#two");

    h.component.add_observer(recorder.clone());
    h.component.on_client_disconnected(alice);

    let mut entries = recorder.entries();
    entries.sort();
    assert_eq!(
        entries,
        vec!["left:#one:alice".to_string(), "left:#two:alice".to_string()]
    );
}

struct Panicker;

impl ChannelObserver for Panicker {
    fn on_channel_created(&self, _channel: &str) {
        panic!("buggy observer");
    }
}

#[test]
fn panicking_observer_does_not_break_the_handler() {
    let h = Harness::new();
    let recorder = Arc::new(Recorder::default());
    h.component.add_observer(Arc::new(Panicker));
    h.component.add_observer(recorder.clone());

    let alice = h.connect(1, "alice");
    h.join(alice, "#general");

    // The request still completed and the healthy observer still ran.
    assert_eq!(
        h.last_join_reply(alice).result,
        ChannelResult::ChannelCreated
    );
    assert!(
        recorder
            .entries()
            .contains(&"created:#general".to_string())
    );
}
