//! Prometheus metrics for the channel core.
//!
//! Metrics are optional: if [`init`] is never called, every recording
//! helper is a no-op. The embedding server registers and exposes the
//! registry on its own HTTP endpoint.

use prometheus::{
    Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
};
use std::sync::OnceLock;

/// Global Prometheus registry for all channel-core metrics.
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

/// The shared registry, creating it on first use.
pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

/// Currently enabled channels.
pub static ACTIVE_CHANNELS: OnceLock<IntGauge> = OnceLock::new();

/// Total channels ever created.
pub static CHANNELS_CREATED: OnceLock<IntCounter> = OnceLock::new();

/// Join outcomes by result code.
pub static JOIN_RESULTS: OnceLock<IntCounterVec> = OnceLock::new();

/// Leave outcomes by result code.
pub static LEAVE_RESULTS: OnceLock<IntCounterVec> = OnceLock::new();

/// Handler failures by error code (decode, unknown connection).
pub static HANDLER_ERRORS: OnceLock<IntCounterVec> = OnceLock::new();

/// Recipients per membership broadcast.
pub static BROADCAST_FANOUT: OnceLock<Histogram> = OnceLock::new();

/// Disconnect sweeps executed.
pub static DISCONNECT_SWEEPS: OnceLock<IntCounter> = OnceLock::new();

/// Initialize and register all metrics.
///
/// Call once at server startup, before traffic.
pub fn init() {
    let r = registry();

    macro_rules! register {
        ($metric:ident, $init:expr) => {
            let m = $init.expect(concat!(stringify!($metric), " creation failed"));
            if let Err(e) = r.register(Box::new(m.clone())) {
                tracing::warn!(error = %e, concat!("Failed to register metric ", stringify!($metric)));
            }
            let _ = $metric.set(m);
        };
    }

    register!(ACTIVE_CHANNELS, IntGauge::new("chat_active_channels", "Currently enabled channels"));
    register!(CHANNELS_CREATED, IntCounter::new("chat_channels_created_total", "Channels created"));
    register!(JOIN_RESULTS, IntCounterVec::new(Opts::new("chat_join_results_total", "Join outcomes by result"), &["result"]));
    register!(LEAVE_RESULTS, IntCounterVec::new(Opts::new("chat_leave_results_total", "Leave outcomes by result"), &["result"]));
    register!(HANDLER_ERRORS, IntCounterVec::new(Opts::new("chat_handler_errors_total", "Fatal handler errors by code"), &["error"]));
    register!(BROADCAST_FANOUT, Histogram::with_opts(
        HistogramOpts::new("chat_broadcast_fanout", "Recipients per membership broadcast")
            .buckets(vec![1.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0])));
    register!(DISCONNECT_SWEEPS, IntCounter::new("chat_disconnect_sweeps_total", "Disconnect sweeps executed"));
}

/// Bump the active-channel gauge.
#[inline]
pub fn channel_opened() {
    if let Some(g) = ACTIVE_CHANNELS.get() {
        g.inc();
    }
    if let Some(c) = CHANNELS_CREATED.get() {
        c.inc();
    }
}

/// Drop the active-channel gauge when a channel is disabled.
#[inline]
pub fn channel_closed() {
    if let Some(g) = ACTIVE_CHANNELS.get() {
        g.dec();
    }
}

/// Zero the active-channel gauge. Shutdown path only.
#[inline]
pub fn reset_active_channels() {
    if let Some(g) = ACTIVE_CHANNELS.get() {
        g.set(0);
    }
}

/// Record a join outcome.
#[inline]
pub fn record_join_result(result: chatter_proto::ChannelResult) {
    if let Some(c) = JOIN_RESULTS.get() {
        c.with_label_values(&[result.label()]).inc();
    }
}

/// Record a leave outcome.
#[inline]
pub fn record_leave_result(result: chatter_proto::ChannelResult) {
    if let Some(c) = LEAVE_RESULTS.get() {
        c.with_label_values(&[result.label()]).inc();
    }
}

/// Record a fatal handler error.
#[inline]
pub fn record_handler_error(code: &str) {
    if let Some(c) = HANDLER_ERRORS.get() {
        c.with_label_values(&[code]).inc();
    }
}

/// Record broadcast fan-out (recipients per notification).
#[inline]
pub fn record_fanout(recipients: usize) {
    if let Some(h) = BROADCAST_FANOUT.get() {
        h.observe(recipients as f64);
    }
}

/// Record one disconnect sweep.
#[inline]
pub fn record_sweep() {
    if let Some(c) = DISCONNECT_SWEEPS.get() {
        c.inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatter_proto::ChannelResult;

    #[test]
    fn test_metrics_lifecycle() {
        init();

        channel_opened();
        record_join_result(ChannelResult::ChannelCreated);
        record_fanout(3);

        assert!(JOIN_RESULTS.get().is_some());
        assert!(!registry().gather().is_empty());
    }

    #[test]
    fn helpers_are_noops_when_uninitialized() {
        // Must not panic even if init() has not run in this process yet;
        // other tests may have initialized the OnceLocks, so this only
        // checks for absence of panics.
        record_leave_result(ChannelResult::Ok);
        record_handler_error("decode");
        record_sweep();
        channel_closed();
    }
}
