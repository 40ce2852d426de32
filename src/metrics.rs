//! Prometheus metrics for the command router.
//!
//! - `chat_command_total{command}` - Dispatches by canonical name
//! - `chat_command_duration_seconds{command}` - Dispatch latency histogram
//! - `chat_command_errors_total{command,error}` - Handler failures by kind
//! - `chat_commands_denied_total{command}` - Rights gate refusals
//! - `chat_validation_failed_total{command}` - Argument pattern mismatches
//! - `chat_admin_changes_total{action}` - Admin sub-protocol mutations
//! - `chat_messages_sent_total` - Chat messages handed to the transport

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::OnceLock;

/// Global Prometheus registry for all metrics.
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

// ========================================================================
// Counters
// ========================================================================

/// Chat messages successfully handed to the transport.
pub static MESSAGES_SENT: OnceLock<IntCounter> = OnceLock::new();

/// Dispatches by command.
pub static COMMAND_COUNTER: OnceLock<IntCounterVec> = OnceLock::new();

/// Handler failures (errors and panics) by command and kind.
pub static COMMAND_ERRORS: OnceLock<IntCounterVec> = OnceLock::new();

/// Invocations refused by the rights gate.
pub static COMMANDS_DENIED: OnceLock<IntCounterVec> = OnceLock::new();

/// Arguments rejected by the command's pattern.
pub static VALIDATION_FAILED: OnceLock<IntCounterVec> = OnceLock::new();

/// Live entry mutations made through the admin sub-protocol.
pub static ADMIN_CHANGES: OnceLock<IntCounterVec> = OnceLock::new();

// ========================================================================
// Histograms
// ========================================================================

/// Dispatch latency by command.
pub static COMMAND_LATENCY: OnceLock<HistogramVec> = OnceLock::new();

/// Initialize the Prometheus metrics registry.
///
/// Call once at startup before any metrics are recorded. Recording before
/// `init` is a silent no-op.
pub fn init() {
    let r = registry();

    macro_rules! register {
        ($metric:ident, $init:expr) => {
            match $init {
                Ok(m) => {
                    if let Err(e) = r.register(Box::new(m.clone())) {
                        tracing::warn!(error = %e, concat!("Failed to register metric ", stringify!($metric)));
                    }
                    let _ = $metric.set(m);
                }
                Err(e) => {
                    tracing::warn!(error = %e, concat!("Failed to create metric ", stringify!($metric)));
                }
            }
        };
    }

    register!(MESSAGES_SENT, IntCounter::new("chat_messages_sent_total", "Chat messages sent"));
    register!(COMMAND_COUNTER, IntCounterVec::new(Opts::new("chat_command_total", "Chat commands invoked by name"), &["command"]));
    register!(COMMAND_ERRORS, IntCounterVec::new(Opts::new("chat_command_errors_total", "Chat command failures by kind"), &["command", "error"]));
    register!(COMMANDS_DENIED, IntCounterVec::new(Opts::new("chat_commands_denied_total", "Chat commands refused by the rights gate"), &["command"]));
    register!(VALIDATION_FAILED, IntCounterVec::new(Opts::new("chat_validation_failed_total", "Chat command arguments rejected by pattern"), &["command"]));
    register!(ADMIN_CHANGES, IntCounterVec::new(Opts::new("chat_admin_changes_total", "Live command changes by admin action"), &["action"]));
    register!(COMMAND_LATENCY, HistogramVec::new(
        HistogramOpts::new("chat_command_duration_seconds", "Chat command dispatch latency")
            .buckets(vec![0.00001, 0.00005, 0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1]),
        &["command"]));
}

/// Gather all metrics and encode them in Prometheus text format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = registry().gather();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode Prometheus metrics");
        return String::new();
    }
    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Prometheus metrics were not valid UTF-8");
            String::new()
        }
    }
}

// ============================================================================
// Update helpers
// ============================================================================

fn inc_labeled(metric: &OnceLock<IntCounterVec>, labels: &[&str]) {
    if let Some(c) = metric.get() {
        c.with_label_values(labels).inc();
    }
}

/// Record a dispatch with latency.
#[inline]
pub fn record_command(command: &str, duration_secs: f64) {
    inc_labeled(&COMMAND_COUNTER, &[command]);
    if let Some(h) = COMMAND_LATENCY.get() {
        h.with_label_values(&[command]).observe(duration_secs);
    }
}

/// Record a handler failure.
#[inline]
pub fn record_command_error(command: &str, error: &str) {
    inc_labeled(&COMMAND_ERRORS, &[command, error]);
}

#[inline]
pub fn record_denied(command: &str) {
    inc_labeled(&COMMANDS_DENIED, &[command]);
}

#[inline]
pub fn record_validation_failed(command: &str) {
    inc_labeled(&VALIDATION_FAILED, &[command]);
}

#[inline]
pub fn record_admin_change(action: &str) {
    inc_labeled(&ADMIN_CHANGES, &[action]);
}

#[inline]
pub fn record_message_sent() {
    if let Some(c) = MESSAGES_SENT.get() {
        c.inc();
    }
}
