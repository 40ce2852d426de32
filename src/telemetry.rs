//! Telemetry utilities for command timing and tracing spans.

use std::time::Instant;

/// Guard for timing a dispatch and recording metrics.
///
/// Records command latency when dropped.
pub struct CommandTimer {
    command: String,
    start: Instant,
}

impl CommandTimer {
    /// Start timing a command.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            start: Instant::now(),
        }
    }
}

impl Drop for CommandTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        crate::metrics::record_command(&self.command, duration);
    }
}

/// Standardized span constructors.
pub mod spans {
    use tracing::{Span, info_span};

    /// Span for one dispatched chat command.
    pub fn command(name: &str, user: &str, broadcaster: bool) -> Span {
        info_span!("chat.command", command = %name, user = %user, broadcaster = broadcaster)
    }

    /// Span for a handler moved onto its own task.
    pub fn spawned(name: &str) -> Span {
        info_span!("chat.task", command = %name)
    }
}
