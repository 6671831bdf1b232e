//! Warning sinks: where user-facing query diagnostics go.
//!
//! Every diagnostic is logged at `warn!` level regardless of the sink; the sink
//! only receives it when the caller asked for warnings.

use std::sync::Mutex;

use log::warn;

pub trait WarnSink: Send + Sync {
    fn warn(&self, message: &str);
}

/// Drops every message.
#[derive(Clone, Copy, Debug, Default)]
pub struct SilentSink;

impl WarnSink for SilentSink {
    fn warn(&self, _message: &str) {}
}

/// Writes messages to standard error, for command line drivers.
#[derive(Clone, Copy, Debug, Default)]
pub struct StderrSink;

impl WarnSink for StderrSink {
    fn warn(&self, message: &str) {
        eprintln!("{message}");
    }
}

/// Keeps messages in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    messages: Mutex<Vec<String>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        match self.messages.lock() {
            Ok(m) => m.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn clear(&self) {
        match self.messages.lock() {
            Ok(mut m) => m.clear(),
            Err(poisoned) => poisoned.into_inner().clear(),
        }
    }
}

impl WarnSink for CollectingSink {
    fn warn(&self, message: &str) {
        match self.messages.lock() {
            Ok(mut m) => m.push(message.to_string()),
            Err(poisoned) => poisoned.into_inner().push(message.to_string()),
        }
    }
}

/// Logs `message` and forwards it to `sink` when `enabled`.
pub(crate) fn diagnose(sink: &dyn WarnSink, enabled: bool, message: &str) {
    warn!("{}", message);
    if enabled {
        sink.warn(message);
    }
}
