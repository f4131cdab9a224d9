//! Progress and diagnostics sink.

/// Severity of a consumer message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug,
    Info,
    Warning,
}

/// Receives human-readable messages emitted while scanning and fixing.
///
/// Any `Fn(Level, &str)` closure is a consumer, which keeps tests and
/// embedding UIs simple. [`TracingConsumer`] is the default.
pub trait Consumer {
    fn on_message(&self, level: Level, msg: &str);

    fn debug(&self, msg: &str) {
        self.on_message(Level::Debug, msg);
    }

    fn info(&self, msg: &str) {
        self.on_message(Level::Info, msg);
    }

    fn warn(&self, msg: &str) {
        self.on_message(Level::Warning, msg);
    }
}

impl<F> Consumer for F
where
    F: Fn(Level, &str),
{
    fn on_message(&self, level: Level, msg: &str) {
        self(level, msg);
    }
}

/// Forwards every message to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingConsumer;

impl Consumer for TracingConsumer {
    fn on_message(&self, level: Level, msg: &str) {
        match level {
            Level::Debug => tracing::debug!("{msg}"),
            Level::Info => tracing::info!("{msg}"),
            Level::Warning => tracing::warn!("{msg}"),
        }
    }
}
