//! Leveled diagnostic sink used while resolving data sources.
//!
//! The resolver reports ignored files, skipped tests and dropped suites here
//! rather than failing. Recording a message never fails and never blocks.

use serde::Serialize;
use std::fmt;

/// Severity of a recorded diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Progress and ignored-entry notes.
    Info,
    /// Suspicious but accepted data.
    Warn,
    /// Rejected data.
    Error,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        };
        f.write_str(label)
    }
}

/// A single recorded diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    /// Severity.
    pub level: Level,
    /// Rendered text.
    pub text: String,
}

/// Append-only message channel.
pub trait DiagnosticSink {
    /// Append a message at the given level.
    fn record(&mut self, level: Level, text: &str);

    /// Append an informational message.
    fn info(&mut self, text: &str) {
        self.record(Level::Info, text);
    }

    /// Append a warning.
    fn warn(&mut self, text: &str) {
        self.record(Level::Warn, text);
    }

    /// Append an error.
    fn error(&mut self, text: &str) {
        self.record(Level::Error, text);
    }
}

fn emit(level: Level, text: &str) {
    match level {
        Level::Info => tracing::info!(target: "kwresolve::syslog", "{text}"),
        Level::Warn => tracing::warn!(target: "kwresolve::syslog", "{text}"),
        Level::Error => tracing::error!(target: "kwresolve::syslog", "{text}"),
    }
}

/// Sink that forwards every record to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn record(&mut self, level: Level, text: &str) {
        emit(level, text);
    }
}

/// Sink that keeps every record in arrival order.
///
/// ```rust
/// use kwresolve::syslog::{CollectingSink, DiagnosticSink, Level};
///
/// let mut sink = CollectingSink::new();
/// sink.warn("duplicate test");
/// assert_eq!(sink.count(Level::Warn), 1);
/// ```
#[derive(Debug, Default, Clone)]
pub struct CollectingSink {
    messages: Vec<Message>,
    forward: bool,
}

impl CollectingSink {
    /// Create an empty sink that only collects.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            messages: Vec::new(),
            forward: false,
        }
    }

    /// Create an empty sink that also forwards to `tracing`.
    #[must_use]
    pub const fn forwarding() -> Self {
        Self {
            messages: Vec::new(),
            forward: true,
        }
    }

    /// Messages recorded so far.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Messages recorded at exactly `level`.
    pub fn at(&self, level: Level) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter(move |m| m.level == level)
    }

    /// Number of messages recorded at exactly `level`.
    #[must_use]
    pub fn count(&self, level: Level) -> usize {
        self.at(level).count()
    }

    /// Whether any message at `level` contains `needle`.
    #[must_use]
    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.at(level).any(|m| m.text.contains(needle))
    }
}

impl DiagnosticSink for CollectingSink {
    fn record(&mut self, level: Level, text: &str) {
        if self.forward {
            emit(level, text);
        }
        self.messages.push(Message {
            level,
            text: text.to_owned(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn collecting_sink_preserves_order() {
        let mut sink = CollectingSink::new();
        sink.info("first");
        sink.error("second");
        sink.warn("third");
        let texts: Vec<_> = sink.messages().iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, ["first", "second", "third"]);
        assert_eq!(sink.count(Level::Error), 1);
        assert!(sink.contains(Level::Warn, "thi"));
        assert!(!sink.contains(Level::Info, "third"));
    }

    #[rstest]
    #[case(Level::Info, "INFO")]
    #[case(Level::Warn, "WARN")]
    #[case(Level::Error, "ERROR")]
    fn level_display(#[case] level: Level, #[case] expected: &str) {
        assert_eq!(level.to_string(), expected);
    }
}
