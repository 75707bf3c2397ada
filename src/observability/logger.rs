//! Structured logger for store lifecycle events.
//!
//! One log line = one event, written synchronously as JSON with the event
//! name first and fields in caller-supplied order. Logging never fails a
//! store operation.

use std::fmt;
use std::io::{self, Write};

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warn,
    Error,
}

impl Severity {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Synchronous structured logger
pub struct Logger;

impl Logger {
    pub fn info(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Info, event, fields);
    }

    pub fn warn(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Warn, event, fields);
    }

    /// Log an event with the given severity and fields
    pub fn log(severity: Severity, event: &str, fields: &[(&str, &str)]) {
        let line = render(severity, event, fields);

        // A failed write must not propagate into the store
        let _ = io::stdout().write_all(line.as_bytes());
    }
}

fn render(severity: Severity, event: &str, fields: &[(&str, &str)]) -> String {
    let mut line = String::with_capacity(128);
    line.push('{');
    push_pair(&mut line, "event", event);
    line.push(',');
    push_pair(&mut line, "severity", severity.as_str());
    for (key, value) in fields {
        line.push(',');
        push_pair(&mut line, key, value);
    }
    line.push('}');
    line.push('\n');
    line
}

fn push_pair(line: &mut String, key: &str, value: &str) {
    line.push('"');
    push_escaped(line, key);
    line.push_str("\":\"");
    push_escaped(line, value);
    line.push('"');
}

fn push_escaped(line: &mut String, raw: &str) {
    for c in raw.chars() {
        match c {
            '"' => line.push_str("\\\""),
            '\\' => line.push_str("\\\\"),
            '\n' => line.push_str("\\n"),
            '\r' => line.push_str("\\r"),
            '\t' => line.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                line.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => line.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_comes_first() {
        let line = render(Severity::Info, "ENTITY_CREATED", &[("kind", "video")]);
        assert!(line.starts_with("{\"event\":\"ENTITY_CREATED\""));
        assert!(line.contains("\"severity\":\"INFO\""));
        assert!(line.contains("\"kind\":\"video\""));
    }

    #[test]
    fn test_escaping() {
        let line = render(Severity::Warn, "X", &[("title", "a \"b\"\nc\\d")]);
        assert!(line.contains("a \\\"b\\\"\\nc\\\\d"));
    }

    #[test]
    fn test_valid_json() {
        let line = render(Severity::Error, "HARD_DELETE_BLOCKED", &[("id", "42")]);
        let parsed: serde_json::Value = serde_json::from_str(line.trim_end()).unwrap();
        assert_eq!(parsed["event"], "HARD_DELETE_BLOCKED");
        assert_eq!(parsed["severity"], "ERROR");
        assert_eq!(parsed["id"], "42");
    }

    #[test]
    fn test_log_does_not_panic() {
        Logger::info("STORE_OPEN", &[]);
        Logger::warn("STORE_WARN", &[("detail", "none")]);
    }
}
