//! Notification message composition.
//!
//! Messages are built from named inputs only. The host identity is
//! injected at construction so output is deterministic under test.

use std::time::Duration;

/// Composes notification bodies for one host.
#[derive(Debug, Clone)]
pub struct MessageBuilder {
    hostname: String,
}

impl MessageBuilder {
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
        }
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Body for a check that completed and reported failure.
    pub fn failure(&self, reason: &str) -> String {
        format!("[{}]: {}", self.hostname, reason)
    }

    /// Body for a check that raised an unexpected error.
    pub fn error(&self, error: &str) -> String {
        format!("[{}]: check error: {}", self.hostname, error)
    }

    /// Body for a check that exceeded its deadline.
    pub fn timeout(&self, detail: &str) -> String {
        format!("[{}]: timeout: {}", self.hostname, detail)
    }
}

/// Resolve the local host name, falling back to `localhost`.
pub fn local_hostname() -> String {
    match hostname::get() {
        Ok(name) => name.to_string_lossy().into_owned(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to resolve hostname, using 'localhost'");
            "localhost".to_string()
        }
    }
}

/// Render a duration as whole or fractional seconds (`3s`, `0.25s`).
pub fn format_duration(d: Duration) -> String {
    if d.subsec_nanos() == 0 {
        format!("{}s", d.as_secs())
    } else {
        let rendered = format!("{}.{:09}", d.as_secs(), d.subsec_nanos());
        format!("{}s", rendered.trim_end_matches('0'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_hostname() {
        let builder = MessageBuilder::new("web-1");
        assert_eq!(builder.hostname(), "web-1");
        assert_eq!(builder.failure("disk full"), "[web-1]: disk full");
        assert_eq!(builder.error("boom"), "[web-1]: check error: boom");
        assert_eq!(
            builder.timeout("example.org did not respond in 3 seconds"),
            "[web-1]: timeout: example.org did not respond in 3 seconds"
        );
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(3)), "3s");
        assert_eq!(format_duration(Duration::from_millis(250)), "0.25s");
        assert_eq!(format_duration(Duration::from_millis(10)), "0.01s");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.5s");
        assert_eq!(format_duration(Duration::from_micros(250)), "0.00025s");
        assert_eq!(format_duration(Duration::from_nanos(1)), "0.000000001s");
    }
}
