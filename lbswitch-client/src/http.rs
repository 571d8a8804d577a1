//! Shared HTTP agent construction.

use std::time::Duration;

/// Bound applied to every outbound call unless overridden.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!("lbswitch/", env!("CARGO_PKG_VERSION"));

/// A blocking agent whose requests fail after `timeout` instead of hanging.
pub fn agent(timeout: Duration) -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
}

/// Pretty-print a JSON body for operators; anything else is returned untouched.
pub(crate) fn pretty_body(raw: &str) -> String {
    serde_json::from_str::<serde_json::Value>(raw)
        .and_then(|value| serde_json::to_string_pretty(&value))
        .unwrap_or_else(|_| raw.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pretty_body_formats_json() {
        assert_eq!(pretty_body(r#"{"a":1}"#), "{\n  \"a\": 1\n}");
    }

    #[test]
    fn pretty_body_keeps_plain_text() {
        assert_eq!(pretty_body("Bad Gateway"), "Bad Gateway");
    }
}
