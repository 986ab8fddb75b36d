//! JSON output for CLI handlers.
//!
//! Successful commands print their payload as pretty JSON on stdout; failures
//! print `{"error": {"kind", "message"}}` there instead, so scripts always get
//! one parseable document.

use serde_json::{json, Value};

use crate::error::Error;

/// Structured failure document for `err`.
#[must_use]
pub fn failure_payload(err: &Error) -> Value {
    json!({
        "error": {
            "kind": err.kind(),
            "message": err.to_string(),
        }
    })
}

fn render(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Print a successful result.
pub fn success(value: &Value) {
    println!("{}", render(value));
}

/// Print a failure.
pub fn failure(err: &Error) {
    println!("{}", render(&failure_payload(err)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ApiError, ConfigError};

    #[test]
    fn failure_payload_carries_kind_and_message() {
        let err: Error = ApiError::RateLimit {
            attempts: 4,
            message: "slow down".into(),
        }
        .into();

        let payload = failure_payload(&err);
        assert_eq!(payload["error"]["kind"], "rate_limit");
        assert_eq!(
            payload["error"]["message"],
            "rate limited after 4 attempts: slow down"
        );
    }

    #[test]
    fn config_failures_are_tagged_config() {
        let err: Error = ConfigError::MissingField {
            field: "EXCHANGE_API_KEY",
        }
        .into();
        assert_eq!(failure_payload(&err)["error"]["kind"], "config");
    }
}
