//! Response envelope handling.
//!
//! Some endpoints wrap their payload as `{ "data": ..., "message": "..." }`,
//! others return the payload directly.

use serde_json::Value;

/// Longest raw body excerpt used as an error message.
const MAX_ERROR_EXCERPT: usize = 200;

/// Strip the `{ data, message? }` envelope if present.
///
/// An object with a `data` key yields that value; anything else is returned
/// unchanged.
#[must_use]
pub fn unwrap_envelope(body: Value) -> Value {
    match body {
        Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Best-effort error message from a failed response body.
///
/// Prefers a `message` or `error` string field, then the raw text.
pub(crate) fn error_message(body: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        for key in ["message", "error"] {
            if let Some(Value::String(message)) = map.get(key) {
                return message.clone();
            }
        }
    }

    body.trim().chars().take(MAX_ERROR_EXCERPT).collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_enveloped_payload_is_unwrapped() {
        let body = json!({ "data": { "foo": 1 }, "message": "ok" });
        assert_eq!(unwrap_envelope(body), json!({ "foo": 1 }));
    }

    #[test]
    fn test_raw_payload_is_unchanged() {
        assert_eq!(unwrap_envelope(json!({ "foo": 1 })), json!({ "foo": 1 }));
        assert_eq!(unwrap_envelope(json!([1, 2])), json!([1, 2]));
        assert_eq!(unwrap_envelope(Value::Null), Value::Null);
    }

    #[test]
    fn test_null_data_is_kept() {
        assert_eq!(unwrap_envelope(json!({ "data": null })), Value::Null);
    }

    #[test]
    fn test_error_message_sources() {
        assert_eq!(error_message(r#"{"message":"Invalid OTP"}"#), "Invalid OTP");
        assert_eq!(error_message(r#"{"error":"Forbidden"}"#), "Forbidden");
        assert_eq!(error_message(" Bad Gateway \n"), "Bad Gateway");
        assert_eq!(error_message(""), "");
        assert_eq!(error_message(&"x".repeat(500)).len(), 200);
    }
}
