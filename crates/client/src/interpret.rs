//! Best-effort extraction of a human-readable error from an API response body.
//!
//! Error responses are normally a JSON object with a `message` field, and
//! often the `message` string is itself a serialized error object with
//! `name`/`message` (plus arbitrary extra fields). We unpack the body to
//! whatever extent possible and hand back the friendliest representation;
//! `None` means the caller should fall back to a generic status-code error.

use serde_json::Value;

/// Try to pull a specific error message out of a raw response body.
pub fn interpret_error_body(body: &[u8]) -> Option<String> {
    let outer: Value = serde_json::from_slice(body).ok()?;
    let message = outer.get("message")?.as_str()?;

    // See if the message itself is a serialized error object.
    match parse_serialized_error(message) {
        Some(unpacked) => Some(unpacked),
        None => Some(message.to_string()),
    }
}

/// Parse a serialized error object. Expects at least `name` and `message`
/// fields, possibly with extras (e.g. `code`). Extra-field order follows the
/// parsed map and is unspecified.
fn parse_serialized_error(message: &str) -> Option<String> {
    let value: Value = serde_json::from_str(message).ok()?;
    let fields = value.as_object()?;
    let name = fields.get("name")?.as_str()?;
    let text = fields.get("message")?.as_str()?;

    let extras: Vec<String> = fields
        .iter()
        .filter(|(key, _)| key.as_str() != "name" && key.as_str() != "message")
        .map(|(key, value)| format!("{}: {}", key, display_value(value)))
        .collect();

    if extras.is_empty() {
        Some(format!("{}: {}", name, text))
    } else {
        Some(format!("{}: {} ({})", name, text, extras.join(", ")))
    }
}

/// Render a JSON value for inclusion in an error message; strings are shown
/// without surrounding quotes.
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_json_body_yields_none() {
        assert_eq!(interpret_error_body(b"not even json"), None);
    }

    #[test]
    fn test_body_without_message_yields_none() {
        assert_eq!(interpret_error_body(br#"{"no":"message field"}"#), None);
    }

    #[test]
    fn test_plain_message_returned_verbatim() {
        assert_eq!(
            interpret_error_body(br#"{"message":"just a message"}"#),
            Some("just a message".to_string())
        );
    }

    #[test]
    fn test_nested_non_error_object_returned_verbatim() {
        assert_eq!(
            interpret_error_body(br#"{"message":"{\"something\":\"other than an error\"}"}"#),
            Some(r#"{"something":"other than an error"}"#.to_string())
        );
    }

    #[test]
    fn test_nested_error_without_extras() {
        assert_eq!(
            interpret_error_body(
                br#"{"message":"{\"name\":\"AwesomeError\",\"message\":\"This error has no extra fields.\"}"}"#
            ),
            Some("AwesomeError: This error has no extra fields.".to_string())
        );
    }

    #[test]
    fn test_nested_error_with_extras_either_order() {
        let interpreted = interpret_error_body(
            br#"{"message":"{\"name\":\"AwesomeError\",\"message\":\"This error does have extra fields.\",\"code\":42,\"foo_bar\":false}"}"#,
        )
        .unwrap();
        let acceptable = [
            "AwesomeError: This error does have extra fields. (code: 42, foo_bar: false)",
            "AwesomeError: This error does have extra fields. (foo_bar: false, code: 42)",
        ];
        assert!(
            acceptable.contains(&interpreted.as_str()),
            "unexpected output format: {interpreted}"
        );
    }

    #[test]
    fn test_nested_error_missing_name_or_message() {
        assert_eq!(
            interpret_error_body(br#"{"message":"{\"name\":\"no message field here\"}"}"#),
            Some(r#"{"name":"no message field here"}"#.to_string())
        );
        assert_eq!(
            interpret_error_body(br#"{"message":"{\"message\":\"no name field here\"}"}"#),
            Some(r#"{"message":"no name field here"}"#.to_string())
        );
    }

    #[test]
    fn test_non_string_message_yields_none() {
        assert_eq!(interpret_error_body(br#"{"message":42}"#), None);
    }
}
