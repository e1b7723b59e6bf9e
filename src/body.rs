//! Normalization of request/response bodies into JSON-safe values.
//!
//! Step glue hands over whatever the HTTP layer produced: parsed JSON,
//! raw text, or scalar odds and ends. Everything is folded into a
//! [`serde_json::Value`] so the bundle serializes without escaped-string
//! nesting. The function is total; nothing it is given can make it fail.

use serde_json::Value;

/// Convert an arbitrary body value into a form safe for JSON embedding.
///
/// * `Null` stays `Null`.
/// * Objects and arrays pass through unchanged.
/// * A string is parsed as JSON when possible, so nested JSON bodies
///   render as structure rather than as an escaped string; otherwise the
///   text is kept as-is.
/// * Any other scalar degrades to its display string.
pub fn normalize_body(body: Value) -> Value {
    match body {
        Value::Null | Value::Object(_) | Value::Array(_) => body,
        Value::String(text) => match serde_json::from_str::<Value>(&text) {
            Ok(parsed) => parsed,
            Err(_) => Value::String(text),
        },
        other => Value::String(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_stays_null() {
        assert_eq!(normalize_body(Value::Null), Value::Null);
    }

    #[test]
    fn objects_and_arrays_pass_through() {
        let object = json!({"a": 1, "b": [2, 3]});
        assert_eq!(normalize_body(object.clone()), object);

        let array = json!([1, "two", null]);
        assert_eq!(normalize_body(array.clone()), array);
    }

    #[test]
    fn json_encoded_string_becomes_structure() {
        let normalized = normalize_body(json!(r#"{"a":1}"#));
        assert_eq!(normalized, json!({"a": 1}));
    }

    #[test]
    fn plain_text_is_kept_unchanged() {
        let normalized = normalize_body(json!("plain text"));
        assert_eq!(normalized, json!("plain text"));
    }

    #[test]
    fn scalars_degrade_to_display_strings() {
        assert_eq!(normalize_body(json!(42)), json!("42"));
        assert_eq!(normalize_body(json!(true)), json!("true"));
        assert_eq!(normalize_body(json!(1.5)), json!("1.5"));
    }

    #[test]
    fn numeric_string_parses_as_number() {
        // "42" is valid JSON text, so it comes back as the number 42.
        assert_eq!(normalize_body(json!("42")), json!(42));
    }
}
