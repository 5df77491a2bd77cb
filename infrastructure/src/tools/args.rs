//! Shared argument extraction for tool implementations.
//!
//! Arguments arrive as a JSON object decided by the mediator, so every
//! accessor has to tolerate missing keys and wrong types and answer with
//! an `INVALID_ARGUMENT` error instead of panicking.

use postpilot_domain::ToolError;
use serde_json::{Map, Value};

pub(crate) fn require_str<'a>(
    args: &'a Map<String, Value>,
    key: &str,
) -> Result<&'a str, ToolError> {
    args.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ToolError::invalid_argument(format!("Missing required argument: {}", key)))
}

pub(crate) fn require_value<'a>(
    args: &'a Map<String, Value>,
    key: &str,
) -> Result<&'a Value, ToolError> {
    args.get(key)
        .filter(|v| !v.is_null())
        .ok_or_else(|| ToolError::invalid_argument(format!("Missing required argument: {}", key)))
}

pub(crate) fn optional_str<'a>(args: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    args.get(key).and_then(Value::as_str)
}

pub(crate) fn optional_u64(
    args: &Map<String, Value>,
    key: &str,
    default: u64,
) -> Result<u64, ToolError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(default),
        Some(value) => value
            .as_u64()
            .ok_or_else(|| ToolError::invalid_argument(format!("{} must be a positive integer", key))),
    }
}

pub(crate) fn optional_bool(
    args: &Map<String, Value>,
    key: &str,
    default: bool,
) -> Result<bool, ToolError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(default),
        Some(value) => value
            .as_bool()
            .ok_or_else(|| ToolError::invalid_argument(format!("{} must be a boolean", key))),
    }
}

pub(crate) fn optional_str_list(
    args: &Map<String, Value>,
    key: &str,
) -> Result<Vec<String>, ToolError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(vec![]),
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| {
                v.as_str().map(str::to_string).ok_or_else(|| {
                    ToolError::invalid_argument(format!("{} must be a list of strings", key))
                })
            })
            .collect(),
        Some(_) => Err(ToolError::invalid_argument(format!(
            "{} must be a list of strings",
            key
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_require_str_rejects_blank_and_missing() {
        let a = args(json!({"user_id": "  "}));
        assert!(require_str(&a, "user_id").is_err());
        assert!(require_str(&a, "other").is_err());

        let b = args(json!({"user_id": "u-1"}));
        assert_eq!(require_str(&b, "user_id").unwrap(), "u-1");
    }

    #[test]
    fn test_optional_u64_default_and_type_check() {
        let a = args(json!({"limit": 5, "bad": "three"}));
        assert_eq!(optional_u64(&a, "limit", 3).unwrap(), 5);
        assert_eq!(optional_u64(&a, "missing", 3).unwrap(), 3);
        assert!(optional_u64(&a, "bad", 3).is_err());
    }

    #[test]
    fn test_optional_str_list() {
        let a = args(json!({"tags": ["rust", "infra"], "bad": [1]}));
        assert_eq!(optional_str_list(&a, "tags").unwrap(), vec!["rust", "infra"]);
        assert!(optional_str_list(&a, "missing").unwrap().is_empty());
        assert!(optional_str_list(&a, "bad").is_err());
    }
}
