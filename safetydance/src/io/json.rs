//! JSON encode/decode reporting failures through the last-error slot.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::core::invoke::call;

/// Parse `text` as JSON, or `None` if it is malformed.
pub fn parse(text: &str) -> Option<Value> {
    call(|| serde_json::from_str(text))
}

/// Parse `text` into `T`, or `None` on malformed input or shape mismatch.
pub fn parse_as<T: DeserializeOwned>(text: &str) -> Option<T> {
    call(|| serde_json::from_str(text))
}

/// Serialize compactly, or `None` if `value` cannot be represented as JSON.
pub fn stringify<T: Serialize + ?Sized>(value: &T) -> Option<String> {
    call(|| serde_json::to_string(value))
}

pub fn stringify_pretty<T: Serialize + ?Sized>(value: &T) -> Option<String> {
    call(|| serde_json::to_string_pretty(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::invoke::{has_error, last_error};
    use serde::Deserialize;
    use std::collections::BTreeMap;

    #[test]
    fn bad_json_returns_none_with_error() {
        let json = parse("This is totally { not json }");
        assert!(json.is_none());
        let err = last_error().expect("error recorded");
        assert!(err.downcast_ref::<serde_json::Error>().is_some());
    }

    #[test]
    fn good_json_clears_error() {
        let _ = parse("{");
        let json = parse(r#"{ "totally" : "json" }"#).expect("parsed");
        assert_eq!(json["totally"], "json");
        assert!(!has_error());
    }

    #[test]
    fn parse_as_reports_shape_mismatch() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Point {
            x: i64,
            y: i64,
        }

        assert_eq!(parse_as::<Point>(r#"{"x":1,"y":2}"#), Some(Point { x: 1, y: 2 }));
        assert_eq!(parse_as::<Point>(r#"{"x":1}"#), None);
        assert!(has_error());
    }

    #[test]
    fn unrepresentable_value_returns_none() {
        let mut map = BTreeMap::new();
        map.insert(vec![1u8], 1);
        assert_eq!(stringify(&map), None);
        assert!(has_error());
    }

    #[test]
    fn stringify_compact_and_pretty() {
        let value = serde_json::json!({ "a": [1, 2] });
        assert_eq!(stringify(&value).as_deref(), Some(r#"{"a":[1,2]}"#));
        let pretty = stringify_pretty(&value).expect("pretty");
        assert!(pretty.contains('\n'));
        assert!(!has_error());
    }
}
