//! Shape checks for raw configuration values
//!
//! Every raw field is read through one of these helpers. A value of the wrong
//! shape comes back as `None`, so the caller falls through to its default
//! instead of failing.

use serde_yaml::Value;

/// Read a boolean
pub fn as_bool(value: &Value) -> Option<bool> {
    value.as_bool()
}

/// Read a string
pub fn as_string(value: &Value) -> Option<String> {
    value.as_str().map(str::to_string)
}

/// Read an integer >= 1 that fits in a u32
pub fn as_positive_u32(value: &Value) -> Option<u32> {
    value
        .as_u64()
        .filter(|n| *n >= 1)
        .and_then(|n| u32::try_from(n).ok())
}

/// Read a list where every entry is a string
pub fn as_string_list(value: &Value) -> Option<Vec<String>> {
    value
        .as_sequence()?
        .iter()
        .map(|item| item.as_str().map(str::to_string))
        .collect()
}

/// Bare boolean, string or list standing in for `{ enabled: <value> }`
pub fn is_shorthand(value: &Value) -> bool {
    matches!(value, Value::Bool(_) | Value::String(_) | Value::Sequence(_))
}

/// Merge an optional raw value against a typed default
///
/// Returns the extracted value when the raw value is present and well-typed,
/// otherwise the default.
pub fn merge<T>(raw: Option<&Value>, extract: impl Fn(&Value) -> Option<T>, default: T) -> T {
    raw.and_then(extract).unwrap_or(default)
}

/// Convert a raw YAML value into JSON
pub fn to_json(value: &Value) -> Option<serde_json::Value> {
    serde_json::to_value(value).ok()
}

/// Serialize a raw YAML value as a JSON string
pub fn to_json_string(value: &Value) -> Option<String> {
    serde_json::to_string(value).ok()
}

/// Render a mapping key for messages (keys are normally strings)
pub fn key_name(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|_| format!("{:?}", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(src: &str) -> Value {
        serde_yaml::from_str(src).unwrap()
    }

    #[test]
    fn test_positive_u32_rejects_zero_and_strings() {
        assert_eq!(as_positive_u32(&yaml("3")), Some(3));
        assert_eq!(as_positive_u32(&yaml("0")), None);
        assert_eq!(as_positive_u32(&yaml("-2")), None);
        assert_eq!(as_positive_u32(&yaml("'3'")), None);
        assert_eq!(as_positive_u32(&yaml("2.5")), None);
    }

    #[test]
    fn test_string_list_requires_every_entry_to_be_a_string() {
        assert_eq!(
            as_string_list(&yaml("[dev, prod]")),
            Some(vec!["dev".to_string(), "prod".to_string()])
        );
        assert_eq!(as_string_list(&yaml("[dev, 3]")), None);
        assert_eq!(as_string_list(&yaml("dev")), None);
    }

    #[test]
    fn test_merge_falls_back_on_wrong_type() {
        let raw = yaml("'ten'");
        assert_eq!(merge(Some(&raw), as_positive_u32, 10), 10);
        let raw = yaml("20");
        assert_eq!(merge(Some(&raw), as_positive_u32, 10), 20);
        assert_eq!(merge(None, as_positive_u32, 10), 10);
    }

    #[test]
    fn test_shorthand_shapes() {
        assert!(is_shorthand(&yaml("true")));
        assert!(is_shorthand(&yaml("prod")));
        assert!(is_shorthand(&yaml("[dev]")));
        assert!(!is_shorthand(&yaml("{enabled: true}")));
        assert!(!is_shorthand(&yaml("~")));
    }

    #[test]
    fn test_json_string_of_mapping() {
        let raw = yaml("{source: test}");
        assert_eq!(to_json_string(&raw).as_deref(), Some(r#"{"source":"test"}"#));
    }
}
