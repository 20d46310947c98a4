//! Permissive value extraction used when strict decoding fails.
//!
//! Providers occasionally send numbers as strings, `null` where a list is
//! expected, or objects where a string is expected. These helpers pull one
//! key at a time from a generic JSON tree and give up on that key only.

use serde_json::{Map, Value};

/// Read a number, accepting numeric strings (with `.` or `,` decimals).
pub fn number(obj: &Map<String, Value>, key: &str) -> Option<f64> {
    obj.get(key).and_then(as_number)
}

/// Read an integer, accepting numeric strings.
pub fn integer(obj: &Map<String, Value>, key: &str) -> Option<i64> {
    obj.get(key).and_then(|v| match v {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Read a string, stringifying numbers.
pub fn string(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(as_string)
}

/// Read a list of strings, tolerating a single string or `null`.
pub fn string_list(obj: &Map<String, Value>, key: &str) -> Vec<String> {
    match obj.get(key) {
        Some(Value::Array(items)) => items.iter().filter_map(as_string).collect(),
        Some(Value::String(s)) => s
            .split(',')
            .map(|part| part.trim().to_string())
            .filter(|part| !part.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}

pub fn as_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', ".").parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

pub fn as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_number_accepts_strings() {
        let o = obj(json!({"a": 1.5, "b": "150", "c": "12,5", "d": "n/a", "e": null}));
        assert_eq!(number(&o, "a"), Some(1.5));
        assert_eq!(number(&o, "b"), Some(150.0));
        assert_eq!(number(&o, "c"), Some(12.5));
        assert_eq!(number(&o, "d"), None);
        assert_eq!(number(&o, "e"), None);
        assert_eq!(number(&o, "missing"), None);
    }

    #[test]
    fn test_integer_accepts_strings() {
        let o = obj(json!({"a": 4, "b": "3", "c": 2.0, "d": true}));
        assert_eq!(integer(&o, "a"), Some(4));
        assert_eq!(integer(&o, "b"), Some(3));
        assert_eq!(integer(&o, "c"), Some(2));
        assert_eq!(integer(&o, "d"), None);
    }

    #[test]
    fn test_string_list_shapes() {
        let o = obj(json!({
            "list": ["en:milks", 5],
            "single": "en:milks, en:dairies",
            "null": null
        }));
        assert_eq!(string_list(&o, "list"), vec!["en:milks", "5"]);
        assert_eq!(string_list(&o, "single"), vec!["en:milks", "en:dairies"]);
        assert!(string_list(&o, "null").is_empty());
    }
}
