//! Total lookups over the host's untyped post objects. Every helper returns
//! `None` rather than failing when the shape is not what it expects.

use serde_json::Value;

/// Value at a nested key path.
pub fn at<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |v, key| v.get(*key))
}

/// Non-empty string at a key path.
pub fn str_at<'a>(value: &'a Value, path: &[&str]) -> Option<&'a str> {
    at(value, path)?.as_str().filter(|s| !s.is_empty())
}

/// An identifier given either as a string or a number.
pub fn as_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub fn id_at(value: &Value, path: &[&str]) -> Option<String> {
    at(value, path).and_then(as_id)
}

/// Items of a list given either as an array or as an object's values.
pub fn items(value: Option<&Value>) -> Vec<&Value> {
    match value {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(Value::Object(map)) => map.values().collect(),
        _ => Vec::new(),
    }
}

/// A probe that extracts one logical value from one known shape.
pub type Strategy<T> = fn(&Value) -> Option<T>;

/// Result of the first strategy that finds something.
pub fn first_of<T>(value: &Value, strategies: &[Strategy<T>]) -> Option<T> {
    strategies.iter().find_map(|strategy| strategy(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_at_and_str_at() {
        let v = json!({ "a": { "b": "x", "e": "" } });
        assert_eq!(str_at(&v, &["a", "b"]), Some("x"));
        assert_eq!(str_at(&v, &["a", "e"]), None);
        assert_eq!(str_at(&v, &["a", "c"]), None);
        assert!(at(&v, &[]).is_some());
    }

    #[test]
    fn test_ids_from_strings_and_numbers() {
        assert_eq!(as_id(&json!("17")), Some("17".to_string()));
        assert_eq!(
            as_id(&json!(1700000000000000001u64)),
            Some("1700000000000000001".to_string())
        );
        assert_eq!(as_id(&json!("")), None);
        assert_eq!(as_id(&json!(null)), None);
    }

    #[test]
    fn test_items_accepts_arrays_and_objects() {
        assert_eq!(items(Some(&json!([1, 2]))).len(), 2);
        assert_eq!(items(Some(&json!({ "a": 1 }))).len(), 1);
        assert!(items(Some(&json!("x"))).is_empty());
        assert!(items(None).is_empty());
    }

    #[test]
    fn test_first_of_order() {
        let v = json!({ "b": "second", "a": "first" });
        let strategies: [Strategy<String>; 2] = [
            |v| str_at(v, &["a"]).map(String::from),
            |v| str_at(v, &["b"]).map(String::from),
        ];
        assert_eq!(first_of(&v, &strategies), Some("first".to_string()));
    }
}
