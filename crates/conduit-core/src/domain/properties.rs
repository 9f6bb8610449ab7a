//! Helpers for configured-property maps

use serde_json::Value;
use tracing::warn;

use super::integration::ConfiguredProperties;

/// Parse a stored configured-properties payload.
///
/// Malformed or non-object JSON is logged and yields `None`, leaving the
/// affected form unpopulated.
pub fn parse_configured_properties(raw: &str) -> Option<ConfiguredProperties> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Some(map.into_iter().collect()),
        Ok(other) => {
            warn!(found = %other, "Configured properties payload is not an object");
            None
        }
        Err(err) => {
            warn!(error = %err, "Failed to parse configured properties payload");
            None
        }
    }
}

/// JSON-encode every value that is neither a string nor a number
pub fn stringify_values(properties: &ConfiguredProperties) -> ConfiguredProperties {
    properties
        .iter()
        .map(|(key, value)| {
            let value = match value {
                Value::String(_) | Value::Number(_) => value.clone(),
                other => Value::String(other.to_string()),
            };
            (key.clone(), value)
        })
        .collect()
}

/// Merge `incoming` into `target`, overwriting keys present in both
pub fn merge_into(target: &mut ConfiguredProperties, incoming: &ConfiguredProperties) {
    for (key, value) in incoming {
        target.insert(key.clone(), value.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_valid_object() {
        let props = parse_configured_properties(r#"{"period": 5000, "name": "tick"}"#).unwrap();
        assert_eq!(props.get("period"), Some(&json!(5000)));
        assert_eq!(props.get("name"), Some(&json!("tick")));
    }

    #[test]
    fn test_parse_malformed_is_none() {
        assert!(parse_configured_properties("{ not json").is_none());
        assert!(parse_configured_properties("[1, 2]").is_none());
    }

    #[test]
    fn test_stringify_values() {
        let mut props = ConfiguredProperties::new();
        props.insert("s".to_string(), json!("text"));
        props.insert("n".to_string(), json!(3));
        props.insert("b".to_string(), json!(true));
        props.insert("o".to_string(), json!({"k": [1]}));

        let out = stringify_values(&props);
        assert_eq!(out["s"], json!("text"));
        assert_eq!(out["n"], json!(3));
        assert_eq!(out["b"], json!("true"));
        assert_eq!(out["o"], json!(r#"{"k":[1]}"#));
    }

    #[test]
    fn test_merge_into() {
        let mut target = ConfiguredProperties::new();
        target.insert("a".to_string(), json!(1));
        target.insert("b".to_string(), json!(1));

        let mut incoming = ConfiguredProperties::new();
        incoming.insert("b".to_string(), json!(2));
        incoming.insert("c".to_string(), json!(3));

        merge_into(&mut target, &incoming);
        assert_eq!(target.len(), 3);
        assert_eq!(target["b"], json!(2));
    }
}
