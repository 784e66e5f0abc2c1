//! A single design token and its immutable pre-transform snapshot

use serde_json::{Map, Value};
use std::path::PathBuf;
use std::sync::Arc;

/// Keys the builder manages itself; everything else on a token object is carried as `extra`.
const RESERVED_KEYS: &[&str] = &[
    "value",
    "name",
    "attributes",
    "path",
    "original",
    "filePath",
    "isSource",
];

/// Snapshot of a token exactly as it was declared, minus provenance.
///
/// Captured once when the token is created and shared (never mutated) by
/// every transformed copy of the token.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenOriginal {
    pub value: Value,
    pub fields: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// Keys from the tree root down to this token
    pub path: Vec<String>,
    pub name: String,
    pub value: Value,
    pub original: Arc<TokenOriginal>,
    /// Populated by attribute transforms only
    pub attributes: Map<String, Value>,
    /// Additional declared fields such as `comment` or `type`
    pub extra: Map<String, Value>,
    pub file_path: Option<PathBuf>,
    pub is_source: bool,
}

impl Token {
    /// Create a token with a bare value at `path`.
    pub fn new(path: Vec<String>, value: Value) -> Self {
        let mut object = Map::new();
        object.insert("value".to_string(), value);
        Self::from_object(path, &object)
    }

    /// Build a token from its declared JSON object. The object must contain `value`.
    pub fn from_object(path: Vec<String>, object: &Map<String, Value>) -> Self {
        let value = object.get("value").cloned().unwrap_or(Value::Null);

        let name = object
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| path.last().cloned())
            .unwrap_or_default();

        let mut original_fields = Map::new();
        let mut extra = Map::new();
        for (key, field) in object {
            if matches!(key.as_str(), "value" | "filePath" | "isSource") {
                continue;
            }
            original_fields.insert(key.clone(), field.clone());
            if !RESERVED_KEYS.contains(&key.as_str()) {
                extra.insert(key.clone(), field.clone());
            }
        }

        Self {
            path,
            name,
            value: value.clone(),
            original: Arc::new(TokenOriginal {
                value,
                fields: original_fields,
            }),
            attributes: Map::new(),
            extra,
            file_path: object
                .get("filePath")
                .and_then(Value::as_str)
                .map(PathBuf::from),
            is_source: object
                .get("isSource")
                .and_then(Value::as_bool)
                .unwrap_or(true),
        }
    }

    /// Dotted path, e.g. `color.border.base`
    pub fn path_string(&self) -> String {
        self.path.join(".")
    }

    /// Value rendered as text; strings are returned verbatim, other values as compact JSON.
    pub fn value_string(&self) -> String {
        value_to_string(&self.value)
    }

    /// The `category`/`type`/`item` attribute, if an attribute transform has set it.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).and_then(Value::as_str)
    }

    /// Full JSON view of the token as exposed to matchers and formats.
    pub fn to_json(&self) -> Value {
        let mut object = Map::new();
        for (key, field) in &self.extra {
            object.insert(key.clone(), field.clone());
        }
        object.insert("value".to_string(), self.value.clone());
        object.insert("name".to_string(), Value::String(self.name.clone()));
        object.insert(
            "path".to_string(),
            Value::Array(self.path.iter().cloned().map(Value::String).collect()),
        );
        object.insert(
            "attributes".to_string(),
            Value::Object(self.attributes.clone()),
        );

        let mut original = self.original.fields.clone();
        original.insert("value".to_string(), self.original.value.clone());
        object.insert("original".to_string(), Value::Object(original));

        if let Some(file_path) = &self.file_path {
            object.insert(
                "filePath".to_string(),
                Value::String(file_path.to_string_lossy().into_owned()),
            );
        }
        object.insert("isSource".to_string(), Value::Bool(self.is_source));
        Value::Object(object)
    }
}

/// Render a JSON value the way it appears inside generated text.
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(_) | Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path(p: &str) -> Vec<String> {
        p.split('.').map(str::to_string).collect()
    }

    #[test]
    fn test_from_object_captures_original_without_provenance() {
        let object = json!({
            "value": "#000000",
            "comment": "border color",
            "filePath": "tokens/color.json",
            "isSource": false
        });
        let token = Token::from_object(path("color.border.base"), object.as_object().unwrap());

        assert_eq!(token.name, "base");
        assert_eq!(token.original.value, json!("#000000"));
        assert_eq!(token.original.fields.get("comment"), Some(&json!("border color")));
        assert!(!token.original.fields.contains_key("filePath"));
        assert!(!token.original.fields.contains_key("isSource"));
        assert_eq!(token.file_path, Some(PathBuf::from("tokens/color.json")));
        assert!(!token.is_source);
        assert!(token.attributes.is_empty());
    }

    #[test]
    fn test_declared_name_wins_over_key() {
        let object = json!({"value": 1, "name": "custom"});
        let token = Token::from_object(path("size.base"), object.as_object().unwrap());
        assert_eq!(token.name, "custom");
    }

    #[test]
    fn test_original_survives_value_changes() {
        let mut token = Token::new(path("size.base"), json!("16"));
        let snapshot = token.original.clone();
        token.value = json!("1rem");
        assert_eq!(token.original.value, json!("16"));
        assert!(Arc::ptr_eq(&snapshot, &token.original));
    }

    #[test]
    fn test_to_json_shape() {
        let mut token = Token::new(path("color.red"), json!("#ff0000"));
        token
            .attributes
            .insert("category".to_string(), json!("color"));
        let view = token.to_json();
        assert_eq!(view["name"], json!("red"));
        assert_eq!(view["path"], json!(["color", "red"]));
        assert_eq!(view["attributes"]["category"], json!("color"));
        assert_eq!(view["original"]["value"], json!("#ff0000"));
        assert_eq!(view["isSource"], json!(true));
    }

    #[test]
    fn test_value_to_string() {
        assert_eq!(value_to_string(&json!("abc")), "abc");
        assert_eq!(value_to_string(&json!(12)), "12");
        assert_eq!(value_to_string(&json!({"a": 1})), r#"{"a":1}"#);
        assert_eq!(value_to_string(&Value::Null), "");
    }
}
