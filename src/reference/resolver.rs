//! Reference resolution against a complete token tree

use super::syntax::{ReferenceSyntax, Segment};
use crate::error::{Error, Result};
use crate::tokens::{value_to_string, Token, TokenGroup};
use serde_json::Value;
use std::collections::HashMap;
use tracing::trace;

/// Resolves `{path}` references inside token values.
///
/// Lookups always go to the tree the resolver was created with, which must be
/// the complete (unfiltered) tree for the platform. Resolved token values are
/// memoised, so each token is resolved at most once per resolver.
pub struct Resolver<'a> {
    tree: &'a TokenGroup,
    syntax: &'a ReferenceSyntax,
    /// Token paths currently being resolved, outermost first
    chain: Vec<String>,
    resolved: HashMap<String, Value>,
}

impl<'a> Resolver<'a> {
    pub fn new(tree: &'a TokenGroup, syntax: &'a ReferenceSyntax) -> Self {
        Self {
            tree,
            syntax,
            chain: Vec::new(),
            resolved: HashMap::new(),
        }
    }

    /// Resolve the value of `token`, following references to any depth.
    pub fn resolve_token(&mut self, token: &Token) -> Result<Value> {
        let key = token.path_string();
        if let Some(value) = self.resolved.get(&key) {
            return Ok(value.clone());
        }
        if let Some(start) = self.chain.iter().position(|entry| *entry == key) {
            let mut cycle = self.chain[start..].to_vec();
            cycle.push(key);
            return Err(Error::CircularReference { chain: cycle });
        }

        self.chain.push(key.clone());
        let result = self.resolve_value(&token.value, &key);
        self.chain.pop();

        let value = result?;
        self.resolved.insert(key, value.clone());
        Ok(value)
    }

    /// Resolve every reference inside `value`. `owner` names the token the
    /// value belongs to and is used in error messages.
    pub fn resolve_value(&mut self, value: &Value, owner: &str) -> Result<Value> {
        match value {
            Value::String(text) => self.resolve_string(text, owner),
            Value::Array(items) => items
                .iter()
                .map(|item| self.resolve_value(item, owner))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            Value::Object(object) => {
                let mut resolved = serde_json::Map::new();
                for (key, item) in object {
                    resolved.insert(key.clone(), self.resolve_value(item, owner)?);
                }
                Ok(Value::Object(resolved))
            }
            other => Ok(other.clone()),
        }
    }

    fn resolve_string(&mut self, text: &str, owner: &str) -> Result<Value> {
        let segments = self.syntax.scan(text);

        // A value that is exactly one reference takes the referenced value as-is,
        // keeping numbers and objects intact.
        if let [Segment::Reference(path)] = segments.as_slice() {
            return self.resolve_reference(path, owner);
        }

        let mut output = String::with_capacity(text.len());
        for segment in &segments {
            match segment {
                Segment::Literal(literal) => output.push_str(literal),
                Segment::Reference(path) => {
                    let value = self.resolve_reference(path, owner)?;
                    output.push_str(&value_to_string(&value));
                }
            }
        }
        Ok(Value::String(output))
    }

    fn resolve_reference(&mut self, path: &[String], owner: &str) -> Result<Value> {
        let tree = self.tree;
        let target = tree
            .lookup(path)
            .ok_or_else(|| Error::UnresolvedReference {
                reference: path.join("."),
                token: owner.to_string(),
            })?;
        trace!("Resolving {} -> {}", owner, target.path_string());
        self.resolve_token(target)
    }
}

/// Produce a new tree with every reference substituted.
pub fn resolve_tree(tree: &TokenGroup, syntax: &ReferenceSyntax) -> Result<TokenGroup> {
    let mut resolver = Resolver::new(tree, syntax);
    tree.try_map_tokens(&mut |token| {
        if !uses_reference(&token.value, syntax) {
            return Ok(token.clone());
        }
        let mut resolved = token.clone();
        resolved.value = resolver.resolve_token(token)?;
        Ok(resolved)
    })
}

/// Whether `value`, or any string nested inside it, contains a reference.
pub fn uses_reference(value: &Value, syntax: &ReferenceSyntax) -> bool {
    match value {
        Value::String(text) => syntax.contains_reference(text),
        Value::Array(items) => items.iter().any(|item| uses_reference(item, syntax)),
        Value::Object(object) => object.values().any(|item| uses_reference(item, syntax)),
        _ => false,
    }
}

/// Referenced paths inside `value` in order of appearance, without duplicates.
pub fn get_references(value: &Value, syntax: &ReferenceSyntax) -> Vec<Vec<String>> {
    let mut references = Vec::new();
    collect_references(value, syntax, &mut references);
    references
}

fn collect_references(value: &Value, syntax: &ReferenceSyntax, out: &mut Vec<Vec<String>>) {
    match value {
        Value::String(text) => {
            for path in syntax.references(text) {
                if !out.contains(&path) {
                    out.push(path);
                }
            }
        }
        Value::Array(items) => items
            .iter()
            .for_each(|item| collect_references(item, syntax, out)),
        Value::Object(object) => object
            .values()
            .for_each(|item| collect_references(item, syntax, out)),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resolve(tree_json: Value) -> Result<TokenGroup> {
        resolve_tree(&TokenGroup::from_json(&tree_json), &ReferenceSyntax::default())
    }

    #[test]
    fn test_partial_interpolation() {
        let tree = resolve(json!({
            "color": {"border": {
                "base": {"value": "#000000"},
                "focus": {"value": "1px solid {color.border.base}"}
            }}
        }))
        .unwrap();
        assert_eq!(
            tree.lookup(&["color", "border", "focus"]).unwrap().value,
            json!("1px solid #000000")
        );
    }

    #[test]
    fn test_whole_reference_keeps_type() {
        let tree = resolve(json!({
            "size": {"base": {"value": 16}, "body": {"value": "{size.base}"}},
            "shadow": {"base": {"value": {"x": 1}}, "card": {"value": "{shadow.base}"}}
        }))
        .unwrap();
        assert_eq!(tree.lookup(&["size", "body"]).unwrap().value, json!(16));
        assert_eq!(tree.lookup(&["shadow", "card"]).unwrap().value, json!({"x": 1}));
    }

    #[test]
    fn test_transitive_references() {
        let tree = resolve(json!({
            "a": {"value": "{b}"},
            "b": {"value": "{c} {c}"},
            "c": {"value": "{d.value}"},
            "d": {"value": "x"}
        }))
        .unwrap();
        assert_eq!(tree.lookup(&["a"]).unwrap().value, json!("x x"));
    }

    #[test]
    fn test_nested_structure_values() {
        let tree = resolve(json!({
            "color": {"value": "#111"},
            "border": {"value": {"color": "{color}", "widths": ["1px", "{width}"]}},
            "width": {"value": "2px"}
        }))
        .unwrap();
        assert_eq!(
            tree.lookup(&["border"]).unwrap().value,
            json!({"color": "#111", "widths": ["1px", "2px"]})
        );
    }

    #[test]
    fn test_two_token_cycle() {
        let err = resolve(json!({"a": {"value": "{b}"}, "b": {"value": "{a}"}})).unwrap_err();
        match &err {
            Error::CircularReference { chain } => {
                assert_eq!(chain, &vec!["a".to_string(), "b".to_string(), "a".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
        let message = err.to_string();
        assert!(message.contains('a') && message.contains('b'));
    }

    #[test]
    fn test_long_cycle_names_full_chain() {
        let err = resolve(json!({
            "x": {"value": "{a}"},
            "a": {"value": "{b}"},
            "b": {"value": "{c}"},
            "c": {"value": "pre {a}"}
        }))
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Circular reference detected: a -> b -> c -> a"
        );
    }

    #[test]
    fn test_self_reference() {
        let err = resolve(json!({"a": {"value": "{a}"}})).unwrap_err();
        assert!(matches!(err, Error::CircularReference { .. }));
    }

    #[test]
    fn test_unresolved_reference_names_both_paths() {
        let err = resolve(json!({"color": {"focus": {"value": "{color.missing}"}}})).unwrap_err();
        match err {
            Error::UnresolvedReference { reference, token } => {
                assert_eq!(reference, "color.missing");
                assert_eq!(token, "color.focus");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_reference_to_group_is_unresolved() {
        let err = resolve(json!({"color": {"red": {"value": "#f00"}}, "alias": {"value": "{color}"}}))
            .unwrap_err();
        assert!(matches!(err, Error::UnresolvedReference { .. }));
    }

    #[test]
    fn test_uses_reference_and_get_references() {
        let syntax = ReferenceSyntax::default();
        let value = json!({"a": "{x.y} and {z}", "b": ["{x.y}"]});
        assert!(uses_reference(&value, &syntax));
        assert!(!uses_reference(&json!(12), &syntax));
        assert_eq!(
            get_references(&value, &syntax),
            vec![
                vec!["x".to_string(), "y".to_string()],
                vec!["z".to_string()]
            ]
        );
    }
}
