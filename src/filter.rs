//! Filter engine
//!
//! Filters prune a [`Dictionary`]'s tree and flat list for a single output
//! file. The dictionary itself is never changed, so one platform dictionary can
//! be filtered differently for every file it feeds.

use crate::dictionary::Dictionary;
use crate::error::{Error, Result};
use crate::registry::Registry;
use crate::tokens::Token;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Token predicate.
#[derive(Clone)]
pub struct Predicate(Arc<dyn Fn(&Token) -> bool + Send + Sync>);

impl Predicate {
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&Token) -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(predicate))
    }

    /// Predicate accepting tokens whose JSON view contains everything in `matcher`.
    pub fn from_matcher(matcher: Map<String, Value>) -> Self {
        let matcher = Value::Object(matcher);
        Self::new(move |token| is_match(&token.to_json(), &matcher))
    }

    pub fn matches(&self, token: &Token) -> bool {
        (self.0)(token)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate")
    }
}

/// How a file selects its tokens.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FilterSpec {
    /// A filter registered by name
    Named(String),
    /// Partial match against the token, e.g. `{"attributes": {"category": "color"}}`
    Matcher(Map<String, Value>),
    #[serde(skip)]
    Predicate(Predicate),
}

impl FilterSpec {
    pub fn predicate<F>(predicate: F) -> Self
    where
        F: Fn(&Token) -> bool + Send + Sync + 'static,
    {
        FilterSpec::Predicate(Predicate::new(predicate))
    }

    /// Shorthand for matching `attributes.<key> == value`.
    pub fn attribute(key: &str, value: impl Into<Value>) -> Self {
        let mut attributes = Map::new();
        attributes.insert(key.to_string(), value.into());
        let mut matcher = Map::new();
        matcher.insert("attributes".to_string(), Value::Object(attributes));
        FilterSpec::Matcher(matcher)
    }

    /// Turn the filter into a predicate, looking named filters up in `registry`.
    pub fn resolve(&self, registry: &Registry) -> Result<Predicate> {
        match self {
            FilterSpec::Named(name) => registry
                .filter(name)
                .cloned()
                .ok_or_else(|| Error::config(format!("Can't find filter: {name}"))),
            FilterSpec::Matcher(matcher) => Ok(Predicate::from_matcher(matcher.clone())),
            FilterSpec::Predicate(predicate) => Ok(predicate.clone()),
        }
    }
}

/// Partial deep equality: every key of `expected` must be present in `actual`
/// with a matching value; arrays and scalars compare exactly.
pub fn is_match(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Object(actual), Value::Object(expected)) => expected.iter().all(|(key, want)| {
            actual
                .get(key)
                .is_some_and(|have| is_match(have, want))
        }),
        _ => actual == expected,
    }
}

/// Apply `predicate` to both views of `dictionary`. `None` returns an identical dictionary.
pub fn filter_dictionary(dictionary: &Dictionary, predicate: Option<&Predicate>) -> Dictionary {
    let Some(predicate) = predicate else {
        return dictionary.clone();
    };

    let tokens = dictionary
        .tokens()
        .retain_tokens(&|token| predicate.matches(token));
    let all_tokens = dictionary
        .all_tokens()
        .iter()
        .filter(|token| predicate.matches(token))
        .cloned()
        .collect();
    dictionary.with_views(tokens, all_tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::ReferenceSyntax;
    use crate::tokens::TokenGroup;
    use proptest::prelude::*;
    use serde_json::json;

    fn dictionary() -> Dictionary {
        let tree = TokenGroup::from_json(&json!({
            "color": {
                "base": {"value": "#000", "type": "color"},
                "accent": {"value": "{color.base}", "type": "color"}
            },
            "size": {"small": {"value": "2px", "type": "dimension"}}
        }));
        Dictionary::new(tree, ReferenceSyntax::default())
    }

    #[test]
    fn test_no_filter_is_identity() {
        let dictionary = dictionary();
        let filtered = filter_dictionary(&dictionary, None);
        assert_eq!(filtered.tokens(), dictionary.tokens());
        assert_eq!(filtered.all_tokens(), dictionary.all_tokens());
    }

    #[test]
    fn test_matcher_filter_prunes_branches() {
        let dictionary = dictionary();
        let predicate = FilterSpec::Matcher(json!({"type": "dimension"}).as_object().unwrap().clone())
            .resolve(&Registry::new())
            .unwrap();
        let filtered = filter_dictionary(&dictionary, Some(&predicate));

        assert!(filtered.tokens().get("color").is_none());
        assert_eq!(filtered.all_tokens().len(), 1);
        assert_eq!(filtered.all_tokens()[0].path_string(), "size.small");
        // source dictionary untouched
        assert_eq!(dictionary.all_tokens().len(), 3);
    }

    #[test]
    fn test_filter_keeps_unfiltered_tree_for_lookups() {
        let dictionary = dictionary();
        let predicate = Predicate::new(|token| token.name == "accent");
        let filtered = filter_dictionary(&dictionary, Some(&predicate));

        assert!(filtered.tokens().lookup(&["color", "base"]).is_none());
        assert!(filtered.unfiltered_tokens().lookup(&["color", "base"]).is_some());
    }

    #[test]
    fn test_reject_all_yields_empty_tree() {
        let filtered = filter_dictionary(&dictionary(), Some(&Predicate::new(|_| false)));
        assert!(filtered.is_empty());
        assert!(filtered.tokens().is_empty());
    }

    #[test]
    fn test_unknown_named_filter_is_config_error() {
        let err = FilterSpec::Named("nope".into())
            .resolve(&Registry::new())
            .unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn test_is_match_partial_objects() {
        let actual = json!({"attributes": {"category": "color", "type": "base"}, "name": "x"});
        assert!(is_match(&actual, &json!({"attributes": {"category": "color"}})));
        assert!(!is_match(&actual, &json!({"attributes": {"category": "size"}})));
        assert!(!is_match(&actual, &json!({"missing": 1})));
        assert!(is_match(&actual, &json!({})));
    }

    proptest! {
        #[test]
        fn test_accept_all_filter_is_noop(keys in prop::collection::btree_set("[a-z]{1,6}", 1..12)) {
            let mut tree = serde_json::Map::new();
            for (index, key) in keys.iter().enumerate() {
                let leaf = json!({"value": index});
                let node = if index % 2 == 0 { json!({ "inner": leaf }) } else { leaf };
                tree.insert(key.clone(), node);
            }
            let dictionary = Dictionary::new(
                TokenGroup::from_json(&Value::Object(tree)),
                ReferenceSyntax::default(),
            );
            let filtered = filter_dictionary(&dictionary, Some(&Predicate::new(|_| true)));
            prop_assert_eq!(filtered.tokens(), dictionary.tokens());
            prop_assert_eq!(filtered.all_tokens(), dictionary.all_tokens());
        }
    }
}
