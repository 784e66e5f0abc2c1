//! Property-based tests for reference resolution, ordering and filtering

use proptest::prelude::*;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use tokensmith::filter::{filter_dictionary, Predicate};
use tokensmith::reference::{get_references, resolve_tree, sort_by_reference, ReferenceSyntax};
use tokensmith::tokens::{Token, TokenGroup};
use tokensmith::{Dictionary, Error};

/// Tokens `t0..tn` under `size`; each entry is either a literal or a
/// reference to an earlier token, so the graph is acyclic.
fn acyclic_tokens() -> impl Strategy<Value = Vec<Option<usize>>> {
    prop::collection::vec(any::<Option<prop::sample::Index>>(), 1..12).prop_map(|entries| {
        entries
            .into_iter()
            .enumerate()
            .map(|(i, target)| match (i, target) {
                (0, _) | (_, None) => None,
                (i, Some(index)) => Some(index.index(i)),
            })
            .collect()
    })
}

fn tree_from(entries: &[Option<usize>]) -> TokenGroup {
    let mut group = Map::new();
    for (i, target) in entries.iter().enumerate() {
        let value = match target {
            Some(target) => json!(format!("{{size.t{target}}} + 1")),
            None => json!(format!("{i}px")),
        };
        group.insert(format!("t{i}"), json!({ "value": value }));
    }
    TokenGroup::from_json(&json!({ "size": Value::Object(group) }))
}

fn resolved_dictionary(entries: &[Option<usize>]) -> Dictionary {
    let syntax = ReferenceSyntax::default();
    let resolved = resolve_tree(&tree_from(entries), &syntax).unwrap();
    Dictionary::new(resolved, syntax)
}

proptest! {
    #[test]
    fn prop_resolution_ignores_filters(
        entries in acyclic_tokens(),
        keep in prop::collection::vec(any::<bool>(), 12),
    ) {
        let dictionary = resolved_dictionary(&entries);
        let kept: Vec<String> = (0..entries.len())
            .filter(|i| keep[*i])
            .map(|i| format!("size.t{i}"))
            .collect();
        let predicate = Predicate::new(move |token: &Token| kept.contains(&token.path_string()));
        let filtered = filter_dictionary(&dictionary, Some(&predicate));

        for token in filtered.all_tokens() {
            let unfiltered = dictionary.tokens().lookup(&token.path).unwrap();
            prop_assert_eq!(&token.value, &unfiltered.value);
            prop_assert!(!dictionary.uses_reference(&token.value));
        }
        for token in filtered.tokens().tokens() {
            prop_assert!(filtered.all_tokens().contains(token));
        }
    }

    #[test]
    fn prop_accept_all_filter_is_identity(entries in acyclic_tokens()) {
        let dictionary = resolved_dictionary(&entries);
        let filtered = filter_dictionary(&dictionary, Some(&Predicate::new(|_| true)));
        prop_assert_eq!(filtered.tokens(), dictionary.tokens());
        prop_assert_eq!(filtered.all_tokens(), dictionary.all_tokens());
    }

    #[test]
    fn prop_sort_places_targets_first(
        entries in acyclic_tokens(),
        rotation in 0usize..12,
    ) {
        let syntax = ReferenceSyntax::default();
        let tree = tree_from(&entries);
        let mut tokens = tree.tokens();
        let len = tokens.len();
        tokens.rotate_left(rotation % len);

        let sorted = sort_by_reference(&tokens, &tree, &syntax);
        prop_assert_eq!(sorted.len(), len);

        let position: HashMap<String, usize> = sorted
            .iter()
            .enumerate()
            .map(|(i, token)| (token.path_string(), i))
            .collect();
        for token in &sorted {
            for target in get_references(&token.original.value, &syntax) {
                let target = target.join(".");
                prop_assert!(position[&target] < position[&token.path_string()]);
            }
        }
    }

    #[test]
    fn prop_plain_tokens_keep_relative_order(entries in acyclic_tokens()) {
        let syntax = ReferenceSyntax::default();
        let tree = tree_from(&entries);
        let tokens = tree.tokens();
        let sorted = sort_by_reference(&tokens, &tree, &syntax);

        let plain = |list: &[&Token]| -> Vec<String> {
            list.iter()
                .filter(|token| get_references(&token.original.value, &syntax).is_empty())
                .map(|token| token.path_string())
                .collect()
        };
        prop_assert_eq!(plain(&sorted), plain(&tokens));
    }

    #[test]
    fn prop_cycles_always_fail(len in 2usize..8, tail in 0usize..4) {
        // t0 -> t1 -> ... -> t(len-1) -> t0, plus acyclic tokens pointing into the ring
        let mut group = Map::new();
        for i in 0..len {
            let next = (i + 1) % len;
            group.insert(format!("t{i}"), json!({"value": format!("{{ring.t{next}}}")}));
        }
        for i in 0..tail {
            group.insert(format!("tail{i}"), json!({"value": "{ring.t0}"}));
        }
        let tree = TokenGroup::from_json(&json!({ "ring": Value::Object(group) }));

        match resolve_tree(&tree, &ReferenceSyntax::default()) {
            Err(Error::CircularReference { chain }) => {
                prop_assert_eq!(chain.first(), chain.last());
                prop_assert_eq!(chain.len(), len + 1);
            }
            other => prop_assert!(false, "expected a cycle error, got {:?}", other.map(|_| ())),
        }
    }
}
