//! Referenced-before-referencer ordering for formats that cannot forward-declare

use super::resolver::get_references;
use super::syntax::ReferenceSyntax;
use crate::tokens::{Token, TokenGroup};
use std::collections::{HashMap, HashSet};

/// Order `tokens` so that every token comes after the tokens it references,
/// directly or transitively.
///
/// The list is walked in order. Before a token is emitted, the listed tokens
/// it depends on are emitted depth-first. References are followed through
/// `tree`, so a dependency through a token missing from `tokens` still
/// counts. Tokens with no reference relationship keep their relative order.
pub fn sort_by_reference<'t>(
    tokens: &[&'t Token],
    tree: &TokenGroup,
    syntax: &ReferenceSyntax,
) -> Vec<&'t Token> {
    let mut walk = ReferenceWalk {
        tree,
        syntax,
        listed: tokens
            .iter()
            .map(|token| (token.path_string(), *token))
            .collect(),
        done: HashSet::new(),
        visiting: HashSet::new(),
        sorted: Vec::with_capacity(tokens.len()),
    };
    for token in tokens {
        walk.visit(token);
    }
    walk.sorted
}

struct ReferenceWalk<'a, 't> {
    tree: &'a TokenGroup,
    syntax: &'a ReferenceSyntax,
    listed: HashMap<String, &'t Token>,
    done: HashSet<String>,
    visiting: HashSet<String>,
    sorted: Vec<&'t Token>,
}

impl ReferenceWalk<'_, '_> {
    fn visit(&mut self, token: &Token) {
        let key = token.path_string();
        if self.done.contains(&key) {
            return;
        }
        // Cycles are rejected during resolution; stop here rather than recurse forever.
        if !self.visiting.insert(key.clone()) {
            return;
        }

        let tree = self.tree;
        for path in get_references(&token.original.value, self.syntax) {
            let target_key = path.join(".");
            if let Some(listed) = self.listed.get(&target_key).copied() {
                self.visit(listed);
            } else if let Some(target) = tree.lookup(&path) {
                self.visit(target);
            }
        }

        self.visiting.remove(&key);
        self.done.insert(key.clone());
        if let Some(listed) = self.listed.get(&key).copied() {
            self.sorted.push(listed);
        }
    }
}
