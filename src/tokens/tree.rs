//! Ordered token tree: every node is either a group of children or a token

use super::token::Token;
use crate::error::Result;
use serde_json::{Map, Value};
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenNode {
    Group(TokenGroup),
    Token(Box<Token>),
}

impl TokenNode {
    pub fn as_token(&self) -> Option<&Token> {
        match self {
            TokenNode::Token(token) => Some(token),
            TokenNode::Group(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<&TokenGroup> {
        match self {
            TokenNode::Group(group) => Some(group),
            TokenNode::Token(_) => None,
        }
    }
}

/// A group of named children, kept in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenGroup {
    entries: Vec<(String, TokenNode)>,
}

impl TokenGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from a nested JSON object. Objects carrying a `value` key are
    /// tokens, every other object is a group; scalars outside a token are ignored.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Object(object) => Self::from_object(object, &mut Vec::new()),
            _ => Self::new(),
        }
    }

    fn from_object(object: &Map<String, Value>, path: &mut Vec<String>) -> Self {
        let mut group = Self::new();
        for (key, child) in object {
            path.push(key.clone());
            match child {
                Value::Object(child_object) if child_object.contains_key("value") => {
                    let token = Token::from_object(path.clone(), child_object);
                    group.insert(key.clone(), TokenNode::Token(Box::new(token)));
                }
                Value::Object(child_object) => {
                    let child_group = Self::from_object(child_object, path);
                    group.insert(key.clone(), TokenNode::Group(child_group));
                }
                _ => debug!("Ignoring non-token entry at '{}'", path.join(".")),
            }
            path.pop();
        }
        group
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&TokenNode> {
        self.entries
            .iter()
            .find(|(entry_key, _)| entry_key == key)
            .map(|(_, node)| node)
    }

    /// Insert or replace a child, keeping the position of an existing key.
    pub fn insert(&mut self, key: String, node: TokenNode) {
        match self.entries.iter_mut().find(|(entry_key, _)| *entry_key == key) {
            Some(entry) => entry.1 = node,
            None => self.entries.push((key, node)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TokenNode)> {
        self.entries.iter().map(|(key, node)| (key.as_str(), node))
    }

    /// Look up the token at `path`.
    pub fn lookup<S: AsRef<str>>(&self, path: &[S]) -> Option<&Token> {
        let (last, parents) = path.split_last()?;
        let mut group = self;
        for key in parents {
            group = group.get(key.as_ref())?.as_group()?;
        }
        group.get(last.as_ref())?.as_token()
    }

    pub fn contains_token<S: AsRef<str>>(&self, path: &[S]) -> bool {
        self.lookup(path).is_some()
    }

    /// All tokens in depth-first declaration order.
    pub fn tokens(&self) -> Vec<&Token> {
        let mut tokens = Vec::new();
        self.collect_tokens(&mut tokens);
        tokens
    }

    fn collect_tokens<'a>(&'a self, out: &mut Vec<&'a Token>) {
        for (_, node) in &self.entries {
            match node {
                TokenNode::Token(token) => out.push(token),
                TokenNode::Group(group) => group.collect_tokens(out),
            }
        }
    }

    /// Produce a new tree with `f` applied to every token.
    pub fn try_map_tokens<F>(&self, f: &mut F) -> Result<TokenGroup>
    where
        F: FnMut(&Token) -> Result<Token>,
    {
        let mut mapped = TokenGroup::new();
        for (key, node) in &self.entries {
            let node = match node {
                TokenNode::Token(token) => TokenNode::Token(Box::new(f(token)?)),
                TokenNode::Group(group) => TokenNode::Group(group.try_map_tokens(f)?),
            };
            mapped.entries.push((key.clone(), node));
        }
        Ok(mapped)
    }

    /// Produce a new tree holding only tokens accepted by `keep`; groups left
    /// without any token are dropped.
    pub fn retain_tokens<F>(&self, keep: &F) -> TokenGroup
    where
        F: Fn(&Token) -> bool,
    {
        let mut retained = TokenGroup::new();
        for (key, node) in &self.entries {
            match node {
                TokenNode::Token(token) if keep(token) => {
                    retained.entries.push((key.clone(), node.clone()));
                }
                TokenNode::Token(_) => {}
                TokenNode::Group(group) => {
                    let child = group.retain_tokens(keep);
                    if !child.is_empty() {
                        retained.entries.push((key.clone(), TokenNode::Group(child)));
                    }
                }
            }
        }
        retained
    }

    /// Nested JSON with each token rendered through [`Token::to_json`].
    pub fn to_json(&self) -> Value {
        self.to_json_with(&|token| token.to_json())
    }

    /// Nested JSON with each token rendered through `render`.
    pub fn to_json_with<F>(&self, render: &F) -> Value
    where
        F: Fn(&Token) -> Value,
    {
        let object = self
            .entries
            .iter()
            .map(|(key, node)| {
                let rendered = match node {
                    TokenNode::Token(token) => render(token),
                    TokenNode::Group(group) => group.to_json_with(render),
                };
                (key.clone(), rendered)
            })
            .collect();
        Value::Object(object)
    }
}
