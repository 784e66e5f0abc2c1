//! Platform dictionary: the transformed tokens handed to formats and actions

use crate::reference::{self, ReferenceSyntax};
use crate::tokens::{Token, TokenGroup};
use serde_json::Value;
use std::sync::Arc;

/// Transformed, resolved tokens for one platform.
///
/// Holds a (possibly filtered) tree, the matching flat list in depth-first
/// order, and the complete tree of the platform. The complete tree is shared
/// between all filtered views and is what reference lookups use, so a filter
/// never hides the target of a reference.
#[derive(Debug, Clone)]
pub struct Dictionary {
    tokens: TokenGroup,
    all_tokens: Vec<Token>,
    unfiltered: Arc<TokenGroup>,
    syntax: ReferenceSyntax,
}

impl Dictionary {
    pub fn new(tokens: TokenGroup, syntax: ReferenceSyntax) -> Self {
        let all_tokens = tokens.tokens().into_iter().cloned().collect();
        let unfiltered = Arc::new(tokens.clone());
        Self {
            tokens,
            all_tokens,
            unfiltered,
            syntax,
        }
    }

    /// A view over the same platform with different visible tokens.
    pub(crate) fn with_views(&self, tokens: TokenGroup, all_tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            all_tokens,
            unfiltered: Arc::clone(&self.unfiltered),
            syntax: self.syntax.clone(),
        }
    }

    pub fn tokens(&self) -> &TokenGroup {
        &self.tokens
    }

    /// Alias of [`Dictionary::tokens`].
    pub fn properties(&self) -> &TokenGroup {
        &self.tokens
    }

    pub fn all_tokens(&self) -> &[Token] {
        &self.all_tokens
    }

    /// Alias of [`Dictionary::all_tokens`].
    pub fn all_properties(&self) -> &[Token] {
        &self.all_tokens
    }

    /// The platform's complete tree, regardless of any filter.
    pub fn unfiltered_tokens(&self) -> &TokenGroup {
        &self.unfiltered
    }

    pub fn syntax(&self) -> &ReferenceSyntax {
        &self.syntax
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn uses_reference(&self, value: &Value) -> bool {
        reference::uses_reference(value, &self.syntax)
    }

    /// Tokens referenced by `value`, in order of appearance. Visible tokens are
    /// preferred; targets removed by a filter come from the complete tree.
    pub fn get_references(&self, value: &Value) -> Vec<&Token> {
        reference::get_references(value, &self.syntax)
            .iter()
            .filter_map(|path| {
                self.tokens
                    .lookup(path)
                    .or_else(|| self.unfiltered.lookup(path))
            })
            .collect()
    }

    /// Referenced paths of `value` that exist in the complete tree but not in this view.
    pub fn filtered_references(&self, value: &Value) -> Vec<Vec<String>> {
        reference::get_references(value, &self.syntax)
            .into_iter()
            .filter(|path| !self.tokens.contains_token(path) && self.unfiltered.contains_token(path))
            .collect()
    }

    /// Flat list ordered so referenced tokens come before the tokens using them.
    pub fn sorted_by_reference(&self) -> Vec<&Token> {
        let tokens: Vec<&Token> = self.all_tokens.iter().collect();
        reference::sort_by_reference(&tokens, &self.unfiltered, &self.syntax)
    }
}
