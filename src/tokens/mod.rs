//! Token data model
//!
//! A token tree is an ordered nesting of [`TokenGroup`]s whose leaves are
//! [`Token`]s. Trees are treated as immutable snapshots: every pipeline stage
//! produces a new tree rather than editing the one it was given.

mod token;
mod tree;

pub use token::{value_to_string, Token, TokenOriginal};
pub use tree::{TokenGroup, TokenNode};
