//! Token references
//!
//! - `syntax` - delimiters and the scanner that splits values into literal and reference segments
//! - `resolver` - substitution of references with cycle and missing-target detection
//! - `sort` - ordering tokens so referenced tokens are emitted first

mod resolver;
mod sort;
mod syntax;

pub use resolver::{get_references, resolve_tree, uses_reference, Resolver};
pub use sort::sort_by_reference;
pub use syntax::{ReferenceSyntax, Segment};
