//! Token transforms
//!
//! A transform rewrites one aspect of a single token: its name, its
//! attributes or its value. Platforms list transforms (directly or through a
//! named transform group) and the pipeline applies them in three fixed
//! stages: all name transforms, then all attribute transforms, then all value
//! transforms, each stage in declaration order.

pub mod builtin;
pub mod case;
mod pipeline;

pub use pipeline::{export_tree, transform_tree, TransformPass};

use crate::config::PlatformConfig;
use crate::filter::Predicate;
use crate::tokens::Token;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

pub type NameFn = Arc<dyn Fn(&Token, &PlatformConfig) -> String + Send + Sync>;
pub type AttributeFn = Arc<dyn Fn(&Token, &PlatformConfig) -> Map<String, Value> + Send + Sync>;
pub type ValueFn =
    Arc<dyn Fn(&Token, &PlatformConfig) -> std::result::Result<Value, String> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TransformStage {
    Name,
    Attribute,
    Value,
}

#[derive(Clone)]
pub enum TransformKind {
    Name(NameFn),
    /// Returned attributes are merged over the token's existing ones
    Attribute(AttributeFn),
    /// Transitive value transforms also run on values produced by resolving references
    Value { transitive: bool, transform: ValueFn },
}

#[derive(Clone)]
pub struct Transform {
    pub name: String,
    pub kind: TransformKind,
    matcher: Option<Predicate>,
}

impl Transform {
    pub fn name<F>(name: impl Into<String>, transform: F) -> Self
    where
        F: Fn(&Token, &PlatformConfig) -> String + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            kind: TransformKind::Name(Arc::new(transform)),
            matcher: None,
        }
    }

    pub fn attribute<F>(name: impl Into<String>, transform: F) -> Self
    where
        F: Fn(&Token, &PlatformConfig) -> Map<String, Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            kind: TransformKind::Attribute(Arc::new(transform)),
            matcher: None,
        }
    }

    pub fn value<F>(name: impl Into<String>, transform: F) -> Self
    where
        F: Fn(&Token, &PlatformConfig) -> std::result::Result<Value, String>
            + Send
            + Sync
            + 'static,
    {
        Self {
            name: name.into(),
            kind: TransformKind::Value {
                transitive: false,
                transform: Arc::new(transform),
            },
            matcher: None,
        }
    }

    /// Only apply the transform to tokens accepted by `matcher`.
    pub fn with_matcher<F>(mut self, matcher: F) -> Self
    where
        F: Fn(&Token) -> bool + Send + Sync + 'static,
    {
        self.matcher = Some(Predicate::new(matcher));
        self
    }

    /// Mark a value transform as transitive. No effect on other kinds.
    pub fn transitive(mut self) -> Self {
        if let TransformKind::Value { transitive, .. } = &mut self.kind {
            *transitive = true;
        }
        self
    }

    pub fn stage(&self) -> TransformStage {
        match self.kind {
            TransformKind::Name(_) => TransformStage::Name,
            TransformKind::Attribute(_) => TransformStage::Attribute,
            TransformKind::Value { .. } => TransformStage::Value,
        }
    }

    pub fn is_transitive(&self) -> bool {
        matches!(self.kind, TransformKind::Value { transitive: true, .. })
    }

    pub fn matches(&self, token: &Token) -> bool {
        self.matcher
            .as_ref()
            .map_or(true, |matcher| matcher.matches(token))
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transform")
            .field("name", &self.name)
            .field("stage", &self.stage())
            .field("transitive", &self.is_transitive())
            .finish()
    }
}
