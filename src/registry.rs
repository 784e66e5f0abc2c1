//! Registry of named transforms, transform groups, formats, filters, actions
//! and parsers
//!
//! Every build owns its own registry, so several builds with different
//! registrations can live in one process.

use crate::action::{self, Action};
use crate::combine::Parser;
use crate::config::PlatformConfig;
use crate::error::{Error, Result};
use crate::filter::Predicate;
use crate::format::{self, Format};
use crate::transform::{builtin, Transform};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct Registry {
    transforms: HashMap<String, Transform>,
    transform_groups: HashMap<String, Vec<String>>,
    formats: HashMap<String, Format>,
    filters: HashMap<String, Predicate>,
    actions: HashMap<String, Arc<dyn Action>>,
    parsers: Vec<Parser>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in transform, transform group, format,
    /// filter and action.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        builtin::register_defaults(&mut registry);
        format::register_defaults(&mut registry);
        action::register_defaults(&mut registry);
        registry.register_filter("isSource", |token| token.is_source);
        registry
    }

    /// Register a transform, replacing any transform with the same name.
    pub fn register_transform(&mut self, transform: Transform) -> &mut Self {
        self.transforms.insert(transform.name.clone(), transform);
        self
    }

    pub fn register_transform_group<I, S>(&mut self, name: impl Into<String>, transforms: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.transform_groups
            .insert(name.into(), transforms.into_iter().map(Into::into).collect());
        self
    }

    pub fn register_format(&mut self, format: Format) -> &mut Self {
        self.formats.insert(format.name.clone(), format);
        self
    }

    pub fn register_filter<F>(&mut self, name: impl Into<String>, predicate: F) -> &mut Self
    where
        F: Fn(&crate::tokens::Token) -> bool + Send + Sync + 'static,
    {
        self.filters.insert(name.into(), Predicate::new(predicate));
        self
    }

    pub fn register_action(&mut self, name: impl Into<String>, action: impl Action + 'static) -> &mut Self {
        self.actions.insert(name.into(), Arc::new(action));
        self
    }

    /// Register a custom parser. When several parsers match a file, the one
    /// registered last is used.
    pub fn register_parser(&mut self, parser: Parser) -> &mut Self {
        self.parsers.push(parser);
        self
    }

    pub fn transform(&self, name: &str) -> Option<&Transform> {
        self.transforms.get(name)
    }

    pub fn transform_group(&self, name: &str) -> Option<&[String]> {
        self.transform_groups.get(name).map(Vec::as_slice)
    }

    pub fn format(&self, name: &str) -> Option<&Format> {
        self.formats.get(name)
    }

    pub fn filter(&self, name: &str) -> Option<&Predicate> {
        self.filters.get(name)
    }

    pub fn action(&self, name: &str) -> Option<&Arc<dyn Action>> {
        self.actions.get(name)
    }

    pub fn parsers(&self) -> &[Parser] {
        &self.parsers
    }

    /// The ordered transforms of a platform. A transform group takes
    /// precedence over an explicit transform list.
    pub fn resolve_transforms(&self, platform: &PlatformConfig) -> Result<Vec<Transform>> {
        let names: Vec<String> = match (&platform.transform_group, &platform.transforms) {
            (Some(group), _) => self
                .transform_group(group)
                .ok_or_else(|| Error::config(format!("Unknown transformGroup \"{group}\"")))?
                .to_vec(),
            (None, Some(transforms)) => transforms.clone(),
            (None, None) => Vec::new(),
        };

        names
            .iter()
            .map(|name| {
                self.transform(name)
                    .cloned()
                    .ok_or_else(|| Error::config(format!("Unknown transform \"{name}\"")))
            })
            .collect()
    }

    /// The actions of a platform, in declaration order.
    pub fn resolve_actions(&self, platform: &PlatformConfig) -> Result<Vec<(String, Arc<dyn Action>)>> {
        platform
            .actions
            .iter()
            .map(|name| {
                self.action(name)
                    .map(|action| (name.clone(), Arc::clone(action)))
                    .ok_or_else(|| Error::config(format!("Unknown action \"{name}\"")))
            })
            .collect()
    }
}

fn sorted_keys<V>(map: &HashMap<String, V>) -> Vec<&str> {
    let mut keys: Vec<&str> = map.keys().map(String::as_str).collect();
    keys.sort_unstable();
    keys
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("transforms", &sorted_keys(&self.transforms))
            .field("transform_groups", &sorted_keys(&self.transform_groups))
            .field("formats", &sorted_keys(&self.formats))
            .field("filters", &sorted_keys(&self.filters))
            .field("actions", &sorted_keys(&self.actions))
            .field("parsers", &self.parsers.len())
            .finish()
    }
}
