//! Output formats
//!
//! A format turns a (filtered) [`Dictionary`] into the text of one output
//! file. Formats flagged `nested` keep the token tree structure, which makes
//! output-name collisions irrelevant for them.

mod builtin;
pub mod helpers;

pub use builtin::register_defaults;
pub use helpers::{create_property_formatter, file_header, formatted_variables, CommentStyle, VariableFormat};

use crate::config::{FileConfig, FileOptions, PlatformConfig};
use crate::dictionary::Dictionary;
use crate::error::Result;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Everything a format can look at.
pub struct FormatArgs<'a> {
    pub dictionary: &'a Dictionary,
    pub platform: &'a PlatformConfig,
    pub file: &'a FileConfig,
    pub options: &'a FileOptions,
}

impl<'a> FormatArgs<'a> {
    pub fn new(dictionary: &'a Dictionary, platform: &'a PlatformConfig, file: &'a FileConfig) -> Self {
        Self {
            dictionary,
            platform,
            file,
            options: &file.options,
        }
    }

    /// A free-form option; file options take precedence over platform options.
    pub fn option(&self, key: &str) -> Option<&Value> {
        self.options
            .extra
            .get(key)
            .or_else(|| self.platform.options.get(key))
    }

    pub fn output_references(&self) -> bool {
        self.options.output_references
            || self
                .platform
                .options
                .get("outputReferences")
                .and_then(Value::as_bool)
                .unwrap_or(false)
    }
}

pub type FormatFn = Arc<dyn Fn(&FormatArgs<'_>) -> Result<String> + Send + Sync>;

#[derive(Clone)]
pub struct Format {
    pub name: String,
    formatter: FormatFn,
    nested: bool,
}

impl Format {
    pub fn new<F>(name: impl Into<String>, formatter: F) -> Self
    where
        F: Fn(&FormatArgs<'_>) -> Result<String> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            formatter: Arc::new(formatter),
            nested: false,
        }
    }

    /// Mark the format as preserving the token tree structure.
    pub fn nested(mut self) -> Self {
        self.nested = true;
        self
    }

    pub fn is_nested(&self) -> bool {
        self.nested
    }

    pub fn format(&self, args: &FormatArgs<'_>) -> Result<String> {
        (self.formatter)(args)
    }
}

impl fmt::Debug for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Format")
            .field("name", &self.name)
            .field("nested", &self.nested)
            .finish()
    }
}
