//! Build configuration
//!
//! Mirrors the on-disk config file: token sources, reference syntax and one
//! entry per platform, each listing the files to generate. Completion hooks
//! cannot come from a file and are attached programmatically.

mod loader;

pub use crate::filter::{FilterSpec, Predicate};
pub use loader::load_config;

use crate::dictionary::Dictionary;
use crate::reference::ReferenceSyntax;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Globs for token files; merged after `include` and tagged as source
    pub source: Vec<String>,
    /// Globs for base token files that `source` overrides
    pub include: Vec<String>,
    /// Inline tokens merged over everything loaded from files
    pub tokens: Option<Value>,
    /// Platforms by name; built in name order
    pub platforms: BTreeMap<String, PlatformConfig>,
    pub reference_syntax: ReferenceSyntax,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, pattern: impl Into<String>) -> Self {
        self.source.push(pattern.into());
        self
    }

    pub fn with_include(mut self, pattern: impl Into<String>) -> Self {
        self.include.push(pattern.into());
        self
    }

    pub fn with_tokens(mut self, tokens: Value) -> Self {
        self.tokens = Some(tokens);
        self
    }

    pub fn with_platform(mut self, name: impl Into<String>, platform: PlatformConfig) -> Self {
        self.platforms.insert(name.into(), platform);
        self
    }
}

/// One output target such as `web` or `android`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlatformConfig {
    pub transforms: Option<Vec<String>>,
    pub transform_group: Option<String>,
    /// Prefixed verbatim to every file destination
    pub build_path: Option<String>,
    /// Prefix applied by name transforms
    pub prefix: Option<String>,
    pub files: Vec<FileConfig>,
    pub actions: Vec<String>,
    pub silent: bool,
    pub write: Option<bool>,
    /// Free-form options available to transforms, formats and actions
    pub options: Map<String, Value>,
    #[serde(skip)]
    pub done: Option<DoneHook>,
}

impl PlatformConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transform_group(mut self, group: impl Into<String>) -> Self {
        self.transform_group = Some(group.into());
        self
    }

    pub fn with_transforms<I, S>(mut self, transforms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.transforms = Some(transforms.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_build_path(mut self, build_path: impl Into<String>) -> Self {
        self.build_path = Some(build_path.into());
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn with_file(mut self, file: FileConfig) -> Self {
        self.files.push(file);
        self
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.actions.push(action.into());
        self
    }

    pub fn silent(mut self) -> Self {
        self.silent = true;
        self
    }

    pub fn with_write(mut self, write: bool) -> Self {
        self.write = Some(write);
        self
    }

    pub fn with_done(mut self, hook: DoneHook) -> Self {
        self.done = Some(hook);
        self
    }

    pub fn writes_files(&self) -> bool {
        self.write.unwrap_or(true)
    }

    /// Full path of a destination under this platform's build path.
    pub fn full_destination(&self, destination: &str) -> String {
        match &self.build_path {
            Some(build_path) => format!("{build_path}{destination}"),
            None => destination.to_string(),
        }
    }
}

/// One generated file within a platform.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FileConfig {
    pub destination: Option<String>,
    pub format: Option<String>,
    pub filter: Option<FilterSpec>,
    pub options: FileOptions,
    pub silent: bool,
    pub write: Option<bool>,
    #[serde(skip)]
    pub done: Option<DoneHook>,
}

impl FileConfig {
    pub fn new(destination: impl Into<String>, format: impl Into<String>) -> Self {
        Self {
            destination: Some(destination.into()),
            format: Some(format.into()),
            ..Self::default()
        }
    }

    pub fn with_filter(mut self, filter: FilterSpec) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_output_references(mut self) -> Self {
        self.options.output_references = true;
        self
    }

    pub fn without_file_header(mut self) -> Self {
        self.options.show_file_header = Some(false);
        self
    }

    pub fn silent(mut self) -> Self {
        self.silent = true;
        self
    }

    pub fn with_write(mut self, write: bool) -> Self {
        self.write = Some(write);
        self
    }

    pub fn with_done(mut self, hook: DoneHook) -> Self {
        self.done = Some(hook);
        self
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FileOptions {
    /// Emit references (e.g. `var(--color-base)`) instead of resolved values
    pub output_references: bool,
    pub show_file_header: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FileOptions {
    pub fn show_file_header(&self) -> bool {
        self.show_file_header.unwrap_or(true)
    }
}

/// Arguments handed to completion hooks once a file has been formatted.
pub struct DoneArgs<'a> {
    pub file: &'a FileConfig,
    pub platform: &'a PlatformConfig,
    pub dictionary: &'a Dictionary,
    pub result: &'a str,
}

/// Completion hook run after a file is formatted (and written, if writing is enabled).
#[derive(Clone)]
pub struct DoneHook(Arc<dyn Fn(&DoneArgs<'_>) + Send + Sync>);

impl DoneHook {
    pub fn new<F>(hook: F) -> Self
    where
        F: Fn(&DoneArgs<'_>) + Send + Sync + 'static,
    {
        Self(Arc::new(hook))
    }

    pub fn call(&self, args: &DoneArgs<'_>) {
        (self.0)(args)
    }
}

impl fmt::Debug for DoneHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DoneHook")
    }
}
