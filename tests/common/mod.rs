//! Shared fixtures for integration tests

#![allow(dead_code)]

use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tokensmith::build::MemoryReporter;
use tokensmith::{Config, Registry, TokenSmith};

/// Builder for a throwaway project directory with token and config files
pub struct TestContextBuilder {
    temp_dir: TempDir,
    files: Vec<(PathBuf, String)>,
}

impl TestContextBuilder {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp dir"),
            files: Vec::new(),
        }
    }

    pub fn with_file(mut self, path: impl AsRef<Path>, content: &str) -> Self {
        self.files
            .push((path.as_ref().to_path_buf(), content.to_string()));
        self
    }

    /// Add a JSON file, e.g. a token source or `config.json`
    pub fn with_json(self, path: impl AsRef<Path>, value: Value) -> Self {
        let content = serde_json::to_string_pretty(&value).expect("Failed to serialize fixture");
        self.with_file(path, &content)
    }

    pub fn build(self) -> TestContext {
        for (path, content) in &self.files {
            let full = self.temp_dir.path().join(path);
            if let Some(parent) = full.parent() {
                fs::create_dir_all(parent).expect("Failed to create fixture dir");
            }
            fs::write(&full, content).expect("Failed to write fixture");
        }
        TestContext {
            temp_dir: self.temp_dir,
        }
    }
}

pub struct TestContext {
    temp_dir: TempDir,
}

impl TestContext {
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn exists(&self, path: impl AsRef<Path>) -> bool {
        self.path().join(path).exists()
    }

    pub fn read(&self, path: impl AsRef<Path>) -> String {
        fs::read_to_string(self.path().join(path)).expect("Failed to read output")
    }

    /// Builder rooted at this directory with the default registry and a
    /// capturing reporter.
    pub fn smith(&self, config: Config) -> (TokenSmith, Arc<MemoryReporter>) {
        self.smith_with(config, Registry::with_defaults())
    }

    pub fn smith_with(
        &self,
        config: Config,
        registry: Registry,
    ) -> (TokenSmith, Arc<MemoryReporter>) {
        let reporter = Arc::new(MemoryReporter::new());
        let smith = TokenSmith::in_dir(config, registry, self.path())
            .expect("Failed to combine tokens")
            .with_reporter(reporter.clone());
        (smith, reporter)
    }
}
