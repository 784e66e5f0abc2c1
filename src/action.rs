//! Platform actions
//!
//! Actions run once per platform after its files are built, for work that is
//! not a formatted file (copying assets, for example). Clean runs each
//! action's undo step.

use crate::config::PlatformConfig;
use crate::dictionary::Dictionary;
use crate::error::{Error, Result};
use crate::registry::Registry;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Context handed to actions.
pub struct ActionContext<'a> {
    pub dictionary: &'a Dictionary,
    pub platform: &'a PlatformConfig,
    /// Directory relative paths (sources, `buildPath`) are resolved against
    pub base_dir: &'a Path,
}

pub trait Action: Send + Sync {
    fn do_action(&self, context: &ActionContext<'_>) -> Result<()>;

    fn undo_action(&self, context: &ActionContext<'_>) -> Result<()>;
}

pub fn register_defaults(registry: &mut Registry) {
    registry.register_action("copy_assets", CopyAssets::default());
}

/// Copies a directory into the platform's build path.
#[derive(Debug, Clone)]
pub struct CopyAssets {
    source: PathBuf,
    target: String,
}

impl Default for CopyAssets {
    fn default() -> Self {
        Self::new("assets", "assets")
    }
}

impl CopyAssets {
    /// Copy `source` (relative to the base directory) to `buildPath + target`.
    pub fn new(source: impl Into<PathBuf>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }

    fn destination(&self, context: &ActionContext<'_>) -> PathBuf {
        context
            .base_dir
            .join(context.platform.full_destination(&self.target))
    }

    fn failure(&self, message: impl std::fmt::Display) -> Error {
        Error::Action {
            action: "copy_assets".to_string(),
            message: message.to_string(),
        }
    }
}

impl Action for CopyAssets {
    fn do_action(&self, context: &ActionContext<'_>) -> Result<()> {
        let source = context.base_dir.join(&self.source);
        if !source.is_dir() {
            return Err(self.failure(format!("{} is not a directory", source.display())));
        }
        let destination = self.destination(context);
        debug!("Copying {} to {}", source.display(), destination.display());

        for entry in WalkDir::new(&source).follow_links(true) {
            let entry = entry.map_err(|e| self.failure(e))?;
            let relative = entry
                .path()
                .strip_prefix(&source)
                .map_err(|e| self.failure(e))?;
            let target = destination.join(relative);
            if entry.file_type().is_dir() {
                fs::create_dir_all(&target)?;
            } else {
                fs::copy(entry.path(), &target)?;
            }
        }
        Ok(())
    }

    fn undo_action(&self, context: &ActionContext<'_>) -> Result<()> {
        let destination = self.destination(context);
        if destination.exists() {
            debug!("Removing {}", destination.display());
            fs::remove_dir_all(&destination)?;
        }
        Ok(())
    }
}
