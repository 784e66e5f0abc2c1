//! Build and clean orchestration
//!
//! [`TokenSmith`] combines the token sources once, then builds or cleans
//! platforms on demand. Every platform gets its own transformed copy of the
//! combined tree; every file gets its own filtered view of that copy.

mod file;
pub mod messages;
pub mod report;
pub mod reporter;

pub use messages::MessageGroups;
pub use report::{BuildReport, Collision, FileOutcome, FileReport, FilteredReference, PlatformReport};
pub use reporter::{ConsoleReporter, LineStyle, MemoryReporter, Reporter, SilentReporter};

use crate::action::ActionContext;
use crate::combine;
use crate::config::{load_config, Config, PlatformConfig};
use crate::dictionary::Dictionary;
use crate::error::{Error, Result};
use crate::registry::Registry;
use crate::tokens::TokenGroup;
use crate::transform::export_tree;
use file::PlatformContext;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

pub struct TokenSmith {
    config: Config,
    registry: Registry,
    base_dir: PathBuf,
    tokens: TokenGroup,
    reporter: Arc<dyn Reporter>,
}

impl TokenSmith {
    /// Combine the configured sources relative to the current directory.
    pub fn new(config: Config, registry: Registry) -> Result<Self> {
        let base_dir = std::env::current_dir()?;
        Self::in_dir(config, registry, base_dir)
    }

    /// Combine the configured sources with relative paths (token globs and
    /// build paths) resolved against `base_dir`.
    pub fn in_dir(config: Config, registry: Registry, base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        let tokens = combine::combine(&config, &base_dir, registry.parsers())?;
        debug!("Combined {} tokens", tokens.tokens().len());
        Ok(Self {
            config,
            registry,
            base_dir,
            tokens,
            reporter: Arc::new(ConsoleReporter),
        })
    }

    /// Load a config file and build with the default registry.
    pub fn from_config_file(path: &Path, base_dir: impl Into<PathBuf>) -> Result<Self> {
        let config = load_config(path)?;
        Self::in_dir(config, Registry::with_defaults(), base_dir)
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The combined, untransformed token tree.
    pub fn tokens(&self) -> &TokenGroup {
        &self.tokens
    }

    fn platform(&self, name: &str) -> Result<&PlatformConfig> {
        self.config
            .platforms
            .get(name)
            .ok_or_else(|| Error::config(format!("Platform \"{name}\" does not exist")))
    }

    /// The platform's transformed and resolved tree. Nothing is written.
    pub fn export_platform(&self, name: &str) -> Result<TokenGroup> {
        let platform = self.platform(name)?;
        self.export(platform)
    }

    fn export(&self, platform: &PlatformConfig) -> Result<TokenGroup> {
        let transforms = self.registry.resolve_transforms(platform)?;
        export_tree(
            &self.tokens,
            &transforms,
            platform,
            &self.config.reference_syntax,
        )
    }

    fn dictionary(&self, platform: &PlatformConfig) -> Result<Dictionary> {
        Ok(Dictionary::new(
            self.export(platform)?,
            self.config.reference_syntax.clone(),
        ))
    }

    fn header(&self, name: &str, platform: &PlatformConfig) {
        if !platform.silent {
            self.reporter.log(&format!("\n{name}"));
        }
    }

    /// Build every platform in name order.
    pub fn build_all_platforms(&self) -> Result<BuildReport> {
        let mut report = BuildReport::default();
        for name in self.config.platforms.keys() {
            report.platforms.push(self.build_platform(name)?);
        }
        Ok(report)
    }

    /// Build the files of one platform in declaration order, then run its
    /// actions. An error stops the platform; files already written stay.
    pub fn build_platform(&self, name: &str) -> Result<PlatformReport> {
        let platform = self.platform(name)?;
        let actions = self.registry.resolve_actions(platform)?;
        info!("Building platform {}", name);
        self.header(name, platform);

        let dictionary = self.dictionary(platform)?;
        let context = PlatformContext {
            registry: &self.registry,
            platform,
            dictionary: &dictionary,
            base_dir: &self.base_dir,
            reporter: self.reporter.as_ref(),
        };

        let mut report = PlatformReport::new(name);
        let mut messages = MessageGroups::new();
        for file in &platform.files {
            report
                .files
                .push(file::build_file(&context, file, &mut messages)?);
        }

        let action_context = ActionContext {
            dictionary: &dictionary,
            platform,
            base_dir: &self.base_dir,
        };
        for (action_name, action) in actions {
            debug!("Running action {}", action_name);
            action.do_action(&action_context)?;
            report.actions.push(action_name);
        }
        Ok(report)
    }

    /// Clean every platform in name order.
    pub fn clean_all_platforms(&self) -> Result<BuildReport> {
        let mut report = BuildReport::default();
        for name in self.config.platforms.keys() {
            report.platforms.push(self.clean_platform(name)?);
        }
        Ok(report)
    }

    /// Remove what building the platform would produce: files first, then
    /// action output, then directories left empty.
    pub fn clean_platform(&self, name: &str) -> Result<PlatformReport> {
        let platform = self.platform(name)?;
        let actions = self.registry.resolve_actions(platform)?;
        info!("Cleaning platform {}", name);
        self.header(name, platform);

        let dictionary = self.dictionary(platform)?;
        let context = PlatformContext {
            registry: &self.registry,
            platform,
            dictionary: &dictionary,
            base_dir: &self.base_dir,
            reporter: self.reporter.as_ref(),
        };

        let mut report = PlatformReport::new(name);
        for file in &platform.files {
            report.files.push(file::clean_file(&context, file)?);
        }

        let action_context = ActionContext {
            dictionary: &dictionary,
            platform,
            base_dir: &self.base_dir,
        };
        for (action_name, action) in actions {
            debug!("Undoing action {}", action_name);
            action.undo_action(&action_context)?;
            report.actions.push(action_name);
        }

        for file in &report.files {
            if file.outcome == FileOutcome::Deleted {
                let removed = file::clean_dirs(&context, &file.destination)?;
                report.removed_dirs.extend(removed);
            }
        }
        Ok(report)
    }
}

impl std::fmt::Debug for TokenSmith {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSmith")
            .field("base_dir", &self.base_dir)
            .field("platforms", &self.config.platforms.keys().collect::<Vec<_>>())
            .field("registry", &self.registry)
            .finish()
    }
}
