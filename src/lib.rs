//! # tokensmith
//!
//! Turns a tree of design tokens into per-platform source files: CSS custom
//! properties, Sass and Less variables, JSON, JavaScript modules and Android
//! resources.
//!
//! ## Usage
//!
//! ```bash
//! tokensmith build [-c config.json] [-p platform]...
//! tokensmith clean [-c config.json] [-p platform]...
//! ```
//!
//! ## Modules
//!
//! - `tokens` - Token and token tree model
//! - `combine` - Loads and deep-merges token source files
//! - `reference` - Reference syntax, resolution with cycle detection, reference ordering
//! - `transform` - Name, attribute and value transforms and the staged pipeline
//! - `dictionary` - Transformed tokens of one platform
//! - `filter` - Per-file token filters
//! - `format` - Output formats and format helpers
//! - `action` - Platform actions with undo
//! - `registry` - Named transforms, groups, formats, filters, actions and parsers
//! - `config` - Build configuration and config file loading
//! - `build` - Build and clean orchestration and reporting
//! - `app` - Binary support: logging and fatal error handling
pub mod action;
pub mod app;
pub mod build;
pub mod combine;
pub mod config;
pub mod dictionary;
pub mod error;
pub mod filter;
pub mod format;
pub mod reference;
pub mod registry;
pub mod tokens;
pub mod transform;

pub use build::TokenSmith;
pub use config::{Config, FileConfig, PlatformConfig};
pub use dictionary::Dictionary;
pub use error::{Error, Result};
pub use registry::Registry;
