use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Merge error at '{path}': cannot merge {incoming} into {existing}")]
    MergeType {
        path: String,
        existing: &'static str,
        incoming: &'static str,
    },

    #[error("Failed to load or parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Circular reference detected: {}", .chain.join(" -> "))]
    CircularReference { chain: Vec<String> },

    #[error("Reference '{{{reference}}}' used by '{token}' does not exist")]
    UnresolvedReference { reference: String, token: String },

    #[error("Transform '{transform}' failed on '{token}': {message}")]
    Transform {
        transform: String,
        token: String,
        message: String,
    },

    #[error("Format '{format}' failed for '{destination}': {message}")]
    Format {
        format: String,
        destination: String,
        message: String,
    },

    #[error("Action '{action}' failed: {message}")]
    Action { action: String, message: String },

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),
}

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }

    /// Whether the error comes from invalid configuration rather than token content
    pub fn is_config(&self) -> bool {
        matches!(self, Error::Config(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
