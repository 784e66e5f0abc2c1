//! Structured results of build and clean runs

use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BuildReport {
    pub platforms: Vec<PlatformReport>,
}

impl BuildReport {
    pub fn platform(&self, name: &str) -> Option<&PlatformReport> {
        self.platforms.iter().find(|platform| platform.platform == name)
    }

    pub fn files(&self) -> impl Iterator<Item = &FileReport> {
        self.platforms.iter().flat_map(|platform| platform.files.iter())
    }

    pub fn has_warnings(&self) -> bool {
        self.files().any(FileReport::has_warnings)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlatformReport {
    pub platform: String,
    pub files: Vec<FileReport>,
    /// Actions run (or undone) for the platform, in order
    pub actions: Vec<String>,
    /// Directories removed by clean
    pub removed_dirs: Vec<String>,
}

impl PlatformReport {
    pub fn new(platform: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            ..Self::default()
        }
    }

    pub fn file(&self, destination: &str) -> Option<&FileReport> {
        self.files.iter().find(|file| file.destination == destination)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FileOutcome {
    /// Formatted and written to disk
    Written,
    /// Formatted, writing disabled by `write: false`
    Formatted,
    /// No tokens survived the filter, or clean had nothing to mirror
    Skipped,
    /// Removed by clean
    Deleted,
    /// Clean found nothing to remove
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileReport {
    /// Destination including the platform build path
    pub destination: String,
    pub outcome: FileOutcome,
    pub collisions: Vec<Collision>,
    pub filtered_references: Vec<FilteredReference>,
}

impl FileReport {
    pub fn new(destination: impl Into<String>, outcome: FileOutcome) -> Self {
        Self {
            destination: destination.into(),
            outcome,
            collisions: Vec::new(),
            filtered_references: Vec::new(),
        }
    }

    pub fn has_warnings(&self) -> bool {
        !self.collisions.is_empty() || !self.filtered_references.is_empty()
    }
}

/// Several tokens producing the same output name in one file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Collision {
    pub name: String,
    /// `(path, value)` of every token with that name
    pub tokens: Vec<(String, String)>,
}

/// A reference whose target exists but was removed by the file's filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilteredReference {
    /// Path of the token using the reference
    pub token: String,
    /// Path of the filtered-out target
    pub reference: String,
}
