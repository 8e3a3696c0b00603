//! Project discovery and loading

mod loading;
pub mod packages;

use crate::settings::ProjectConfig;
use std::path::PathBuf;

/// Name of the directory holding definition files
pub const DEFINITIONS_DIR: &str = "definitions";

/// File extension of definition files
pub const DEFINITION_EXTENSION: &str = "sqlx";

/// A dagform project on disk
#[derive(Debug)]
pub struct Project {
    /// Project root directory
    pub root: PathBuf,

    /// Resolved settings, overrides applied
    pub config: ProjectConfig,

    /// Definition files relative to `root`, forward-slash separated and sorted
    pub definition_paths: Vec<String>,
}

impl Project {
    /// Absolute path of a definition file
    pub fn definition_path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    /// Number of discovered definition files
    pub fn definition_count(&self) -> usize {
        self.definition_paths.len()
    }
}

#[cfg(test)]
#[path = "project_test.rs"]
mod tests;
