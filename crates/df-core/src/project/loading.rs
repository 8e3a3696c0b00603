//! Project discovery and definition-file enumeration

use crate::error::{CoreError, CoreResult};
use crate::settings::{ProjectConfig, SettingsOverrides};
use std::path::Path;

use super::{Project, DEFINITIONS_DIR, DEFINITION_EXTENSION};

impl Project {
    /// Load a project from a directory.
    ///
    /// Resolves settings (including the core-version rules and overrides) and
    /// enumerates definition files. Definition contents are read later by the
    /// compiler.
    pub fn load(path: &Path, overrides: &SettingsOverrides) -> CoreResult<Self> {
        let root = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()?.join(path)
        };

        if !root.is_dir() {
            return Err(CoreError::ProjectNotFound {
                path: root.display().to_string(),
            });
        }

        let config = ProjectConfig::resolve(&root, overrides)?;

        let definitions = root.join(DEFINITIONS_DIR);
        let mut definition_paths = Vec::new();
        if definitions.is_dir() {
            discover_definitions_recursive(&root, &definitions, &mut definition_paths)?;
        } else {
            log::debug!("No {} directory in {}", DEFINITIONS_DIR, root.display());
        }
        definition_paths.sort();

        log::debug!(
            "Discovered {} definition files in {}",
            definition_paths.len(),
            root.display()
        );

        Ok(Self {
            root,
            config,
            definition_paths,
        })
    }
}

/// Recursively collect `*.sqlx` files under `dir`, skipping hidden entries.
fn discover_definitions_recursive(
    root: &Path,
    dir: &Path,
    paths: &mut Vec<String>,
) -> CoreResult<()> {
    for entry in std::fs::read_dir(dir).map_err(|e| CoreError::IoWithPath {
        path: dir.display().to_string(),
        source: e,
    })? {
        let entry = entry.map_err(|e| CoreError::IoWithPath {
            path: dir.display().to_string(),
            source: e,
        })?;
        let path = entry.path();
        let hidden = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with('.'));
        if hidden {
            continue;
        }
        if path.is_dir() {
            discover_definitions_recursive(root, &path, paths)?;
            continue;
        }
        if !path
            .extension()
            .is_some_and(|e| e == DEFINITION_EXTENSION)
        {
            continue;
        }
        if let Some(relative) = relative_path(root, &path) {
            paths.push(relative);
        }
    }
    Ok(())
}

/// Project-relative path with forward slashes
fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<&str> = relative
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<_>>()?;
    Some(parts.join("/"))
}
