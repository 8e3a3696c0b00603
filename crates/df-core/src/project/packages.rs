//! Core-version rules for project packages
//!
//! A project either pins `coreVersion` in its settings, or declares the core
//! package in `packages.json` and has it installed under `dagform_packages/`.
//! Mixing the two is an error.

use crate::error::{CoreError, CoreResult};
use crate::settings::{ProjectConfig, SettingsSource};
use semver::{Version, VersionReq};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Name of the compiler-core package
pub const CORE_PACKAGE: &str = "dagform-core";

/// Package manifest file name
pub const PACKAGE_MANIFEST_FILE: &str = "packages.json";

/// Package lockfile name
pub const PACKAGE_LOCK_FILE: &str = "packages.lock";

/// Directory holding installed packages
pub const INSTALLED_PACKAGES_DIR: &str = "dagform_packages";

/// A `packages.json` document, for both the project manifest and the
/// manifest of each installed package.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageManifest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,
}

impl PackageManifest {
    /// Load a manifest from disk
    pub fn load(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(|e| CoreError::SettingsParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }
}

/// Enforce the core-version rules for a project.
pub(crate) fn check_core_dependency(
    root: &Path,
    source: SettingsSource,
    config: &ProjectConfig,
) -> CoreResult<()> {
    if let Some(version) = &config.core_version {
        for path in package_artifacts(root) {
            if path.exists() {
                return Err(CoreError::PinnedVersionConflict {
                    path: path.display().to_string(),
                    version: version.clone(),
                });
            }
        }
        log::debug!(
            "Core version {} pinned in {}",
            version,
            source.file_name()
        );
        return Ok(());
    }

    let installed = installed_core_version(root)?;
    log::debug!("Using installed {} {}", CORE_PACKAGE, installed);
    Ok(())
}

/// Files and directories that signal package-manifest based installation
fn package_artifacts(root: &Path) -> [PathBuf; 3] {
    [
        root.join(PACKAGE_MANIFEST_FILE),
        root.join(PACKAGE_LOCK_FILE),
        root.join(INSTALLED_PACKAGES_DIR),
    ]
}

/// Find the installed core version of a manifest-based project, checking it
/// against the requirement declared in `packages.json`.
pub fn installed_core_version(root: &Path) -> CoreResult<String> {
    let manifest_path = root.join(PACKAGE_MANIFEST_FILE);
    let missing = || CoreError::MissingCoreDependency {
        package: CORE_PACKAGE.to_string(),
        manifest: PACKAGE_MANIFEST_FILE.to_string(),
    };

    if !manifest_path.exists() {
        return Err(missing());
    }
    let manifest = PackageManifest::load(&manifest_path)?;
    let requirement = manifest
        .dependencies
        .get(CORE_PACKAGE)
        .cloned()
        .ok_or_else(missing)?;

    let installed_path = root
        .join(INSTALLED_PACKAGES_DIR)
        .join(CORE_PACKAGE)
        .join(PACKAGE_MANIFEST_FILE);
    if !installed_path.exists() {
        return Err(CoreError::CoreNotInstalled {
            package: CORE_PACKAGE.to_string(),
            requirement,
            path: installed_path.display().to_string(),
        });
    }

    let installed = PackageManifest::load(&installed_path)?
        .version
        .ok_or_else(|| CoreError::SettingsParseError {
            path: installed_path.display().to_string(),
            message: "missing 'version' field".to_string(),
        })?;

    if !version_satisfies(&requirement, &installed) {
        return Err(CoreError::CoreVersionMismatch {
            package: CORE_PACKAGE.to_string(),
            requirement,
            installed,
        });
    }

    Ok(installed)
}

/// Check an installed version against a `packages.json` requirement.
///
/// A bare version such as `1.2.3` is an exact match, as in package
/// manifests; operators (`^`, `~`, `>=`, `*`, ...) follow semver rules.
pub fn version_satisfies(requirement: &str, installed: &str) -> bool {
    let requirement = requirement.trim();
    let requirement = if requirement.starts_with(|c: char| c.is_ascii_digit()) {
        format!("={}", requirement)
    } else if requirement.is_empty() {
        "*".to_string()
    } else {
        requirement.to_string()
    };
    let Ok(req) = VersionReq::parse(&requirement) else {
        log::debug!("Unparseable version requirement '{}'", requirement);
        return false;
    };
    Version::parse(installed.trim().trim_start_matches('v')).is_ok_and(|v| req.matches(&v))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_satisfies_exact() {
        assert!(version_satisfies("3.0.1", "3.0.1"));
        assert!(version_satisfies("=3.0.1", "3.0.1"));
        assert!(!version_satisfies("3.0.1", "3.0.2"));
    }

    #[test]
    fn test_version_satisfies_caret() {
        assert!(version_satisfies("^3.0.0", "3.4.1"));
        assert!(!version_satisfies("^3.1.0", "3.0.9"));
        assert!(!version_satisfies("^3.0.0", "4.0.0"));
    }

    #[test]
    fn test_version_satisfies_tilde() {
        assert!(version_satisfies("~3.1.0", "3.1.7"));
        assert!(!version_satisfies("~3.1.0", "3.2.0"));
    }

    #[test]
    fn test_version_satisfies_wildcard_and_prerelease() {
        assert!(version_satisfies("*", "0.0.1"));
        assert!(version_satisfies("", "3.0.0"));
        assert!(!version_satisfies("^3.0.0", "3.1.0-beta.1"));
        assert!(version_satisfies("^3.1.0-beta.1", "3.1.0-beta.2"));
        assert!(version_satisfies(">=3.0.0, <4.0.0", "v3.9.0"));
        assert!(!version_satisfies("^3.0.0", "not-a-version"));
        assert!(!version_satisfies("not-a-requirement", "3.0.0"));
    }
}
