//! Project settings: parsing, resolution, and command-line overrides
//!
//! A project is configured by `workflow_settings.yaml`, or by the legacy
//! `dagform.json` together with a `packages.json` manifest. Both forms
//! deserialize into the same [`ProjectConfig`].

use crate::error::{CoreError, CoreResult};
use crate::project::packages;
use crate::serde_helpers::deserialize_vars;
use crate::warehouse::Warehouse;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Primary settings file name
pub const WORKFLOW_SETTINGS_FILE: &str = "workflow_settings.yaml";

/// Legacy settings file name, used together with a package manifest
pub const LEGACY_SETTINGS_FILE: &str = "dagform.json";

const DEFAULT_SCHEMA: &str = "dataform";
const DEFAULT_ASSERTION_SCHEMA: &str = "dataform_assertions";

/// Project-wide settings.
///
/// Fields the settings file omits stay `None`, so serializing a config
/// reproduces the file. Effective defaults come from the accessor methods.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProjectConfig {
    /// Target warehouse (default: bigquery)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warehouse: Option<Warehouse>,

    /// Default database (BigQuery project, Snowflake database)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_database: Option<String>,

    /// Default schema for tables, views, and operations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_schema: Option<String>,

    /// Schema that assertions are created in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assertion_schema: Option<String>,

    /// Default warehouse location (e.g. `US`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_location: Option<String>,

    /// Suffix appended to every runtime schema
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_suffix: Option<String>,

    /// Template variables, exposed as `vars.<name>`
    #[serde(
        default,
        deserialize_with = "deserialize_vars",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub vars: BTreeMap<String, String>,

    /// Disable every assertion in the project
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disable_assertions: Option<bool>,

    /// Pinned core version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub core_version: Option<String>,

    /// Storage-backend configuration for non-core table formats
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<StorageConfig>,
}

/// Storage-backend configuration block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StorageConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_folder_root: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_folder_subpath: Option<String>,
}

/// Settings supplied on the command line. Each field overrides only itself.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsOverrides {
    pub vars: BTreeMap<String, String>,
    pub schema_suffix: Option<String>,
    pub default_location: Option<String>,
    pub default_database: Option<String>,
    pub default_schema: Option<String>,
    pub assertion_schema: Option<String>,
    pub disable_assertions: bool,
}

impl SettingsOverrides {
    /// Parse a `k=v,k2=v2` variable list.
    pub fn parse_vars(raw: &str) -> CoreResult<BTreeMap<String, String>> {
        let mut vars = BTreeMap::new();
        for pair in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let Some((key, value)) = pair.split_once('=') else {
                return Err(CoreError::InvalidOverride {
                    flag: "--vars".to_string(),
                    message: format!("expected key=value, found '{}'", pair),
                });
            };
            let key = key.trim();
            if key.is_empty() {
                return Err(CoreError::InvalidOverride {
                    flag: "--vars".to_string(),
                    message: format!("empty variable name in '{}'", pair),
                });
            }
            vars.insert(key.to_string(), value.trim().to_string());
        }
        Ok(vars)
    }
}

/// Which settings file a project uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsSource {
    /// `workflow_settings.yaml`
    Workflow,
    /// `dagform.json`
    Legacy,
}

impl SettingsSource {
    /// Settings file name for this source
    pub fn file_name(&self) -> &'static str {
        match self {
            SettingsSource::Workflow => WORKFLOW_SETTINGS_FILE,
            SettingsSource::Legacy => LEGACY_SETTINGS_FILE,
        }
    }

    /// Locate the settings file in a project directory
    pub fn locate(root: &Path) -> CoreResult<(Self, PathBuf)> {
        let workflow = root.join(WORKFLOW_SETTINGS_FILE);
        let legacy = root.join(LEGACY_SETTINGS_FILE);

        match (workflow.exists(), legacy.exists()) {
            (true, legacy_exists) => {
                if legacy_exists {
                    log::warn!(
                        "Both {} and {} exist; using {}",
                        WORKFLOW_SETTINGS_FILE,
                        LEGACY_SETTINGS_FILE,
                        WORKFLOW_SETTINGS_FILE
                    );
                }
                Ok((SettingsSource::Workflow, workflow))
            }
            (false, true) => Ok((SettingsSource::Legacy, legacy)),
            (false, false) => Err(CoreError::SettingsNotFound {
                path: workflow.display().to_string(),
            }),
        }
    }
}

impl ProjectConfig {
    /// Load settings from a file path; the format follows the extension.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;

        let is_json = path.extension().is_some_and(|e| e == "json");
        let config: ProjectConfig = if is_json {
            serde_json::from_str(&content).map_err(|e| CoreError::SettingsParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?
        } else if content.trim().is_empty() {
            ProjectConfig::default()
        } else {
            serde_yaml::from_str(&content).map_err(|e| CoreError::SettingsParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?
        };
        config.validate()?;
        Ok(config)
    }

    /// Resolve the authoritative configuration for a project directory.
    ///
    /// Reads the settings file, enforces the core-version rules, then layers
    /// the command-line overrides on top.
    pub fn resolve(root: &Path, overrides: &SettingsOverrides) -> CoreResult<Self> {
        let (source, path) = SettingsSource::locate(root)?;
        log::debug!("Loading settings from {}", path.display());

        let config = Self::load(&path)?;
        packages::check_core_dependency(root, source, &config)?;

        let config = config.with_overrides(overrides);
        config.validate()?;
        Ok(config)
    }

    /// Apply command-line overrides. `disableAssertions` is OR-ed.
    pub fn with_overrides(mut self, overrides: &SettingsOverrides) -> Self {
        for (k, v) in &overrides.vars {
            self.vars.insert(k.clone(), v.clone());
        }
        if let Some(suffix) = &overrides.schema_suffix {
            self.schema_suffix = Some(suffix.clone());
        }
        if let Some(location) = &overrides.default_location {
            self.default_location = Some(location.clone());
        }
        if let Some(database) = &overrides.default_database {
            self.default_database = Some(database.clone());
        }
        if let Some(schema) = &overrides.default_schema {
            self.default_schema = Some(schema.clone());
        }
        if let Some(schema) = &overrides.assertion_schema {
            self.assertion_schema = Some(schema.clone());
        }
        if overrides.disable_assertions {
            self.disable_assertions = Some(true);
        }
        self
    }

    /// Validate the configuration
    fn validate(&self) -> CoreResult<()> {
        let named = [
            ("defaultDatabase", &self.default_database),
            ("defaultSchema", &self.default_schema),
            ("assertionSchema", &self.assertion_schema),
        ];
        for (field, value) in named {
            if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
                return Err(CoreError::SettingsInvalid {
                    message: format!("{} cannot be empty", field),
                });
            }
        }

        if let Some(suffix) = &self.schema_suffix {
            if !suffix
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
            {
                return Err(CoreError::SettingsInvalid {
                    message: format!(
                        "schemaSuffix '{}' may only contain letters, digits, and underscores",
                        suffix
                    ),
                });
            }
        }

        Ok(())
    }

    /// Effective warehouse
    pub fn warehouse(&self) -> Warehouse {
        self.warehouse.unwrap_or_default()
    }

    /// Effective default schema
    pub fn default_schema(&self) -> &str {
        self.default_schema.as_deref().unwrap_or(DEFAULT_SCHEMA)
    }

    /// Effective assertion schema
    pub fn assertion_schema(&self) -> &str {
        self.assertion_schema
            .as_deref()
            .unwrap_or(DEFAULT_ASSERTION_SCHEMA)
    }

    /// Whether assertions are globally disabled
    pub fn assertions_disabled(&self) -> bool {
        self.disable_assertions.unwrap_or(false)
    }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
