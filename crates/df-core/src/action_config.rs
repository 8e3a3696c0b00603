//! Typed config blocks
//!
//! A definition's `config { ... }` block is a YAML flow mapping whose `type`
//! key selects one of the [`ActionConfig`] variants. Keys a variant does not
//! know are reported as warnings and dropped; everything else must have the
//! right shape.

use crate::action::{ActionKind, TableType};
use crate::error::{CoreError, CoreResult};
use serde::Deserialize;
use serde_yaml::{Mapping, Value};

/// Keys accepted by every non-declaration action
const COMMON_KEYS: &[&str] = &[
    "name",
    "schema",
    "database",
    "tags",
    "dependencies",
    "disabled",
    "description",
    "hermetic",
];

const DECLARATION_KEYS: &[&str] = &["name", "schema", "database", "description"];

/// Fields shared by tables, assertions, and operations
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CommonConfig {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub schema: Option<String>,
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Explicit dependencies: `name`, `schema.name`, or `database.schema.name`
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub description: Option<String>,
    /// Overrides inferred hermeticity
    #[serde(default)]
    pub hermetic: Option<bool>,
}

/// Built-in assertions declared on a table
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AssertionSpecs {
    #[serde(default)]
    pub unique_key: Option<Vec<String>>,
    #[serde(default)]
    pub unique_keys: Vec<Vec<String>>,
    #[serde(default)]
    pub non_null: Vec<String>,
    #[serde(default)]
    pub row_conditions: Vec<String>,
}

impl AssertionSpecs {
    /// Whether no assertion is declared
    pub fn is_empty(&self) -> bool {
        self.unique_key.is_none()
            && self.unique_keys.is_empty()
            && self.non_null.is_empty()
            && self.row_conditions.is_empty()
    }

    /// All uniqueness key sets, `uniqueKey` first
    pub fn key_sets(&self) -> Vec<&[String]> {
        self.unique_key
            .iter()
            .map(Vec::as_slice)
            .chain(self.unique_keys.iter().map(Vec::as_slice))
            .collect()
    }
}

/// An external relation declaration
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DeclarationConfig {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub schema: Option<String>,
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// A parsed config block, one variant per action type
#[derive(Debug, Clone, PartialEq)]
pub enum ActionConfig {
    /// `table`, `view`, or `incremental`
    Table {
        table_type: TableType,
        common: CommonConfig,
        assertions: AssertionSpecs,
        /// Merge key; incremental only
        unique_key: Vec<String>,
    },
    Assertion {
        common: CommonConfig,
    },
    Operations {
        common: CommonConfig,
        has_output: bool,
    },
    Declaration(DeclarationConfig),
}

impl Default for ActionConfig {
    fn default() -> Self {
        ActionConfig::Operations {
            common: CommonConfig::default(),
            has_output: false,
        }
    }
}

/// A config block plus the warnings produced while parsing it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedConfig {
    pub config: ActionConfig,
    pub warnings: Vec<String>,
}

impl ActionConfig {
    /// Parse the inner text of a `config { ... }` block.
    ///
    /// `path` is only used for error messages.
    pub fn parse(path: &str, body: &str) -> CoreResult<ParsedConfig> {
        let source = format!("{{{}}}", body);
        let value: Value = serde_yaml::from_str(&source).map_err(|e| {
            CoreError::InvalidConfigBlock {
                path: path.to_string(),
                message: e.to_string(),
            }
        })?;
        let mapping = match value {
            Value::Mapping(m) => m,
            Value::Null => Mapping::new(),
            _ => {
                return Err(CoreError::InvalidConfigBlock {
                    path: path.to_string(),
                    message: "config block must be a mapping".to_string(),
                })
            }
        };
        Self::from_mapping(path, mapping)
    }

    /// Build a config from an already-parsed mapping
    pub fn from_mapping(path: &str, mut mapping: Mapping) -> CoreResult<ParsedConfig> {
        let type_name = match mapping.remove("type") {
            None => "operations".to_string(),
            Some(Value::String(s)) => s,
            Some(other) => {
                return Err(CoreError::InvalidConfigBlock {
                    path: path.to_string(),
                    message: format!("'type' must be a string, found {:?}", other),
                })
            }
        };

        let extra: &[&str] = match type_name.as_str() {
            "table" | "view" => &["assertions"],
            "incremental" => &["assertions", "uniqueKey"],
            "assertion" => &[],
            "operations" => &["hasOutput"],
            "declaration" => &[],
            _ => {
                return Err(CoreError::UnknownActionType {
                    path: path.to_string(),
                    found: type_name,
                })
            }
        };
        let known: &[&str] = if type_name == "declaration" {
            DECLARATION_KEYS
        } else {
            COMMON_KEYS
        };

        let mut warnings = Vec::new();
        let unknown: Vec<String> = mapping
            .keys()
            .filter_map(|k| match k.as_str() {
                Some(key) if known.contains(&key) || extra.contains(&key) => None,
                Some(key) => Some(key.to_string()),
                None => Some(format!("{:?}", k)),
            })
            .collect();
        for key in unknown {
            log::warn!(
                "Unknown config key '{}' for type '{}' in {}",
                key,
                type_name,
                path
            );
            warnings.push(format!(
                "Unknown config key '{}' for action type '{}' was ignored",
                key, type_name
            ));
            mapping.remove(key.as_str());
        }

        let shape_error = |e: serde_yaml::Error| CoreError::InvalidConfigBlock {
            path: path.to_string(),
            message: e.to_string(),
        };

        let assertions = match mapping.remove("assertions") {
            Some(value) => serde_yaml::from_value::<AssertionSpecs>(value).map_err(shape_error)?,
            None => AssertionSpecs::default(),
        };
        let unique_key = match mapping.remove("uniqueKey") {
            Some(value) => serde_yaml::from_value::<Vec<String>>(value).map_err(shape_error)?,
            None => Vec::new(),
        };
        let has_output = match mapping.remove("hasOutput") {
            Some(value) => serde_yaml::from_value::<bool>(value).map_err(shape_error)?,
            None => false,
        };

        let rest = Value::Mapping(mapping);
        let config = match type_name.as_str() {
            "declaration" => ActionConfig::Declaration(
                serde_yaml::from_value::<DeclarationConfig>(rest).map_err(shape_error)?,
            ),
            other => {
                let common = serde_yaml::from_value::<CommonConfig>(rest).map_err(shape_error)?;
                match other {
                    "assertion" => ActionConfig::Assertion { common },
                    "operations" => ActionConfig::Operations { common, has_output },
                    _ => {
                        let table_type = match other {
                            "view" => TableType::View,
                            "incremental" => TableType::Incremental,
                            _ => TableType::Table,
                        };
                        ActionConfig::Table {
                            table_type,
                            common,
                            assertions,
                            unique_key,
                        }
                    }
                }
            }
        };

        if let Some(name) = config.declared_name() {
            if name.trim().is_empty() {
                return Err(CoreError::InvalidConfigBlock {
                    path: path.to_string(),
                    message: "'name' cannot be empty".to_string(),
                });
            }
        }

        Ok(ParsedConfig { config, warnings })
    }

    /// Explicit `name`, if any
    pub fn declared_name(&self) -> Option<&str> {
        match self {
            ActionConfig::Declaration(d) => d.name.as_deref(),
            _ => self.common().and_then(|c| c.name.as_deref()),
        }
    }

    /// Explicit `schema`, if any
    pub fn declared_schema(&self) -> Option<&str> {
        match self {
            ActionConfig::Declaration(d) => d.schema.as_deref(),
            _ => self.common().and_then(|c| c.schema.as_deref()),
        }
    }

    /// Explicit `database`, if any
    pub fn declared_database(&self) -> Option<&str> {
        match self {
            ActionConfig::Declaration(d) => d.database.as_deref(),
            _ => self.common().and_then(|c| c.database.as_deref()),
        }
    }

    /// Common fields; `None` for declarations
    pub fn common(&self) -> Option<&CommonConfig> {
        match self {
            ActionConfig::Table { common, .. }
            | ActionConfig::Assertion { common }
            | ActionConfig::Operations { common, .. } => Some(common),
            ActionConfig::Declaration(_) => None,
        }
    }

    /// Action kind this config produces
    pub fn action_kind(&self) -> ActionKind {
        match self {
            ActionConfig::Table { .. } => ActionKind::Table,
            ActionConfig::Assertion { .. } => ActionKind::Assertion,
            ActionConfig::Operations { .. } => ActionKind::Operation,
            ActionConfig::Declaration(_) => ActionKind::Declaration,
        }
    }
}

#[cfg(test)]
#[path = "action_config_test.rs"]
mod tests;
