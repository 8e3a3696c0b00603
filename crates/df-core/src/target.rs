//! Warehouse object identities and target canonicalization
//!
//! Every action has two targets:
//!
//! - the *canonical* target, computed from the declared name, overrides, and
//!   project defaults. It never carries the schema suffix and is the key for
//!   dependency edges and uniqueness checks.
//! - the *runtime* target, which is the canonical target with the project's
//!   schema suffix applied to `schema`. This is what statements address.

use crate::action::ActionKind;
use crate::settings::ProjectConfig;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A `{database, schema, name}` triple identifying a warehouse object
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    pub schema: String,
    pub name: String,
}

impl Target {
    /// Create a new target
    pub fn new(database: Option<String>, schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            database,
            schema: schema.into(),
            name: name.into(),
        }
    }

    /// Return a copy with `_<suffix>` appended to the schema.
    ///
    /// `database` and `name` are never touched.
    pub fn with_schema_suffix(&self, suffix: Option<&str>) -> Self {
        match suffix {
            Some(s) if !s.is_empty() => Self {
                database: self.database.clone(),
                schema: format!("{}_{}", self.schema, s),
                name: self.name.clone(),
            },
            _ => self.clone(),
        }
    }

    /// Whether `parts` (a dotted reference split into components) names this
    /// target. Shorter references match the trailing components.
    pub fn matches_parts(&self, parts: &[&str]) -> bool {
        match parts {
            [name] => self.name == *name,
            [schema, name] => self.schema == *schema && self.name == *name,
            [database, schema, name] => {
                self.database.as_deref() == Some(*database)
                    && self.schema == *schema
                    && self.name == *name
            }
            _ => false,
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.database {
            Some(db) => write!(f, "{}.{}.{}", db, self.schema, self.name),
            None => write!(f, "{}.{}", self.schema, self.name),
        }
    }
}

/// Declared identity of an action before canonicalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionIdentity {
    /// Declared name (defaults to the definition file stem)
    pub name: String,
    /// Schema override from the config block
    pub schema: Option<String>,
    /// Database override from the config block
    pub database: Option<String>,
}

impl ActionIdentity {
    /// Identity with no overrides
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: None,
            database: None,
        }
    }
}

impl ProjectConfig {
    /// Compute the canonical target for an action.
    ///
    /// Assertions default to the assertion schema, everything else to the
    /// default schema. The schema suffix is not applied here.
    pub fn canonical_target(&self, kind: ActionKind, identity: &ActionIdentity) -> Target {
        let schema = match (&identity.schema, kind) {
            (Some(schema), _) => schema.clone(),
            (None, ActionKind::Assertion) => self.assertion_schema().to_string(),
            (None, _) => self.default_schema().to_string(),
        };
        let database = identity
            .database
            .clone()
            .or_else(|| self.default_database.clone());
        Target::new(database, schema, identity.name.clone())
    }

    /// Compute the runtime target from a canonical target.
    ///
    /// Declarations name relations that dagform does not own, so they are
    /// never suffixed.
    pub fn runtime_target(&self, kind: ActionKind, canonical: &Target) -> Target {
        if kind == ActionKind::Declaration {
            return canonical.clone();
        }
        canonical.with_schema_suffix(self.schema_suffix.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_suffix(suffix: Option<&str>) -> ProjectConfig {
        ProjectConfig {
            default_database: Some("D".to_string()),
            schema_suffix: suffix.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn test_canonical_target_defaults() {
        let config = config_with_suffix(None);
        let t = config.canonical_target(ActionKind::Table, &ActionIdentity::named("example"));
        assert_eq!(t, Target::new(Some("D".into()), "dataform", "example"));
        assert_eq!(t.to_string(), "D.dataform.example");
    }

    #[test]
    fn test_canonical_target_assertion_schema() {
        let config = config_with_suffix(None);
        let t = config.canonical_target(ActionKind::Assertion, &ActionIdentity::named("check"));
        assert_eq!(t.schema, "dataform_assertions");
    }

    #[test]
    fn test_canonical_target_overrides() {
        let config = config_with_suffix(None);
        let identity = ActionIdentity {
            name: "t".into(),
            schema: Some("staging".into()),
            database: Some("other".into()),
        };
        let t = config.canonical_target(ActionKind::Table, &identity);
        assert_eq!(t, Target::new(Some("other".into()), "staging", "t"));
    }

    #[test]
    fn test_suffix_only_touches_runtime_schema() {
        let config = config_with_suffix(Some("dev"));
        let canonical = config.canonical_target(ActionKind::Table, &ActionIdentity::named("x"));
        let runtime = config.runtime_target(ActionKind::Table, &canonical);

        assert_eq!(canonical.schema, "dataform");
        assert_eq!(runtime.schema, "dataform_dev");
        assert_eq!(runtime.database, canonical.database);
        assert_eq!(runtime.name, canonical.name);
    }

    #[test]
    fn test_declarations_are_never_suffixed() {
        let config = config_with_suffix(Some("dev"));
        let canonical = Target::new(None, "raw", "events");
        let runtime = config.runtime_target(ActionKind::Declaration, &canonical);
        assert_eq!(runtime, canonical);
    }

    #[test]
    fn test_matches_parts() {
        let t = Target::new(Some("D".into()), "s", "n");
        assert!(t.matches_parts(&["n"]));
        assert!(t.matches_parts(&["s", "n"]));
        assert!(t.matches_parts(&["D", "s", "n"]));
        assert!(!t.matches_parts(&["x", "n"]));
        assert!(!t.matches_parts(&["a", "b", "c", "d"]));
    }
}
