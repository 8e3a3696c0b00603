//! Cross-reference resolution
//!
//! The compiler first records every declared action in a [`NameTable`], then
//! renders templates against it, so file order never matters.

use crate::action::ActionKind;
use crate::settings::ProjectConfig;
use crate::target::Target;
use std::collections::BTreeMap;

/// A reference to another action: `name`, `schema.name`, or
/// `database.schema.name`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRef {
    pub database: Option<String>,
    pub schema: Option<String>,
    pub name: String,
}

impl ActionRef {
    /// Build from one to three components
    pub fn from_parts<S: AsRef<str>>(parts: &[S]) -> Option<Self> {
        let parts: Vec<&str> = parts.iter().map(AsRef::as_ref).collect();
        if parts.iter().any(|p| p.is_empty()) {
            return None;
        }
        match parts.as_slice() {
            [name] => Some(Self {
                database: None,
                schema: None,
                name: name.to_string(),
            }),
            [schema, name] => Some(Self {
                database: None,
                schema: Some(schema.to_string()),
                name: name.to_string(),
            }),
            [database, schema, name] => Some(Self {
                database: Some(database.to_string()),
                schema: Some(schema.to_string()),
                name: name.to_string(),
            }),
            _ => None,
        }
    }

    /// Parse a dotted reference
    pub fn parse(dotted: &str) -> Option<Self> {
        let parts: Vec<&str> = dotted.split('.').map(str::trim).collect();
        Self::from_parts(&parts)
    }

    fn parts(&self) -> Vec<&str> {
        self.database
            .iter()
            .chain(self.schema.iter())
            .map(String::as_str)
            .chain(std::iter::once(self.name.as_str()))
            .collect()
    }
}

impl std::fmt::Display for ActionRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.parts().join("."))
    }
}

/// Outcome of resolving an [`ActionRef`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Exactly one action matches
    Found { canonical: Target, runtime: Target },
    /// Nothing matches; the placeholder is reported later as unresolved
    Missing { canonical: Target, runtime: Target },
    /// Several actions match a short reference
    Ambiguous(Vec<Target>),
}

/// Declared name -> canonical target table
#[derive(Debug, Clone, Default)]
pub struct NameTable {
    config: ProjectConfig,
    by_name: BTreeMap<String, Vec<(Target, ActionKind)>>,
}

impl NameTable {
    pub fn new(config: &ProjectConfig) -> Self {
        Self {
            config: config.clone(),
            by_name: BTreeMap::new(),
        }
    }

    /// Record a declared action
    pub fn insert(&mut self, kind: ActionKind, canonical: Target) {
        let entries = self.by_name.entry(canonical.name.clone()).or_default();
        if !entries.iter().any(|(t, _)| *t == canonical) {
            entries.push((canonical, kind));
            entries.sort();
        }
    }

    /// Number of recorded targets
    pub fn len(&self) -> usize {
        self.by_name.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Resolve a reference against the recorded actions
    pub fn resolve(&self, reference: &ActionRef) -> Resolution {
        let parts = reference.parts();
        let matches: Vec<&(Target, ActionKind)> = self
            .by_name
            .get(&reference.name)
            .map(|entries| entries.iter().filter(|(t, _)| t.matches_parts(&parts)).collect())
            .unwrap_or_default();

        match matches.as_slice() {
            [(canonical, kind)] => Resolution::Found {
                canonical: canonical.clone(),
                runtime: self.config.runtime_target(*kind, canonical),
            },
            [] => {
                let canonical = Target::new(
                    reference
                        .database
                        .clone()
                        .or_else(|| self.config.default_database.clone()),
                    reference
                        .schema
                        .clone()
                        .unwrap_or_else(|| self.config.default_schema().to_string()),
                    reference.name.clone(),
                );
                let runtime = self.config.runtime_target(ActionKind::Table, &canonical);
                Resolution::Missing { canonical, runtime }
            }
            many => Resolution::Ambiguous(many.iter().map(|(t, _)| t.clone()).collect()),
        }
    }

    /// The project config the table was built for
    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> NameTable {
        let config = ProjectConfig {
            default_database: Some("D".into()),
            schema_suffix: Some("dev".into()),
            ..Default::default()
        };
        let mut names = NameTable::new(&config);
        names.insert(ActionKind::Table, Target::new(Some("D".into()), "dataform", "orders"));
        names.insert(ActionKind::Table, Target::new(Some("D".into()), "staging", "orders"));
        names.insert(ActionKind::Table, Target::new(Some("D".into()), "dataform", "users"));
        names.insert(ActionKind::Declaration, Target::new(None, "raw", "events"));
        names
    }

    #[test]
    fn test_parse_action_ref() {
        let r = ActionRef::parse("db.s.n").unwrap();
        assert_eq!(r.database.as_deref(), Some("db"));
        assert_eq!(r.schema.as_deref(), Some("s"));
        assert_eq!(r.to_string(), "db.s.n");
        assert!(ActionRef::parse("a.b.c.d").is_none());
        assert!(ActionRef::parse("a..b").is_none());
    }

    #[test]
    fn test_resolve_unique_name_applies_suffix_to_runtime() {
        match table().resolve(&ActionRef::parse("users").unwrap()) {
            Resolution::Found { canonical, runtime } => {
                assert_eq!(canonical.schema, "dataform");
                assert_eq!(runtime.schema, "dataform_dev");
            }
            other => panic!("unexpected resolution: {other:?}"),
        }
    }

    #[test]
    fn test_resolve_declaration_is_not_suffixed() {
        match table().resolve(&ActionRef::parse("raw.events").unwrap()) {
            Resolution::Found { runtime, .. } => assert_eq!(runtime.schema, "raw"),
            other => panic!("unexpected resolution: {other:?}"),
        }
    }

    #[test]
    fn test_resolve_ambiguous_and_qualified() {
        let names = table();
        assert!(matches!(
            names.resolve(&ActionRef::parse("orders").unwrap()),
            Resolution::Ambiguous(ref t) if t.len() == 2
        ));
        assert!(matches!(
            names.resolve(&ActionRef::parse("staging.orders").unwrap()),
            Resolution::Found { .. }
        ));
    }

    #[test]
    fn test_resolve_missing_builds_placeholder() {
        match table().resolve(&ActionRef::parse("nope").unwrap()) {
            Resolution::Missing { canonical, .. } => {
                assert_eq!(canonical, Target::new(Some("D".into()), "dataform", "nope"));
            }
            other => panic!("unexpected resolution: {other:?}"),
        }
        assert_eq!(table().len(), 4);
    }
}
