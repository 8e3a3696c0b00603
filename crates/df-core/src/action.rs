//! Compiled actions as they appear in the compiled graph

use crate::target::Target;
use serde::{Deserialize, Serialize};

/// Broad action category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Table,
    Assertion,
    Operation,
    Declaration,
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionKind::Table => write!(f, "table"),
            ActionKind::Assertion => write!(f, "assertion"),
            ActionKind::Operation => write!(f, "operation"),
            ActionKind::Declaration => write!(f, "declaration"),
        }
    }
}

/// Table materialization, as written in the config block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableType {
    Table,
    View,
    Incremental,
}

impl TableType {
    /// Upper-case enum form
    pub fn enum_type(&self) -> TableEnumType {
        match self {
            TableType::Table => TableEnumType::Table,
            TableType::View => TableEnumType::View,
            TableType::Incremental => TableEnumType::Incremental,
        }
    }
}

impl std::fmt::Display for TableType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableType::Table => write!(f, "table"),
            TableType::View => write!(f, "view"),
            TableType::Incremental => write!(f, "incremental"),
        }
    }
}

/// Table materialization in upper-case enum form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TableEnumType {
    Table,
    View,
    Incremental,
}

/// Whether an action reads only declared inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Hermeticity {
    #[default]
    Hermetic,
    NonHermetic,
}

/// Fields shared by tables, assertions, and operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionMeta {
    /// Definition file, relative to the project root
    pub file_name: String,

    /// Runtime target (schema suffix applied)
    pub target: Target,

    /// Suffix-independent identity
    pub canonical_target: Target,

    /// Canonical targets this action depends on, sorted
    #[serde(default)]
    pub dependency_targets: Vec<Target>,

    #[serde(default)]
    pub disabled: bool,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub hermeticity: Hermeticity,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A table, view, or incremental table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    #[serde(rename = "type")]
    pub table_type: TableType,
    pub enum_type: TableEnumType,
    #[serde(flatten)]
    pub meta: ActionMeta,
    pub query: String,
    /// Query rendered with `incremental()` true; incremental tables only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incremental_query: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unique_key: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pre_ops: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub post_ops: Vec<String>,
}

/// A data-quality check that succeeds when its query returns no rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assertion {
    #[serde(flatten)]
    pub meta: ActionMeta,
    pub query: String,
    /// Canonical target of the table this assertion was synthesized from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_action: Option<Target>,
}

/// Arbitrary statements run verbatim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    #[serde(flatten)]
    pub meta: ActionMeta,
    pub queries: Vec<String>,
    #[serde(default)]
    pub has_output: bool,
}

/// An external relation that other actions may reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Declaration {
    pub file_name: String,
    pub target: Target,
    pub canonical_target: Target,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// An owned compiled action of any kind
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Table(Table),
    Assertion(Assertion),
    Operation(Operation),
    Declaration(Declaration),
}

impl Action {
    /// Borrowed view of this action
    pub fn as_graph_action(&self) -> GraphAction<'_> {
        match self {
            Action::Table(t) => GraphAction::Table(t),
            Action::Assertion(a) => GraphAction::Assertion(a),
            Action::Operation(o) => GraphAction::Operation(o),
            Action::Declaration(d) => GraphAction::Declaration(d),
        }
    }

    /// Canonical target of the action
    pub fn canonical_target(&self) -> &Target {
        self.as_graph_action().canonical_target()
    }

    /// Definition file of the action
    pub fn file_name(&self) -> &str {
        self.as_graph_action().file_name()
    }
}

/// A borrowed action inside a [`CompiledGraph`](crate::graph::CompiledGraph)
#[derive(Debug, Clone, Copy)]
pub enum GraphAction<'a> {
    Table(&'a Table),
    Assertion(&'a Assertion),
    Operation(&'a Operation),
    Declaration(&'a Declaration),
}

impl<'a> GraphAction<'a> {
    pub fn kind(&self) -> ActionKind {
        match self {
            GraphAction::Table(_) => ActionKind::Table,
            GraphAction::Assertion(_) => ActionKind::Assertion,
            GraphAction::Operation(_) => ActionKind::Operation,
            GraphAction::Declaration(_) => ActionKind::Declaration,
        }
    }

    /// Shared fields; `None` for declarations
    pub fn meta(&self) -> Option<&'a ActionMeta> {
        match self {
            GraphAction::Table(t) => Some(&t.meta),
            GraphAction::Assertion(a) => Some(&a.meta),
            GraphAction::Operation(o) => Some(&o.meta),
            GraphAction::Declaration(_) => None,
        }
    }

    pub fn canonical_target(&self) -> &'a Target {
        match self {
            GraphAction::Declaration(d) => &d.canonical_target,
            GraphAction::Table(t) => &t.meta.canonical_target,
            GraphAction::Assertion(a) => &a.meta.canonical_target,
            GraphAction::Operation(o) => &o.meta.canonical_target,
        }
    }

    pub fn target(&self) -> &'a Target {
        match self {
            GraphAction::Declaration(d) => &d.target,
            GraphAction::Table(t) => &t.meta.target,
            GraphAction::Assertion(a) => &a.meta.target,
            GraphAction::Operation(o) => &o.meta.target,
        }
    }

    pub fn file_name(&self) -> &'a str {
        match self {
            GraphAction::Declaration(d) => &d.file_name,
            GraphAction::Table(t) => &t.meta.file_name,
            GraphAction::Assertion(a) => &a.meta.file_name,
            GraphAction::Operation(o) => &o.meta.file_name,
        }
    }

    pub fn dependency_targets(&self) -> &'a [Target] {
        self.meta()
            .map(|m| m.dependency_targets.as_slice())
            .unwrap_or(&[])
    }

    pub fn disabled(&self) -> bool {
        self.meta().is_some_and(|m| m.disabled)
    }

    pub fn tags(&self) -> &'a [String] {
        self.meta().map(|m| m.tags.as_slice()).unwrap_or(&[])
    }

    pub fn hermeticity(&self) -> Hermeticity {
        self.meta().map(|m| m.hermeticity).unwrap_or_default()
    }
}
