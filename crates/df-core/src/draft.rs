//! Per-file compile output, before graph assembly

use crate::action::{ActionKind, Hermeticity, TableType};
use crate::action_config::AssertionSpecs;
use crate::target::{ActionIdentity, Target};
use serde::Serialize;

/// An action as produced by the template phase.
///
/// Targets are not computed yet; `dependencies` holds canonical targets that
/// may or may not exist in the project.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionDraft {
    /// Definition file, relative to the project root
    pub file_name: String,
    pub identity: ActionIdentity,
    pub dependencies: Vec<Target>,
    pub tags: Vec<String>,
    pub disabled: bool,
    pub description: Option<String>,
    pub hermeticity: Hermeticity,
    pub kind: DraftKind,
}

/// Kind-specific draft content
#[derive(Debug, Clone, PartialEq)]
pub enum DraftKind {
    Table {
        table_type: TableType,
        query: String,
        incremental_query: Option<String>,
        unique_key: Vec<String>,
        pre_ops: Vec<String>,
        post_ops: Vec<String>,
        assertions: AssertionSpecs,
    },
    Assertion {
        query: String,
        /// Canonical target of the parent, for synthesized assertions
        parent: Option<Target>,
    },
    Operation {
        queries: Vec<String>,
        has_output: bool,
    },
    Declaration,
}

impl ActionDraft {
    pub fn action_kind(&self) -> ActionKind {
        match self.kind {
            DraftKind::Table { .. } => ActionKind::Table,
            DraftKind::Assertion { .. } => ActionKind::Assertion,
            DraftKind::Operation { .. } => ActionKind::Operation,
            DraftKind::Declaration => ActionKind::Declaration,
        }
    }
}

/// A per-file failure, recorded in `graphErrors`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct FileError {
    pub path: String,
    pub message: String,
}

impl FileError {
    pub fn new(path: impl Into<String>, message: impl ToString) -> Self {
        Self {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

/// A per-file warning, recorded in `graphWarnings`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct FileWarning {
    pub path: String,
    pub message: String,
}

impl FileWarning {
    pub fn new(path: impl Into<String>, message: impl ToString) -> Self {
        Self {
            path: path.into(),
            message: message.to_string(),
        }
    }
}
