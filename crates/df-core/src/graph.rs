//! Compiled graph assembly and validation
//!
//! [`GraphBuilder`] turns the drafts of every file into a [`CompiledGraph`].
//! It never fails: duplicate targets, unresolved dependencies, and cycles
//! are recorded in `graphErrors` under every implicated file.

use crate::action::{
    Action, ActionKind, ActionMeta, Assertion, Declaration, GraphAction, Operation, Table,
};
use crate::dag::{format_cycle, ActionDag};
use crate::draft::{ActionDraft, DraftKind, FileError, FileWarning};
use crate::error::CoreError;
use crate::settings::ProjectConfig;
use crate::target::Target;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// The compile-command output
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledGraph {
    pub project_config: ProjectConfig,
    pub tables: Vec<Table>,
    pub assertions: Vec<Assertion>,
    pub operations: Vec<Operation>,
    pub declarations: Vec<Declaration>,
    /// File path -> error messages
    pub graph_errors: BTreeMap<String, Vec<String>>,
    /// File path -> warning messages
    pub graph_warnings: BTreeMap<String, Vec<String>>,
}

impl CompiledGraph {
    pub fn has_errors(&self) -> bool {
        self.graph_errors.values().any(|v| !v.is_empty())
    }

    /// First error in path order, for terse reporting
    pub fn first_error(&self) -> Option<(&str, &str)> {
        self.graph_errors
            .iter()
            .find_map(|(path, msgs)| msgs.first().map(|m| (path.as_str(), m.as_str())))
    }

    /// Total number of recorded errors
    pub fn error_count(&self) -> usize {
        self.graph_errors.values().map(Vec::len).sum()
    }

    /// Every action, tables first
    pub fn actions(&self) -> impl Iterator<Item = GraphAction<'_>> {
        self.tables
            .iter()
            .map(GraphAction::Table)
            .chain(self.assertions.iter().map(GraphAction::Assertion))
            .chain(self.operations.iter().map(GraphAction::Operation))
            .chain(self.declarations.iter().map(GraphAction::Declaration))
    }

    /// Look up an action by canonical target
    pub fn find(&self, target: &Target) -> Option<GraphAction<'_>> {
        self.actions().find(|a| a.canonical_target() == target)
    }

    /// Dependency DAG over every action
    pub fn dag(&self) -> ActionDag {
        let deps: BTreeMap<Target, Vec<Target>> = self
            .actions()
            .map(|a| (a.canonical_target().clone(), a.dependency_targets().to_vec()))
            .collect();
        ActionDag::build(&deps)
    }
}

/// Assembles drafts into a [`CompiledGraph`]
#[derive(Debug)]
pub struct GraphBuilder<'a> {
    config: &'a ProjectConfig,
    errors: BTreeMap<String, BTreeSet<String>>,
    warnings: BTreeMap<String, Vec<String>>,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(config: &'a ProjectConfig) -> Self {
        Self {
            config,
            errors: BTreeMap::new(),
            warnings: BTreeMap::new(),
        }
    }

    fn record_error(&mut self, path: &str, message: String) {
        self.errors
            .entry(path.to_string())
            .or_default()
            .insert(message);
    }

    /// Build the compiled graph.
    ///
    /// `drafts` include synthesized assertions. `file_errors` and
    /// `file_warnings` come from the per-file phases.
    pub fn build(
        mut self,
        drafts: Vec<ActionDraft>,
        file_errors: Vec<FileError>,
        file_warnings: Vec<FileWarning>,
    ) -> CompiledGraph {
        for e in file_errors {
            self.record_error(&e.path, e.message);
        }
        for w in file_warnings {
            self.warnings.entry(w.path).or_default().push(w.message);
        }

        let mut actions: Vec<Action> = drafts.into_iter().map(|d| self.materialize(d)).collect();
        actions.sort_by(|a, b| {
            a.canonical_target()
                .cmp(b.canonical_target())
                .then_with(|| a.file_name().cmp(b.file_name()))
        });

        self.check_duplicates(&actions);
        self.check_unresolved(&actions);
        self.check_cycles(&actions);
        self.propagate_disabled(&mut actions);

        let mut graph = CompiledGraph {
            project_config: self.config.clone(),
            ..Default::default()
        };
        for action in actions {
            match action {
                Action::Table(t) => graph.tables.push(t),
                Action::Assertion(a) => graph.assertions.push(a),
                Action::Operation(o) => graph.operations.push(o),
                Action::Declaration(d) => graph.declarations.push(d),
            }
        }
        graph.graph_errors = self
            .errors
            .into_iter()
            .map(|(path, msgs)| (path, msgs.into_iter().collect()))
            .collect();
        graph.graph_warnings = self.warnings;

        log::debug!(
            "Built graph: {} tables, {} assertions, {} operations, {} declarations, {} errors",
            graph.tables.len(),
            graph.assertions.len(),
            graph.operations.len(),
            graph.declarations.len(),
            graph.error_count()
        );
        graph
    }

    /// Compute targets and convert a draft into an action
    fn materialize(&self, draft: ActionDraft) -> Action {
        let kind = draft.action_kind();
        let canonical_target = self.config.canonical_target(kind, &draft.identity);
        let target = self.config.runtime_target(kind, &canonical_target);

        if kind == ActionKind::Declaration {
            return Action::Declaration(Declaration {
                file_name: draft.file_name,
                target,
                canonical_target,
                description: draft.description,
            });
        }

        let mut dependency_targets = draft.dependencies;
        dependency_targets.sort();
        dependency_targets.dedup();

        let disabled = draft.disabled
            || (kind == ActionKind::Assertion && self.config.assertions_disabled());

        let meta = ActionMeta {
            file_name: draft.file_name,
            target,
            canonical_target,
            dependency_targets,
            disabled,
            tags: draft.tags,
            hermeticity: draft.hermeticity,
            description: draft.description,
        };

        match draft.kind {
            DraftKind::Table {
                table_type,
                query,
                incremental_query,
                unique_key,
                pre_ops,
                post_ops,
                ..
            } => Action::Table(Table {
                table_type,
                enum_type: table_type.enum_type(),
                meta,
                query,
                incremental_query,
                unique_key,
                pre_ops,
                post_ops,
            }),
            DraftKind::Assertion { query, parent } => Action::Assertion(Assertion {
                meta,
                query,
                parent_action: parent,
            }),
            DraftKind::Operation {
                queries,
                has_output,
            } => Action::Operation(Operation {
                meta,
                queries,
                has_output,
            }),
            DraftKind::Declaration => Action::Declaration(Declaration {
                file_name: meta.file_name,
                target: meta.target,
                canonical_target: meta.canonical_target,
                description: meta.description,
            }),
        }
    }

    fn check_duplicates(&mut self, actions: &[Action]) {
        let mut by_target: BTreeMap<&Target, Vec<&str>> = BTreeMap::new();
        for action in actions {
            by_target
                .entry(action.canonical_target())
                .or_default()
                .push(action.file_name());
        }
        for (target, files) in by_target {
            if files.len() < 2 {
                continue;
            }
            let message = CoreError::DuplicateTarget {
                target: target.to_string(),
                files: files.join(", "),
            }
            .to_string();
            for file in files {
                self.record_error(file, message.clone());
            }
        }
    }

    fn check_unresolved(&mut self, actions: &[Action]) {
        let known: BTreeSet<&Target> = actions.iter().map(Action::canonical_target).collect();
        for action in actions {
            let view = action.as_graph_action();
            for dep in view.dependency_targets() {
                if !known.contains(dep) {
                    let message = CoreError::UnresolvedDependency {
                        action: view.canonical_target().to_string(),
                        dependency: dep.to_string(),
                    }
                    .to_string();
                    self.record_error(view.file_name(), message);
                }
            }
        }
    }

    fn check_cycles(&mut self, actions: &[Action]) {
        let mut deps: BTreeMap<Target, Vec<Target>> = BTreeMap::new();
        let mut files: BTreeMap<&Target, BTreeSet<&str>> = BTreeMap::new();
        for action in actions {
            let view = action.as_graph_action();
            deps.entry(view.canonical_target().clone())
                .or_default()
                .extend(view.dependency_targets().iter().cloned());
            files
                .entry(view.canonical_target())
                .or_default()
                .insert(view.file_name());
        }

        let dag = ActionDag::build(&deps);
        for cycle in dag.cycles() {
            let message = CoreError::CircularDependency {
                cycle: format_cycle(&cycle),
            }
            .to_string();
            let involved: BTreeSet<&str> = cycle
                .iter()
                .filter_map(|t| files.get(t))
                .flatten()
                .copied()
                .collect();
            for file in involved {
                self.record_error(file, message.clone());
            }
        }
    }

    /// Disable every assertion that depends on a disabled action
    fn propagate_disabled(&self, actions: &mut [Action]) {
        let disabled: BTreeSet<Target> = actions
            .iter()
            .map(Action::as_graph_action)
            .filter(|a| a.disabled())
            .map(|a| a.canonical_target().clone())
            .collect();

        for action in actions.iter_mut() {
            if let Action::Assertion(assertion) = action {
                if !assertion.meta.disabled
                    && assertion
                        .meta
                        .dependency_targets
                        .iter()
                        .any(|d| disabled.contains(d))
                {
                    log::debug!(
                        "Disabling {} because a dependency is disabled",
                        assertion.meta.canonical_target
                    );
                    assertion.meta.disabled = true;
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "graph_test.rs"]
mod tests;
