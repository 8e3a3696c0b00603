//! Run-time action selection
//!
//! - `actions` non-empty: exactly the named actions (by `name`,
//!   `schema.name`, or `database.schema.name`)
//! - else `tags` non-empty: every enabled action carrying one of the tags
//! - else: every enabled action
//!
//! `includeDependencies` / `includeDependents` then add the transitive
//! dependencies / dependents of the selection. Declarations are never part
//! of a selection.

use crate::action::{ActionKind, GraphAction};
use crate::error::{CoreError, CoreResult};
use crate::graph::CompiledGraph;
use crate::reference::ActionRef;
use crate::target::Target;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Run-time selection options
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunConfig {
    #[serde(default)]
    pub actions: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Rebuild incremental tables from scratch
    #[serde(default)]
    pub full_refresh: bool,
    #[serde(default)]
    pub include_dependencies: bool,
    #[serde(default)]
    pub include_dependents: bool,
}

/// Select actions from a compiled graph, in execution order.
pub fn select_actions(graph: &CompiledGraph, run: &RunConfig) -> CoreResult<Vec<Target>> {
    let dag = graph.dag();
    let selectable = |a: &GraphAction<'_>| a.kind() != ActionKind::Declaration;
    let enabled = |a: &GraphAction<'_>| selectable(a) && !a.disabled();

    let mut selected: BTreeSet<Target> = if !run.actions.is_empty() {
        let mut named = BTreeSet::new();
        for name in &run.actions {
            let reference = ActionRef::parse(name).ok_or_else(|| CoreError::ActionNotFound {
                name: name.clone(),
            })?;
            let parts: Vec<&str> = name.split('.').map(str::trim).collect();
            let matches: Vec<GraphAction<'_>> = graph
                .actions()
                .filter(|a| a.canonical_target().matches_parts(&parts))
                .collect();
            if matches.is_empty() {
                return Err(CoreError::ActionNotFound {
                    name: reference.to_string(),
                });
            }
            let runnable: Vec<Target> = matches
                .iter()
                .filter(|a| selectable(*a))
                .map(|a| a.canonical_target().clone())
                .collect();
            if runnable.is_empty() {
                return Err(CoreError::DeclarationNotRunnable {
                    name: reference.to_string(),
                });
            }
            named.extend(runnable);
        }
        named
    } else if !run.tags.is_empty() {
        graph
            .actions()
            .filter(|a| enabled(a) && a.tags().iter().any(|t| run.tags.contains(t)))
            .map(|a| a.canonical_target().clone())
            .collect()
    } else {
        graph
            .actions()
            .filter(|a| enabled(a))
            .map(|a| a.canonical_target().clone())
            .collect()
    };

    let mut extra = BTreeSet::new();
    for target in &selected {
        if run.include_dependencies {
            extra.extend(dag.ancestors(target));
        }
        if run.include_dependents {
            extra.extend(dag.descendants(target));
        }
    }
    for target in extra {
        if graph.find(&target).is_some_and(|a| enabled(&a)) {
            selected.insert(target);
        }
    }

    log::debug!("Selected {} actions", selected.len());
    dag.order_subset(&selected)
}

#[cfg(test)]
#[path = "selector_test.rs"]
mod tests;
