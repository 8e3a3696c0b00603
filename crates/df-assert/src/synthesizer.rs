//! Expansion of table assertion specs into assertion actions

use crate::generator::{
    generate_non_null_query, generate_row_conditions_query, generate_unique_key_query,
};
use df_core::{
    ActionDraft, ActionIdentity, ActionKind, DraftKind, FileError, Hermeticity, ProjectConfig,
};
use std::fmt;

/// Kind of built-in assertion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AssertionKind {
    UniqueKey,
    NonNull,
    RowConditions,
}

impl fmt::Display for AssertionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssertionKind::UniqueKey => write!(f, "uniqueKey"),
            AssertionKind::NonNull => write!(f, "nonNull"),
            AssertionKind::RowConditions => write!(f, "rowConditions"),
        }
    }
}

/// Output of a synthesis pass
#[derive(Debug, Default)]
pub struct Synthesized {
    pub drafts: Vec<ActionDraft>,
    pub errors: Vec<FileError>,
}

/// Generates assertion drafts from the `assertions` config of tables
#[derive(Debug)]
pub struct AssertionSynthesizer<'a> {
    config: &'a ProjectConfig,
}

impl<'a> AssertionSynthesizer<'a> {
    pub fn new(config: &'a ProjectConfig) -> Self {
        Self { config }
    }

    /// Synthesize assertions for every table draft.
    ///
    /// Drafts are visited in the given order, so the output is deterministic
    /// for a deterministic input.
    pub fn synthesize_all(&self, drafts: &[ActionDraft]) -> Synthesized {
        let mut out = Synthesized::default();
        for draft in drafts {
            let result = self.synthesize(draft);
            out.drafts.extend(result.drafts);
            out.errors.extend(result.errors);
        }
        log::debug!("Synthesized {} assertions", out.drafts.len());
        out
    }

    /// Synthesize the assertions declared by one table draft
    pub fn synthesize(&self, parent: &ActionDraft) -> Synthesized {
        let mut out = Synthesized::default();
        let DraftKind::Table { assertions, .. } = &parent.kind else {
            return out;
        };
        if assertions.is_empty() {
            return out;
        }

        let canonical = self
            .config
            .canonical_target(ActionKind::Table, &parent.identity);
        let runtime = self.config.runtime_target(ActionKind::Table, &canonical);
        let table = self.config.warehouse().quote_target(&runtime);

        let mut queries = Vec::new();
        for (index, keys) in assertions.key_sets().into_iter().enumerate() {
            queries.push((
                AssertionKind::UniqueKey,
                index,
                generate_unique_key_query(&table, keys),
            ));
        }
        if !assertions.non_null.is_empty() {
            queries.push((
                AssertionKind::NonNull,
                0,
                generate_non_null_query(&table, &assertions.non_null),
            ));
        }
        if !assertions.row_conditions.is_empty() {
            queries.push((
                AssertionKind::RowConditions,
                0,
                generate_row_conditions_query(&table, &assertions.row_conditions),
            ));
        }

        for (kind, index, query) in queries {
            let query = match query {
                Ok(q) => q,
                Err(e) => {
                    out.errors.push(FileError::new(parent.file_name.clone(), e));
                    continue;
                }
            };
            let name = format!(
                "{}_{}_assertions_{}_{}",
                canonical.schema, canonical.name, kind, index
            );
            out.drafts.push(ActionDraft {
                file_name: parent.file_name.clone(),
                identity: ActionIdentity::named(name),
                dependencies: vec![canonical.clone()],
                tags: parent.tags.clone(),
                disabled: parent.disabled,
                description: None,
                hermeticity: Hermeticity::Hermetic,
                kind: DraftKind::Assertion {
                    query,
                    parent: Some(canonical.clone()),
                },
            });
        }
        out
    }
}

#[cfg(test)]
#[path = "synthesizer_test.rs"]
mod tests;
