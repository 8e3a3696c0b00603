//! Relation extraction from SQL AST
//!
//! Collects every relation a statement reads, along with the CTE names it
//! defines, so callers can tell CTE references from real tables.

use sqlparser::ast::{ObjectName, ObjectNamePart, Query, Statement, Visit, Visitor};
use std::collections::BTreeSet;
use std::ops::ControlFlow;

/// Relations and CTE names found in a set of statements.
///
/// Names are lower-cased. A quoted BigQuery path such as
/// `` `db.schema.table` `` is split into its components.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedRelations {
    /// Every relation reference, as name components
    pub relations: BTreeSet<Vec<String>>,
    /// CTE names defined anywhere in the statements
    pub ctes: BTreeSet<String>,
}

impl ExtractedRelations {
    /// Relations that are not references to a CTE
    pub fn external(&self) -> impl Iterator<Item = &Vec<String>> {
        self.relations.iter().filter(|parts| match parts.as_slice() {
            [single] => !self.ctes.contains(single),
            _ => true,
        })
    }
}

struct RelationCollector {
    found: ExtractedRelations,
}

impl Visitor for RelationCollector {
    type Break = ();

    fn pre_visit_query(&mut self, query: &Query) -> ControlFlow<()> {
        if let Some(with) = &query.with {
            for cte in &with.cte_tables {
                self.found.ctes.insert(cte.alias.name.value.to_lowercase());
            }
        }
        ControlFlow::Continue(())
    }

    fn pre_visit_relation(&mut self, relation: &ObjectName) -> ControlFlow<()> {
        let parts: Vec<String> = relation
            .0
            .iter()
            .filter_map(|part| match part {
                ObjectNamePart::Identifier(ident) => Some(ident.value.as_str()),
                #[allow(unreachable_patterns)]
                _ => None,
            })
            .flat_map(|value| value.split('.'))
            .map(str::to_lowercase)
            .collect();
        if !parts.is_empty() {
            self.found.relations.insert(parts);
        }
        ControlFlow::Continue(())
    }
}

/// Extract all relation references from SQL statements
pub fn extract_relations(statements: &[Statement]) -> ExtractedRelations {
    let mut collector = RelationCollector {
        found: ExtractedRelations::default(),
    };
    for stmt in statements {
        let _ = stmt.visit(&mut collector);
    }
    collector.found
}

#[cfg(test)]
#[path = "extractor_test.rs"]
mod tests;
