//! Hermeticity inference
//!
//! An action is hermetic when every relation its SQL reads is a CTE or a
//! target rendered by `ref()`, `resolve()`, or `self()`.

use df_core::{Hermeticity, Target};
use df_sql::{extract_relations, SqlParser};
use std::collections::BTreeSet;

/// Infer hermeticity from rendered statements.
///
/// Statements that do not parse are skipped; they cannot prove a read.
pub fn infer_hermeticity(
    parser: &SqlParser,
    statements: &[&str],
    referenced: &BTreeSet<Target>,
) -> Hermeticity {
    let known: Vec<Vec<String>> = referenced.iter().map(target_parts).collect();

    for sql in statements {
        let parsed = match parser.parse(sql) {
            Ok(parsed) => parsed,
            Err(e) => {
                log::debug!("Skipping hermeticity check for unparseable SQL: {}", e);
                continue;
            }
        };
        let relations = extract_relations(&parsed);
        let unknown = relations
            .external()
            .find(|parts| !known.iter().any(|k| is_suffix(parts, k)));
        if let Some(unknown) = unknown {
            log::debug!("Reads undeclared relation '{}'", unknown.join("."));
            return Hermeticity::NonHermetic;
        }
    }
    Hermeticity::Hermetic
}

fn target_parts(target: &Target) -> Vec<String> {
    target
        .database
        .iter()
        .chain([&target.schema, &target.name])
        .map(|p| p.to_lowercase())
        .collect()
}

/// Whether `relation` names the trailing components of `target`
fn is_suffix(relation: &[String], target: &[String]) -> bool {
    !relation.is_empty() && relation.len() <= target.len() && target.ends_with(relation)
}
