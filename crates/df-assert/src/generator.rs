//! Assertion SQL generation
//!
//! Every query returns the rows that violate the assertion, so an assertion
//! passes when its query returns nothing. `table` is an already-quoted
//! relation name.

use crate::error::{AssertError, AssertResult};

/// Generate SQL for a uniqueness assertion
///
/// Returns one row per key combination that occurs more than once.
pub fn generate_unique_key_query(table: &str, columns: &[String]) -> AssertResult<String> {
    let columns = non_empty_columns(columns, "uniqueKey", table)?;
    let key = columns.join(", ");
    Ok(format!(
        "select {key}, count(1) as row_count\nfrom {table}\ngroup by {key}\nhaving count(1) > 1"
    ))
}

/// Generate SQL for a non-null assertion
///
/// Returns rows where any of the columns is NULL.
pub fn generate_non_null_query(table: &str, columns: &[String]) -> AssertResult<String> {
    let columns = non_empty_columns(columns, "nonNull", table)?;
    let predicate = columns
        .iter()
        .map(|c| format!("{} is null", c))
        .collect::<Vec<_>>()
        .join(" or ");
    Ok(format!("select * from {table} where {predicate}"))
}

/// Generate SQL for a row-conditions assertion
///
/// Each failing row is tagged with the condition it failed.
pub fn generate_row_conditions_query(table: &str, conditions: &[String]) -> AssertResult<String> {
    let mut parts = Vec::with_capacity(conditions.len());
    for (index, condition) in conditions.iter().enumerate() {
        let condition = condition.trim();
        if condition.is_empty() {
            return Err(AssertError::EmptyCondition {
                index,
                table: table.to_string(),
            });
        }
        parts.push(format!(
            "select '{}' as failing_row_condition, * from {} where not ({})",
            escape_sql_string(condition),
            table,
            condition
        ));
    }
    Ok(parts.join("\nunion all\n"))
}

fn non_empty_columns<'c>(
    columns: &'c [String],
    kind: &str,
    table: &str,
) -> AssertResult<Vec<&'c str>> {
    let columns: Vec<&str> = columns
        .iter()
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .collect();
    if columns.is_empty() {
        return Err(AssertError::EmptyColumns {
            kind: kind.to_string(),
            table: table.to_string(),
        });
    }
    Ok(columns)
}

/// Escape a value for use inside a single-quoted SQL literal
fn escape_sql_string(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "''")
}

#[cfg(test)]
#[path = "generator_test.rs"]
mod tests;
