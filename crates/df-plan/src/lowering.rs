//! Warehouse-specific lowering of actions into tasks

use crate::plan::{ActionExecution, Task};
use df_core::{Assertion, GraphAction, Operation, Table, TableType, Warehouse};

/// Lowers compiled actions into tasks for one warehouse
#[derive(Debug, Clone, Copy)]
pub struct Lowering {
    warehouse: Warehouse,
}

impl Lowering {
    pub fn new(warehouse: Warehouse) -> Self {
        Self { warehouse }
    }

    /// Lower one action. Disabled actions and declarations get no tasks.
    pub fn lower(&self, action: GraphAction<'_>, full_refresh: bool) -> ActionExecution {
        let tasks = if action.disabled() {
            log::debug!("{} is disabled; no tasks", action.canonical_target());
            Vec::new()
        } else {
            match action {
                GraphAction::Table(t) => self.table_tasks(t, full_refresh),
                GraphAction::Assertion(a) => self.assertion_tasks(a),
                GraphAction::Operation(o) => self.operation_tasks(o),
                GraphAction::Declaration(_) => Vec::new(),
            }
        };
        let table_type = match action {
            GraphAction::Table(t) => Some(t.table_type),
            _ => None,
        };

        ActionExecution {
            name: action.canonical_target().to_string(),
            kind: action.kind(),
            table_type,
            target: action.target().clone(),
            dependency_targets: action.dependency_targets().to_vec(),
            hermeticity: action.hermeticity(),
            tasks,
        }
    }

    /// Pre-operations, the build statements, then post-operations
    pub fn table_tasks(&self, table: &Table, full_refresh: bool) -> Vec<Task> {
        let target = self.warehouse.quote_target(&table.meta.target);
        let mut tasks: Vec<Task> = table.pre_ops.iter().map(Task::statement).collect();

        match table.table_type {
            TableType::View => tasks.push(Task::statement(format!(
                "create or replace view {} as {}",
                target, table.query
            ))),
            TableType::Table => tasks.extend(self.replace_table(&target, &table.query)),
            TableType::Incremental if full_refresh => {
                tasks.extend(self.replace_table(&target, &table.query))
            }
            TableType::Incremental => {
                let query = table.incremental_query.as_deref().unwrap_or(&table.query);
                tasks.extend(self.merge_incremental(&target, &table.query, query, &table.unique_key));
            }
        }

        tasks.extend(table.post_ops.iter().map(Task::statement));
        tasks
    }

    pub fn assertion_tasks(&self, assertion: &Assertion) -> Vec<Task> {
        vec![Task::assertion(assertion.query.clone())]
    }

    pub fn operation_tasks(&self, operation: &Operation) -> Vec<Task> {
        operation.queries.iter().map(Task::statement).collect()
    }

    fn replace_table(&self, target: &str, query: &str) -> Vec<Task> {
        if self.warehouse.supports_create_or_replace_table() {
            vec![Task::statement(format!(
                "create or replace table {} as {}",
                target, query
            ))]
        } else {
            vec![
                Task::statement(format!("drop table if exists {} cascade", target)),
                Task::statement(format!("create table {} as {}", target, query)),
            ]
        }
    }

    /// Create the table empty if missing, delete rows being replaced, insert
    fn merge_incremental(
        &self,
        target: &str,
        query: &str,
        incremental_query: &str,
        unique_key: &[String],
    ) -> Vec<Task> {
        let mut tasks = vec![Task::statement(format!(
            "create table if not exists {} as select * from ({}) as incremental_source where false",
            target, query
        ))];
        if !unique_key.is_empty() {
            let matches = unique_key
                .iter()
                .map(|k| format!("t.{k} = s.{k}"))
                .collect::<Vec<_>>()
                .join(" and ");
            tasks.push(Task::statement(format!(
                "delete from {} as t where exists (select 1 from ({}) as s where {})",
                target, incremental_query, matches
            )));
        }
        tasks.push(Task::statement(format!(
            "insert into {} {}",
            target, incremental_query
        )));
        tasks
    }
}

#[cfg(test)]
#[path = "lowering_test.rs"]
mod tests;
