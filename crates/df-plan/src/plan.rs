//! Execution plan model, serialized as the run-command output

use df_core::{ActionKind, Hermeticity, ProjectConfig, RunConfig, TableType, Target};
use serde::{Deserialize, Serialize};

/// Selected actions in execution order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionPlan {
    pub project_config: ProjectConfig,
    pub run_config: RunConfig,
    /// Populated by a live executor; always empty for dry runs
    pub warehouse_state: WarehouseState,
    pub actions: Vec<ActionExecution>,
}

impl ExecutionPlan {
    /// Total number of tasks across all actions
    pub fn task_count(&self) -> usize {
        self.actions.iter().map(|a| a.tasks.len()).sum()
    }
}

/// Warehouse metadata known before execution
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarehouseState {
    pub tables: Vec<Target>,
}

/// One selected action and its tasks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionExecution {
    /// Canonical target as `database.schema.name`
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ActionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_type: Option<TableType>,
    pub target: Target,
    pub dependency_targets: Vec<Target>,
    pub hermeticity: Hermeticity,
    pub tasks: Vec<Task>,
}

/// Kind of task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    /// Executed for its side effects
    Statement,
    /// Succeeds when it returns no rows
    Assertion,
}

/// A single warehouse statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(rename = "type")]
    pub task_type: TaskType,
    pub statement: String,
}

impl Task {
    pub fn statement(sql: impl Into<String>) -> Self {
        Self {
            task_type: TaskType::Statement,
            statement: sql.into(),
        }
    }

    pub fn assertion(sql: impl Into<String>) -> Self {
        Self {
            task_type: TaskType::Assertion,
            statement: sql.into(),
        }
    }
}
