//! Execution planning

use crate::error::{PlanError, PlanResult};
use crate::lowering::Lowering;
use crate::plan::{ExecutionPlan, WarehouseState};
use df_core::{select_actions, CompiledGraph, RunConfig};

/// Build an execution plan for a compiled graph.
///
/// Refuses graphs with compile errors. Actions appear in dependency order,
/// ties broken by canonical name; unselected actions are left out entirely.
pub fn plan(graph: &CompiledGraph, run: &RunConfig) -> PlanResult<ExecutionPlan> {
    if let Some((path, message)) = graph.first_error() {
        return Err(PlanError::GraphHasErrors {
            count: graph.error_count(),
            path: path.to_string(),
            message: message.to_string(),
        });
    }

    let order = select_actions(graph, run)?;
    let lowering = Lowering::new(graph.project_config.warehouse());
    let actions: Vec<_> = order
        .iter()
        .filter_map(|target| graph.find(target))
        .map(|action| lowering.lower(action, run.full_refresh))
        .collect();

    let plan = ExecutionPlan {
        project_config: graph.project_config.clone(),
        run_config: run.clone(),
        warehouse_state: WarehouseState::default(),
        actions,
    };
    log::debug!(
        "Planned {} actions with {} tasks",
        plan.actions.len(),
        plan.task_count()
    );
    Ok(plan)
}

#[cfg(test)]
#[path = "planner_test.rs"]
mod tests;
