//! df-plan - execution planning for dagform
//!
//! Turns a compiled graph and a [`RunConfig`](df_core::RunConfig) into an
//! [`ExecutionPlan`]: the selected actions in dependency order, each lowered
//! to the warehouse statements that build it.

pub mod error;
pub mod lowering;
pub mod plan;
pub mod planner;

pub use error::{PlanError, PlanResult};
pub use lowering::Lowering;
pub use plan::{ActionExecution, ExecutionPlan, Task, TaskType, WarehouseState};
pub use planner::plan;
