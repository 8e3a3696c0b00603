//! Run command implementation
//!
//! Only dry runs are supported: the plan is printed and no warehouse is
//! contacted.

use anyhow::{bail, Context, Result};
use df_core::RunConfig;
use df_plan::{ExecutionPlan, TaskType};

use crate::cli::{GlobalArgs, RunArgs};
use crate::commands::common::{load_graph, print_json, report_diagnostics};

/// Execute the run command
pub(crate) async fn execute(args: &RunArgs, global: &GlobalArgs) -> Result<()> {
    if !args.dry_run {
        bail!("Live warehouse execution is not supported by this build; re-run with --dry-run");
    }
    if let Some(credentials) = &args.credentials {
        log::debug!(
            "Dry run: credentials file {} is not read",
            credentials.display()
        );
    }

    let graph = load_graph(&args.project_dir, &args.settings).await?;
    if graph.has_errors() {
        report_diagnostics(&graph);
    }

    let run_config = RunConfig {
        actions: args.actions.clone(),
        tags: args.tags.clone(),
        full_refresh: args.full_refresh,
        include_dependencies: args.include_deps,
        include_dependents: args.include_dependents,
    };
    let plan = df_plan::plan(&graph, &run_config).context("Failed to plan execution")?;

    if args.json {
        print_json(&plan)?;
    } else {
        print_plan(&plan, global.verbose);
    }
    Ok(())
}

fn print_plan(plan: &ExecutionPlan, verbose: bool) {
    println!(
        "Dry run: {} action(s), {} task(s)",
        plan.actions.len(),
        plan.task_count()
    );
    for action in &plan.actions {
        let kind = match action.table_type {
            Some(table_type) => table_type.to_string(),
            None => action.kind.to_string(),
        };
        println!("  {:<12} {}", kind, action.target);
        if action.tasks.is_empty() {
            println!("      (no tasks)");
        }
        for task in &action.tasks {
            let label = match task.task_type {
                TaskType::Statement => "",
                TaskType::Assertion => "assert: ",
            };
            if verbose {
                println!("      {}{}", label, task.statement);
            } else {
                let first_line = task.statement.lines().next().unwrap_or_default();
                println!("      {}{}", label, first_line);
            }
        }
    }
}
