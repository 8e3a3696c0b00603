//! Compile command implementation

use anyhow::{bail, Result};
use df_core::{CompiledGraph, GraphAction};

use crate::cli::{CompileArgs, GlobalArgs};
use crate::commands::common::{load_graph, print_json, report_diagnostics};

/// Execute the compile command
pub(crate) async fn execute(args: &CompileArgs, _global: &GlobalArgs) -> Result<()> {
    let graph = load_graph(&args.project_dir, &args.settings).await?;

    // The graph is printed even when it has errors.
    if args.json {
        print_json(&graph)?;
    } else {
        print_summary(&graph);
    }
    report_diagnostics(&graph);

    if let Some((path, message)) = graph.first_error() {
        if args.allow_errors {
            log::warn!("Ignoring {} compile error(s)", graph.error_count());
        } else {
            bail!(
                "Compilation failed with {} error(s); first in {}: {}",
                graph.error_count(),
                path,
                message
            );
        }
    }
    Ok(())
}

fn print_summary(graph: &CompiledGraph) {
    let actions: Vec<GraphAction<'_>> = graph.actions().collect();
    println!("Compiled {} action(s)", actions.len());
    for action in actions {
        let kind = match action {
            GraphAction::Table(t) => t.table_type.to_string(),
            other => other.kind().to_string(),
        };
        let disabled = if action.disabled() { " (disabled)" } else { "" };
        println!("  {:<12} {}{}", kind, action.target(), disabled);
    }
}
