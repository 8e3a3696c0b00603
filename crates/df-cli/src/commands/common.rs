//! Helpers shared by compile and run

use anyhow::{Context, Result};
use df_compiler::{compile_project, CompileOptions};
use df_core::{CompiledGraph, SettingsOverrides};
use std::path::Path;

use crate::cli::SettingsArgs;

impl SettingsArgs {
    /// Settings overrides named by the flags
    pub(crate) fn overrides(&self) -> Result<SettingsOverrides> {
        let vars = match &self.vars {
            Some(raw) => SettingsOverrides::parse_vars(raw)?,
            None => Default::default(),
        };
        Ok(SettingsOverrides {
            vars,
            schema_suffix: self.schema_suffix.clone(),
            default_location: self.default_location.clone(),
            default_database: self.default_database.clone(),
            default_schema: self.default_schema.clone(),
            assertion_schema: self.assertion_schema.clone(),
            disable_assertions: self.disable_assertions,
        })
    }

    pub(crate) fn compile_options(&self) -> CompileOptions {
        match self.jobs {
            Some(jobs) => CompileOptions {
                concurrency: jobs.max(1),
            },
            None => CompileOptions::default(),
        }
    }
}

/// Resolve settings and compile the project
pub(crate) async fn load_graph(project_dir: &Path, settings: &SettingsArgs) -> Result<CompiledGraph> {
    let overrides = settings.overrides()?;
    compile_project(project_dir, &overrides, settings.compile_options())
        .await
        .with_context(|| format!("Failed to compile project at {}", project_dir.display()))
}

/// Print every graph error and warning to stderr
pub(crate) fn report_diagnostics(graph: &CompiledGraph) {
    for (path, warnings) in &graph.graph_warnings {
        for warning in warnings {
            eprintln!("[warn] {}: {}", path, warning);
        }
    }
    for (path, errors) in &graph.graph_errors {
        for error in errors {
            eprintln!("[error] {}: {}", path, error);
        }
    }
}

/// Print a value as pretty JSON on stdout
pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}
