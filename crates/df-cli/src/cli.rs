//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// dagform - compile SQL definition projects into warehouse execution plans
#[derive(Parser, Debug)]
#[command(name = "dagform")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compile the project into a graph of actions
    Compile(CompileArgs),

    /// Compile, select actions, and print the execution plan
    Run(RunArgs),

    /// Check the installed core package of a packages.json project
    Install(InstallArgs),
}

/// Settings overrides shared by compile and run
#[derive(Args, Debug, Clone, Default)]
pub struct SettingsArgs {
    /// Override/add variables as `key=value,key2=value2`
    #[arg(long)]
    pub vars: Option<String>,

    /// Suffix appended to every runtime schema
    #[arg(long)]
    pub schema_suffix: Option<String>,

    /// Override the default location
    #[arg(long)]
    pub default_location: Option<String>,

    /// Override the default database
    #[arg(long)]
    pub default_database: Option<String>,

    /// Override the default schema
    #[arg(long)]
    pub default_schema: Option<String>,

    /// Override the assertion schema
    #[arg(long)]
    pub assertion_schema: Option<String>,

    /// Disable every assertion
    #[arg(long)]
    pub disable_assertions: bool,

    /// Maximum number of files compiled at once (default: CPU count)
    #[arg(short = 'j', long)]
    pub jobs: Option<usize>,
}

/// Arguments for the compile command
#[derive(Args, Debug)]
pub struct CompileArgs {
    /// Path to project directory
    #[arg(default_value = ".")]
    pub project_dir: PathBuf,

    #[command(flatten)]
    pub settings: SettingsArgs,

    /// Print the compiled graph as JSON
    #[arg(long)]
    pub json: bool,

    /// Exit successfully even when the graph has errors
    #[arg(long)]
    pub allow_errors: bool,
}

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to project directory
    #[arg(default_value = ".")]
    pub project_dir: PathBuf,

    #[command(flatten)]
    pub settings: SettingsArgs,

    /// Warehouse credentials file (unused by dry runs)
    #[arg(long)]
    pub credentials: Option<PathBuf>,

    /// Print the plan without contacting the warehouse
    #[arg(long)]
    pub dry_run: bool,

    /// Print the execution plan as JSON
    #[arg(long)]
    pub json: bool,

    /// Only run actions with one of these tags (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub tags: Vec<String>,

    /// Only run these actions (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub actions: Vec<String>,

    /// Rebuild incremental tables from scratch
    #[arg(long)]
    pub full_refresh: bool,

    /// Also run the transitive dependencies of the selection
    #[arg(long)]
    pub include_deps: bool,

    /// Also run the transitive dependents of the selection
    #[arg(long)]
    pub include_dependents: bool,
}

/// Arguments for the install command
#[derive(Args, Debug)]
pub struct InstallArgs {
    /// Path to project directory
    #[arg(default_value = ".")]
    pub project_dir: PathBuf,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
