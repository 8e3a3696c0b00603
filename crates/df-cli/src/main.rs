//! dagform CLI - compile SQL definition projects into execution plans

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;
mod logging;

use cli::{Cli, Commands};
use commands::{compile, install, run};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.global.verbose);

    let command = async {
        match &cli.command {
            Commands::Compile(args) => compile::execute(args, &cli.global).await,
            Commands::Run(args) => run::execute(args, &cli.global).await,
            Commands::Install(args) => install::execute(args, &cli.global).await,
        }
    };

    // Dropping the command future aborts in-flight compile tasks.
    tokio::select! {
        result = command => result,
        _ = tokio::signal::ctrl_c() => anyhow::bail!("Interrupted"),
    }
}
