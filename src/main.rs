use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod agent;
mod backoff;
mod commands;
mod config;
mod logging;
mod prompts;
mod scaffold;
mod templates;
mod workflow;

#[derive(Parser)]
#[command(name = "triad")]
#[command(
    author,
    version,
    about = "Plan, code, review - an iterative three-agent development workflow"
)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Write a full debug log (JSON lines) to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default triad.toml and scaffold the workspace
    Init {
        /// Workspace directory to scaffold (defaults to [defaults].workspace)
        #[arg(short, long)]
        workspace: Option<PathBuf>,

        /// Force overwrite of an existing triad.toml
        #[arg(short, long)]
        force: bool,
    },

    /// Run the plan / code / review workflow
    Run {
        /// Goal to send to the planner (overrides TRIAD_GOAL and config)
        #[arg(short, long)]
        goal: Option<String>,

        /// Workspace directory the coder may modify
        #[arg(short, long)]
        workspace: Option<PathBuf>,

        /// Maximum number of plan/code/review iterations
        #[arg(short, long)]
        max_iterations: Option<u32>,

        /// Agent provider override: claude or cursor
        #[arg(short, long)]
        provider: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let _log_guard = logging::init(cli.verbose, cli.log_file.as_deref())?;

    match cli.command {
        Commands::Init { workspace, force } => {
            commands::init::run(workspace, force).await?;
        }
        Commands::Run {
            goal,
            workspace,
            max_iterations,
            provider,
        } => {
            commands::run::run(goal, workspace, max_iterations, provider).await?;
        }
    }

    Ok(())
}
