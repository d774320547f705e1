//! Initialize Triad files and scaffold the workspace.
//!
//! This module separates pure logic from IO by accepting closures for
//! filesystem operations, making the core logic easily testable.

use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::Config;
use crate::scaffold;
use crate::templates;

// -----------------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------------

/// Runs the init command: writes `triad.toml` and scaffolds the workspace.
pub(crate) async fn run(workspace: Option<PathBuf>, force: bool) -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;

    info!("Initializing Triad in {}", cwd.display());

    let result = write_config(
        Path::new("triad.toml"),
        force,
        |path| cwd.join(path).exists(),
        |path, content| {
            fs::write(cwd.join(path), content)
                .with_context(|| format!("Failed to write {}", path.display()))
        },
    )?;
    print!("{}", format_result(Path::new("triad.toml"), &result));

    let workspace = workspace.unwrap_or_else(|| {
        let config = Config::load(&cwd).unwrap_or_default();
        cwd.join(config.defaults.workspace)
    });
    scaffold::ensure_workspace_initialized(&workspace).await?;
    println!("  {} {}", "Workspace ready:".green(), workspace.display());

    println!("\n{}", "Triad initialized successfully".green().bold());
    println!("  Next: triad run --goal \"<what to build>\"");

    Ok(())
}

// -----------------------------------------------------------------------------
// Internal types
// -----------------------------------------------------------------------------

/// Result of attempting to write the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteResult {
    /// File was created.
    Created,
    /// File was overwritten.
    Overwritten,
    /// File was skipped (already exists).
    Skipped,
}

// -----------------------------------------------------------------------------
// Helper functions
// -----------------------------------------------------------------------------

/// Core config-write logic, with IO injected for testing.
fn write_config<E, W>(path: &Path, force: bool, exists: E, mut write_file: W) -> Result<WriteResult>
where
    E: Fn(&Path) -> bool,
    W: FnMut(&Path, &str) -> Result<()>,
{
    if exists(path) {
        if !force {
            return Ok(WriteResult::Skipped);
        }
        write_file(path, templates::TRIAD_TOML)?;
        return Ok(WriteResult::Overwritten);
    }
    write_file(path, templates::TRIAD_TOML)?;
    Ok(WriteResult::Created)
}

/// Formats the outcome of the config write for display.
fn format_result(path: &Path, result: &WriteResult) -> String {
    match result {
        WriteResult::Created => format!("  {} {}\n", "Created:".green(), path.display()),
        WriteResult::Overwritten => {
            format!("  {} {}\n", "Overwrote:".yellow(), path.display())
        }
        WriteResult::Skipped => format!(
            "  {} {} already exists (use --force to overwrite)\n",
            "Skipped:".dimmed(),
            path.display()
        ),
    }
}
