//! Workspace scaffolding.
//!
//! Ensures the workspace directory is ready for agent runs. When
//! `pyproject.toml` is absent and `uv` is available, `uv init .` is run
//! inside the workspace and bare `src` / `tests` packages are created so
//! subsequent agent steps see a predictable layout. Existing projects are
//! left untouched.

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Prepares the workspace directory for a run.
pub(crate) async fn ensure_workspace_initialized(workspace: &Path) -> Result<()> {
    fs::create_dir_all(workspace)
        .with_context(|| format!("Failed to create workspace: {}", workspace.display()))?;

    let legacy_subdir = workspace.join("workspace");
    if legacy_subdir.exists() {
        warn!(
            "Found nested workspace directory at {}. It will not be modified automatically.",
            legacy_subdir.display()
        );
    }

    if workspace.join("pyproject.toml").exists() {
        return Ok(());
    }

    if !uv_available().await {
        warn!(
            "uv command not found; cannot initialise project automatically at {}. \
             Initialise the workspace manually.",
            workspace.display()
        );
        return Ok(());
    }

    run_uv_init(workspace).await?;
    ensure_basic_layout(workspace)?;
    Ok(())
}

/// Checks whether the `uv` project tool is on the PATH.
async fn uv_available() -> bool {
    tokio::process::Command::new("uv")
        .arg("--version")
        .output()
        .await
        .map(|output| output.status.success())
        .unwrap_or(false)
}

/// Runs `uv init .` inside the workspace.
async fn run_uv_init(workspace: &Path) -> Result<()> {
    info!("Initialising workspace with `uv init .` at {}", workspace.display());

    let output = tokio::process::Command::new("uv")
        .args(["init", "."])
        .current_dir(workspace)
        .output()
        .await
        .context("Failed to run uv init")?;

    if !output.status.success() {
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!(
            "uv init failed in {} with exit code {:?}. Output:\n{stdout}{stderr}",
            workspace.display(),
            output.status.code(),
        );
    }
    Ok(())
}

/// Guarantees bare `src` and `tests` packages exist.
fn ensure_basic_layout(workspace: &Path) -> Result<()> {
    for dir in ["src", "tests"] {
        let dir_path = workspace.join(dir);
        fs::create_dir_all(&dir_path)
            .with_context(|| format!("Failed to create {}", dir_path.display()))?;

        let init_file = dir_path.join("__init__.py");
        if !init_file.exists() {
            fs::write(&init_file, "")
                .with_context(|| format!("Failed to create {}", init_file.display()))?;
        }
    }
    Ok(())
}
