//! Execution of the project's automated tests between the coder and QA
//! steps.
//!
//! A missing or unlaunchable test command is not a workflow error: the
//! result degrades to "not run" and the reviewer sees the explanation.

use std::path::Path;
use tracing::{debug, info, warn};

use super::types::TestRunResult;

/// Runs the configured test command inside the workspace.
///
/// Stdout and stderr are captured and merged; the child is always waited
/// to completion. Never returns an error.
pub(crate) async fn run_tests(workspace: &Path, command: &str) -> TestRunResult {
    let parts = match shell_words::split(command) {
        Ok(parts) => parts,
        Err(e) => {
            return TestRunResult {
                command: Some(command.to_string()),
                exit_code: None,
                output: format!("test command could not be parsed: {e}"),
            };
        }
    };

    let Some((program, args)) = parts.split_first() else {
        return TestRunResult {
            command: None,
            exit_code: None,
            output: "no test command configured".to_string(),
        };
    };

    let spawned = tokio::process::Command::new(program)
        .current_dir(workspace)
        .args(args)
        .output()
        .await;

    match spawned {
        Ok(output) => {
            let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
            let stderr = String::from_utf8_lossy(&output.stderr);
            if !stderr.is_empty() {
                if !combined.is_empty() && !combined.ends_with('\n') {
                    combined.push('\n');
                }
                combined.push_str(&stderr);
            }

            TestRunResult {
                command: Some(command.to_string()),
                exit_code: output.status.code(),
                output: combined,
            }
        }
        Err(e) => {
            let message = format!("test command not found: {e}");
            warn!("{message}");
            TestRunResult {
                command: Some(command.to_string()),
                exit_code: None,
                output: message,
            }
        }
    }
}

/// Runs the tests and logs the outcome for the iteration.
pub(crate) async fn execute_tests(
    iteration: u32,
    workspace: &Path,
    command: &str,
) -> TestRunResult {
    info!("Iteration {iteration}: running tests");
    let result = run_tests(workspace, command).await;

    match result.exit_code {
        None => warn!(
            "Iteration {iteration}: tests were skipped ({})",
            result.output.trim()
        ),
        Some(0) => info!("Iteration {iteration}: tests succeeded"),
        Some(code) => info!("Iteration {iteration}: tests failed with exit code {code}"),
    }
    debug!(
        "Iteration {iteration}: test output for command '{}':\n{}",
        result.command.as_deref().unwrap_or("<not run>"),
        if result.output.is_empty() {
            "<no output>"
        } else {
            result.output.as_str()
        }
    );

    result
}

/// Renders the test outcome for the QA reviewer's instruction.
pub(crate) fn format_test_summary(result: &TestRunResult) -> String {
    let command = result.command.as_deref().unwrap_or("pytest");
    let output = result.output.trim();
    let output = if output.is_empty() { "<no output>" } else { output };

    match result.exit_code {
        None => format!(
            "Command: {command}\n\
             Status: not run (missing command or error before execution)\n\
             Output:\n{output}"
        ),
        Some(code) => {
            let status = if code == 0 { "PASS" } else { "FAIL" };
            format!(
                "Command: {command}\n\
                 Exit code: {code} ({status})\n\
                 Output:\n{output}"
            )
        }
    }
}
