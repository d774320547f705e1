//! Formatting of workflow results for CLI display.
//!
//! Pure functions returning strings, following the principle of
//! separating formatting from printing.

use chrono::Duration;
use colored::Colorize;
use std::fmt::Write;

use crate::config::RuntimeSettings;
use super::types::{IterationResult, WorkflowResult};

/// Formats the startup banner for display.
pub(crate) fn format_banner(settings: &RuntimeSettings, provider: &str, test_command: &str) -> String {
    let mut out = String::new();

    writeln!(&mut out, "\n{}", "━".repeat(50).dimmed()).unwrap();
    writeln!(&mut out, "{}", "   Triad Workflow Starting".yellow().bold()).unwrap();
    writeln!(&mut out, "{}", "━".repeat(50).dimmed()).unwrap();

    writeln!(&mut out, "  Goal:        {}", settings.goal.cyan()).unwrap();
    writeln!(
        &mut out,
        "  Workspace:   {}",
        settings.workspace.display().to_string().cyan()
    )
    .unwrap();
    writeln!(
        &mut out,
        "  Iterations:  {}",
        settings.max_iterations.to_string().cyan()
    )
    .unwrap();
    writeln!(&mut out, "  Agent:       {}", provider.cyan().bold()).unwrap();
    writeln!(&mut out, "  Tests:       {}", test_command.cyan()).unwrap();
    writeln!(&mut out, "{}", "━".repeat(50).dimmed()).unwrap();

    out
}

/// Formats the full workflow result: one section per iteration and a
/// final SUCCESS / INCOMPLETE line.
pub(crate) fn format_workflow_result(result: &WorkflowResult) -> String {
    let mut out = String::new();

    for (index, iteration) in result.iterations.iter().enumerate() {
        writeln!(
            &mut out,
            "\n{}",
            format!("=== ITERATION {} ===", index + 1).cyan().bold()
        )
        .unwrap();
        writeln!(&mut out, "{}", "--- PLAN ---".dimmed()).unwrap();
        writeln!(&mut out, "{}", iteration.plan_summary).unwrap();
        writeln!(&mut out, "\n{}", "--- CODER SUMMARY ---".dimmed()).unwrap();
        writeln!(&mut out, "{}", iteration.coder_summary).unwrap();
        writeln!(&mut out, "\n{}", "--- TEST RESULTS ---".dimmed()).unwrap();
        write!(&mut out, "{}", format_iteration_tests(iteration)).unwrap();
        writeln!(&mut out, "\n{}", "--- QA SUMMARY ---".dimmed()).unwrap();
        writeln!(&mut out, "{}", iteration.qa_summary).unwrap();
    }

    let overall = if result.success {
        "SUCCESS".green().bold()
    } else {
        "INCOMPLETE".red().bold()
    };
    writeln!(&mut out, "\n=== RESULT: {overall} ===").unwrap();

    out
}

/// Formats the closing line with iteration count and wall-clock time.
pub(crate) fn format_run_finished(iterations: usize, elapsed: &Duration) -> String {
    format!(
        "\n  {} {} iteration(s) in {}\n",
        "Workflow finished:".dimmed(),
        iterations,
        format_duration(elapsed)
    )
}

/// Formats a duration for display (e.g., "2h 5m 30s").
pub(crate) fn format_duration(duration: &Duration) -> String {
    let total_seconds = duration.num_seconds();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{hours}h {minutes}m {seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}

/// Renders one iteration's test section.
fn format_iteration_tests(iteration: &IterationResult) -> String {
    let command = iteration.test_command.as_deref().unwrap_or("pytest");
    let output = iteration.test_output.trim();
    let output = if output.is_empty() { "<no output>" } else { output };
    let status = match iteration.test_exit_code {
        None => "NOT RUN".to_string(),
        Some(0) => "PASS".to_string(),
        Some(code) => format!("FAIL (exit {code})"),
    };
    format!("Command: {command}\nStatus: {status}\nOutput:\n{output}\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::types::{QAReview, QaStatus};
    use std::path::PathBuf;

    fn sample_iteration() -> IterationResult {
        IterationResult {
            plan_summary: "1. Add add()".to_string(),
            plan_complete: true,
            coder_summary: "Wrote src/add.py".to_string(),
            qa_summary: "Status: PASS\nSummary: fine".to_string(),
            qa_review: Some(QAReview {
                status: QaStatus::Pass,
                summary: "fine".to_string(),
                issues: vec![],
            }),
            test_command: Some("pytest -q".to_string()),
            test_exit_code: Some(0),
            test_output: "2 passed".to_string(),
        }
    }

    #[test]
    fn test_success_result_sections() {
        colored::control::set_override(false);
        let result = WorkflowResult {
            iterations: vec![sample_iteration()],
            success: true,
        };
        let rendered = format_workflow_result(&result);

        assert!(rendered.contains("=== ITERATION 1 ==="));
        assert!(rendered.contains("--- PLAN ---\n1. Add add()"));
        assert!(rendered.contains("--- CODER SUMMARY ---\nWrote src/add.py"));
        assert!(rendered.contains("Command: pytest -q\nStatus: PASS\nOutput:\n2 passed"));
        assert!(rendered.contains("--- QA SUMMARY ---\nStatus: PASS"));
        assert!(rendered.contains("=== RESULT: SUCCESS ==="));
    }

    #[test]
    fn test_incomplete_result_line() {
        colored::control::set_override(false);
        let mut iteration = sample_iteration();
        iteration.test_exit_code = Some(2);
        let result = WorkflowResult {
            iterations: vec![iteration],
            success: false,
        };
        let rendered = format_workflow_result(&result);

        assert!(rendered.contains("Status: FAIL (exit 2)"));
        assert!(rendered.contains("=== RESULT: INCOMPLETE ==="));
    }

    #[test]
    fn test_not_run_tests_render_as_not_run() {
        colored::control::set_override(false);
        let mut iteration = sample_iteration();
        iteration.test_exit_code = None;
        iteration.test_output = "pytest command not found".to_string();
        let result = WorkflowResult {
            iterations: vec![iteration],
            success: false,
        };
        let rendered = format_workflow_result(&result);

        assert!(rendered.contains("Status: NOT RUN"));
        assert!(rendered.contains("pytest command not found"));
    }

    #[test]
    fn test_empty_output_placeholder() {
        colored::control::set_override(false);
        let mut iteration = sample_iteration();
        iteration.test_output = String::new();
        let rendered = format_iteration_tests(&iteration);
        assert!(rendered.contains("<no output>"));
    }

    #[test]
    fn test_banner_contains_settings() {
        colored::control::set_override(false);
        let settings = RuntimeSettings {
            goal: "add function".to_string(),
            workspace: PathBuf::from("/tmp/ws"),
            max_iterations: 3,
        };
        let banner = format_banner(&settings, "claude", "pytest -q");
        assert!(banner.contains("add function"));
        assert!(banner.contains("/tmp/ws"));
        assert!(banner.contains("claude"));
        assert!(banner.contains("pytest -q"));
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(&Duration::seconds(45)), "45s");
        assert_eq!(format_duration(&Duration::seconds(125)), "2m 5s");
        assert_eq!(format_duration(&Duration::seconds(7530)), "2h 5m 30s");
    }

    #[test]
    fn test_run_finished_line() {
        colored::control::set_override(false);
        let line = format_run_finished(2, &Duration::seconds(90));
        assert!(line.contains("2 iteration(s)"));
        assert!(line.contains("1m 30s"));
    }

    #[test]
    fn test_two_iterations_numbered() {
        colored::control::set_override(false);
        let result = WorkflowResult {
            iterations: vec![sample_iteration(), sample_iteration()],
            success: true,
        };
        let rendered = format_workflow_result(&result);
        assert!(rendered.contains("=== ITERATION 1 ==="));
        assert!(rendered.contains("=== ITERATION 2 ==="));
    }
}
