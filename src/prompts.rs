//! Role prompts and per-iteration instruction builders.

use std::path::Path;

/// Planner role prompt. Demands a JSON plan so the summary and completion
/// flag can be extracted reliably.
pub(crate) const PLANNER_PROMPT: &str = "\
You are the Planner.
Break the coding goal (and optional QA feedback) into a concise, verifiable plan.

Rules:
- Limit the plan to at most 3 steps.
- Keep each step narrow (ideally one file or concern) and easy to verify.
- Place production code changes in `src/` and tests in `tests/`, mirroring structure.
- Always include explicit steps for implementation and the tests that cover happy paths, edge cases, error handling, and CLI/persistence behaviour when relevant.
- Do not add external dependencies unless necessary; if needed, include a step mentioning the `pyproject.toml` update.

Respond only with JSON using this schema:
{
  \"steps\": [\"<action 1>\", \"<action 2>\", ...],
  \"files\": [\"src/...\", \"tests/...\", ...],
  \"complete\": true | false
}

Set `complete` to true only when these steps cover everything required to finish the goal without further planning iterations.";

/// Returns the coder role prompt tailored to the workspace path.
pub(crate) fn coder_prompt(workspace: &Path) -> String {
    format!(
        "You are the Coder.\n\
         Use your filesystem tools on {} to implement the plan with minimal edits.\n\
         Rules:\n\
         - Read a file before rewriting it\n\
         - Create parent directories as needed\n\
         - Keep messages terse; do the work via tools\n\
         - When adding features, write or extend automated tests that cover success, failure, edge cases, and CLI entry points so QA can verify them",
        workspace.display()
    )
}

/// Returns the QA role prompt tailored to the workspace path.
pub(crate) fn qa_prompt(workspace: &Path) -> String {
    format!(
        "You are the QA Reviewer.\n\
         Inspect the work done in {}, focusing on correctness, completeness, and test coverage.\n\
         Verify that automated tests exist for happy paths, edge cases, error handling, and any CLI/data output described in the plan.\n\
         Read files only; do not modify them. Fail the review if required coverage is missing or the test suite did not pass.\n\
         Respond strictly as JSON matching the schema: {{\"status\": \"PASS|FAIL\", \"summary\": string, \"issues\": [string, ...]}}.",
        workspace.display()
    )
}

/// Instruction sent to the planner for the current iteration.
pub(crate) fn build_planner_instruction(goal: &str, feedback: Option<&str>) -> String {
    let mut lines = vec!["Goal:".to_string(), goal.trim().to_string()];
    match feedback {
        Some(feedback) => {
            lines.push(String::new());
            lines.push("QA feedback from previous iteration:".to_string());
            lines.push(feedback.trim().to_string());
            lines.push(String::new());
            lines.push(
                "Revise the plan to address the feedback while keeping the steps minimal."
                    .to_string(),
            );
        }
        None => {
            lines.push(String::new());
            lines.push("Produce a plan that will achieve the goal.".to_string());
        }
    }
    lines.join("\n")
}

/// Instruction sent to the coder after planning.
pub(crate) fn build_coder_instruction(plan_summary: &str) -> String {
    format!(
        "Implement the following plan. Create any missing files or directories as needed.\n\n{}",
        plan_summary.trim()
    )
}

/// Instruction sent to the QA reviewer after the coder finishes.
pub(crate) fn build_qa_instruction(
    plan_summary: &str,
    coder_summary: &str,
    test_summary: &str,
) -> String {
    format!(
        "Review the current workspace for alignment with the plan and highlight any issues.\n\
         Describe missing functionality, broken tests, or risky changes. Analyse whether tests cover edge cases, error handling paths, and CLI interactions demanded by the goal.\n\
         If the test suite failed, or any critical scenario lacks automated coverage, you must return OVERALL_STATUS: FAIL and outline the gaps to address.\n\
         Finish your response with a single line `OVERALL_STATUS: PASS` or `OVERALL_STATUS: FAIL`.\n\
         Plan:\n{}\n\n\
         Coder summary:\n{}\n\n\
         Test results:\n{}",
        plan_summary.trim(),
        coder_summary.trim(),
        test_summary.trim()
    )
}
