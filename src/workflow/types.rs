//! Shared data structures for workflow execution.

use serde::{Deserialize, Serialize};
use serde_json::json;

/// Structured plan produced by the planner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Plan {
    /// Ordered step descriptions.
    pub steps: Vec<String>,
    /// Files the plan intends to create or edit.
    #[serde(default)]
    pub files: Vec<String>,
    /// True when the plan claims to cover the goal without further
    /// planning rounds.
    #[serde(default)]
    pub complete: bool,
}

/// QA verdict status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub(crate) enum QaStatus {
    Pass,
    Fail,
}

impl std::fmt::Display for QaStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pass => write!(f, "PASS"),
            Self::Fail => write!(f, "FAIL"),
        }
    }
}

/// Structured response produced by the QA agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct QAReview {
    /// Overall judgement of the iteration outcome.
    pub status: QaStatus,
    /// High-level recap of findings for this iteration.
    pub summary: String,
    /// Specific problems or follow-up actions discovered by QA.
    #[serde(default)]
    pub issues: Vec<String>,
}

/// Outcome of running the project test suite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct TestRunResult {
    /// Command line that was executed, absent if tests never ran.
    pub command: Option<String>,
    /// Process exit code, absent if the command could not be launched.
    pub exit_code: Option<i32>,
    /// Combined stdout/stderr, or an explanatory message when not run.
    pub output: String,
}

impl TestRunResult {
    /// Result for an iteration where the test step never happened
    /// (synthetic records for aborted iterations).
    pub fn skipped() -> Self {
        Self {
            command: None,
            exit_code: None,
            output: String::new(),
        }
    }

    /// True when the suite ran and exited zero.
    pub fn passed(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Immutable record of one loop pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct IterationResult {
    pub plan_summary: String,
    pub plan_complete: bool,
    pub coder_summary: String,
    pub qa_summary: String,
    pub qa_review: Option<QAReview>,
    pub test_command: Option<String>,
    pub test_exit_code: Option<i32>,
    pub test_output: String,
}

impl IterationResult {
    /// Assembles an iteration record from the step outputs.
    ///
    /// Pure and deterministic; the only place the per-step pieces are
    /// combined.
    pub fn assemble(
        plan_summary: String,
        plan_complete: bool,
        coder_summary: String,
        qa_summary: String,
        qa_review: Option<QAReview>,
        test_result: TestRunResult,
    ) -> Self {
        Self {
            plan_summary,
            plan_complete,
            coder_summary,
            qa_summary,
            qa_review,
            test_command: test_result.command,
            test_exit_code: test_result.exit_code,
            test_output: test_result.output,
        }
    }
}

/// High-level outcome of running the workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct WorkflowResult {
    /// Every completed (or partially completed) iteration, in order.
    pub iterations: Vec<IterationResult>,
    /// True iff the final iteration's QA review resolved to PASS.
    pub success: bool,
}

/// Longest field rendered into a transcript log entry.
const TRANSCRIPT_FIELD_MAX: usize = 2000;

fn clip(text: &str) -> String {
    if text.len() <= TRANSCRIPT_FIELD_MAX {
        return text.to_string();
    }
    let mut end = TRANSCRIPT_FIELD_MAX;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... [truncated {} bytes]", &text[..end], text.len() - end)
}

/// Renders an iteration record for transcript logging.
///
/// Field-by-field over the known data model only, with long outputs
/// clipped; nothing here inspects arbitrary objects.
pub(crate) fn transcript_value(result: &IterationResult) -> serde_json::Value {
    json!({
        "plan_summary": clip(&result.plan_summary),
        "plan_complete": result.plan_complete,
        "coder_summary": clip(&result.coder_summary),
        "qa_summary": clip(&result.qa_summary),
        "qa_status": result.qa_review.as_ref().map(|r| r.status.to_string()),
        "qa_issues": result.qa_review.as_ref().map_or(0, |r| r.issues.len()),
        "test_command": result.test_command,
        "test_exit_code": result.test_exit_code,
        "test_output": clip(&result.test_output),
    })
}
