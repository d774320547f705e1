//! Parsing and summarising of QA reviewer outputs.
//!
//! The reviewer is asked for structured JSON but may answer in prose; the
//! resolver accepts both. Freeform answers are scanned from the last line
//! backward for an `OVERALL_STATUS:` declaration, because a reviewer often
//! restates the status while reasoning and only the final declaration
//! counts.

use regex::Regex;
use std::sync::LazyLock;

use crate::agent::AgentOutput;
use super::types::{QAReview, QaStatus};

static QA_STATUS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*\**\s*OVERALL_STATUS:\s*(PASS|FAIL)\s*\**\s*$")
        .expect("status pattern compiles")
});

/// Best-effort conversion of an agent output into a `QAReview`.
pub(crate) fn coerce_review(output: &AgentOutput) -> Option<QAReview> {
    match output {
        AgentOutput::Structured(value) => serde_json::from_value(value.clone()).ok(),
        AgentOutput::Raw(text) => {
            let text = text.trim();
            if text.is_empty() {
                return None;
            }
            serde_json::from_str(text).ok()
        }
    }
}

/// Determines whether QA approved the iteration.
///
/// A structured review wins outright. Otherwise the raw text is scanned
/// backward for the final `OVERALL_STATUS` line. `None` means the status
/// could not be determined at all.
pub(crate) fn qa_passed(review: Option<&QAReview>, qa_output: &str) -> Option<bool> {
    if let Some(review) = review {
        return Some(review.status == QaStatus::Pass);
    }

    for line in qa_output.trim().lines().rev() {
        if let Some(captures) = QA_STATUS_RE.captures(line) {
            return Some(captures[1].eq_ignore_ascii_case("PASS"));
        }
    }
    None
}

/// Human-readable QA summary for display and iteration records.
pub(crate) fn format_summary(review: Option<&QAReview>, raw_output: &str) -> String {
    let Some(review) = review else {
        return raw_output.to_string();
    };

    let issues_block = if review.issues.is_empty() {
        String::new()
    } else {
        format!("\nIssues:\n- {}", review.issues.join("\n- "))
    };
    format!(
        "Status: {}\nSummary: {}{}",
        review.status, review.summary, issues_block
    )
}

/// Feedback string handed to the planner when the iteration did not pass.
pub(crate) fn planner_feedback(review: Option<&QAReview>, raw_output: &str) -> String {
    let Some(review) = review else {
        return raw_output.to_string();
    };

    if review.issues.is_empty() {
        return format!(
            "QA Summary: {}\nStatus: {}",
            review.summary, review.status
        );
    }

    let bullets = review
        .issues
        .iter()
        .map(|issue| format!("- {issue}"))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "QA Summary: {}\nStatus: {}\nOutstanding issues:\n{}",
        review.summary, review.status, bullets
    )
}

/// Resolves a QA output into its review (if any) and display summary.
pub(crate) fn summarise_output(output: &AgentOutput) -> (Option<QAReview>, String) {
    let review = coerce_review(output);
    let summary = format_summary(review.as_ref(), &output.as_text());
    (review, summary)
}
