//! Plan parsing and summarising.
//!
//! The planner is asked for JSON (`steps`/`files`/`complete`) but a
//! freeform answer still drives the iteration: it becomes the plan summary
//! verbatim, with the completion flag pessimistically false.

use crate::agent::AgentOutput;
use super::types::Plan;

/// Best-effort conversion of a planner output into a `Plan`.
pub(crate) fn parse_plan(output: &AgentOutput) -> Option<Plan> {
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

/// Converts planner output into a textual summary and completion flag.
pub(crate) fn summarise_plan(output: &AgentOutput) -> (String, bool) {
    if let Some(plan) = parse_plan(output) {
        let summary = render_plan(&plan);
        if summary.is_empty() {
            return ("Planner returned an empty plan.".to_string(), plan.complete);
        }
        return (summary, plan.complete);
    }

    let text = output.as_text().trim().to_string();
    if text.is_empty() {
        return ("Planner returned no output.".to_string(), false);
    }
    (text, false)
}

/// Renders a structured plan as numbered steps, an optional file list,
/// and an optional completion note.
fn render_plan(plan: &Plan) -> String {
    let mut sections = Vec::new();

    if !plan.steps.is_empty() {
        let steps = plan
            .steps
            .iter()
            .enumerate()
            .map(|(i, step)| format!("{}. {}", i + 1, step))
            .collect::<Vec<_>>()
            .join("\n");
        sections.push(steps);
    }

    if !plan.files.is_empty() {
        let files = plan
            .files
            .iter()
            .map(|file| format!("- {file}"))
            .collect::<Vec<_>>()
            .join("\n");
        sections.push(format!("Files:\n{files}"));
    }

    if plan.complete && !sections.is_empty() {
        sections.push("(plan marked complete)".to_string());
    }

    sections.join("\n\n")
}
