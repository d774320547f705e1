//! The plan / code / review workflow.
//!
//! This module runs the iterative loop that drives the three agent roles to
//! a decision. Supporting logic is separated into submodules:
//! - `types`: the workflow data model
//! - `planning`: plan parsing and summarising
//! - `testing`: test execution between the coder and QA steps
//! - `qa`: QA verdict resolution and feedback formatting
//! - `format`: rendering of the final result for the CLI

pub(crate) mod format;
pub(crate) mod planning;
pub(crate) mod qa;
pub(crate) mod testing;
pub(crate) mod types;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::agent::AgentCapability;
use crate::backoff::{invoke_with_backoff, RetryPolicy};
use crate::config::{Config, RuntimeSettings};
use crate::prompts::{build_coder_instruction, build_planner_instruction, build_qa_instruction};

use planning::summarise_plan;
use qa::{planner_feedback, qa_passed, summarise_output};
use testing::{execute_tests, format_test_summary};
use types::{transcript_value, IterationResult, TestRunResult, WorkflowResult};

/// The three role capabilities driving one workflow run.
pub(crate) struct WorkflowAgents {
    pub planner: Box<dyn AgentCapability>,
    pub coder: Box<dyn AgentCapability>,
    pub qa: Box<dyn AgentCapability>,
}

/// Operational knobs for one run, lifted out of `Config`.
#[derive(Debug, Clone)]
pub(crate) struct WorkflowOptions {
    pub planner_max_turns: u32,
    pub coder_max_turns: u32,
    pub qa_max_turns: u32,
    pub retry: RetryPolicy,
    pub test_command: String,
}

impl WorkflowOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            planner_max_turns: config.limits.planner_max_turns,
            coder_max_turns: config.limits.coder_max_turns,
            qa_max_turns: config.limits.qa_max_turns,
            retry: config.retry.policy(),
            test_command: config.tests.command.clone(),
        }
    }
}

/// Runs the plan / code / review loop to a decision.
///
/// Steps run strictly in order within an iteration; iterations run strictly
/// in sequence. QA feedback is threaded into the next planning round. A
/// turn-limit failure on any role aborts the whole run, preserving a
/// partial record of the failing iteration; other agent errors propagate.
pub(crate) async fn execute_workflow(
    settings: &RuntimeSettings,
    agents: &WorkflowAgents,
    options: &WorkflowOptions,
) -> Result<WorkflowResult> {
    let run_id = Uuid::new_v4();
    let mut iterations: Vec<IterationResult> = Vec::new();
    let mut feedback: Option<String> = None;

    info!(
        event = "workflow.start",
        run_id = %run_id,
        goal = %settings.goal,
        workspace = %settings.workspace.display(),
        max_iterations = settings.max_iterations,
    );

    for iteration in 1..=settings.max_iterations {
        info!(event = "iteration.start", run_id = %run_id, iteration);

        // REQUEST_PLAN
        let instruction = build_planner_instruction(&settings.goal, feedback.as_deref());
        info!(event = "iteration.plan.request", iteration, has_feedback = feedback.is_some());
        let plan_output = match invoke_with_backoff(
            agents.planner.as_ref(),
            &instruction,
            options.planner_max_turns,
            &options.retry,
        )
        .await
        {
            Ok(output) => output,
            Err(err) if err.is_turn_limit() => {
                warn!(event = "iteration.plan.max_turns", iteration, error = %err);
                iterations.push(IterationResult::assemble(
                    "Planner exceeded max turns".to_string(),
                    false,
                    String::new(),
                    String::new(),
                    None,
                    TestRunResult::skipped(),
                ));
                return finish(run_id, iterations, false);
            }
            Err(err) => return Err(err).context("Planner invocation failed"),
        };

        let (plan_summary, plan_complete) = summarise_plan(&plan_output);
        info!(event = "iteration.plan.result", iteration, complete = plan_complete);
        debug!("Iteration {iteration}: plan summary:\n{plan_summary}");

        // RUN_EDITOR
        let coder_instruction = build_coder_instruction(&plan_summary);
        info!(event = "iteration.coder.start", iteration);
        let coder_output = match invoke_with_backoff(
            agents.coder.as_ref(),
            &coder_instruction,
            options.coder_max_turns,
            &options.retry,
        )
        .await
        {
            Ok(output) => output,
            Err(err) if err.is_turn_limit() => {
                warn!(event = "iteration.coder.max_turns", iteration, error = %err);
                iterations.push(IterationResult::assemble(
                    plan_summary,
                    plan_complete,
                    "Coder exceeded max turns".to_string(),
                    String::new(),
                    None,
                    TestRunResult::skipped(),
                ));
                return finish(run_id, iterations, false);
            }
            Err(err) => return Err(err).context("Coder invocation failed"),
        };
        let coder_summary = coder_output.as_text();
        info!(event = "iteration.coder.summary", iteration);

        // RUN_TESTS
        let test_result =
            execute_tests(iteration, &settings.workspace, &options.test_command).await;

        // RUN_REVIEW
        let qa_instruction = build_qa_instruction(
            &plan_summary,
            &coder_summary,
            &format_test_summary(&test_result),
        );
        info!(event = "iteration.qa.start", iteration, tests_passed = test_result.passed());
        let qa_output = match invoke_with_backoff(
            agents.qa.as_ref(),
            &qa_instruction,
            options.qa_max_turns,
            &options.retry,
        )
        .await
        {
            Ok(output) => output,
            Err(err) if err.is_turn_limit() => {
                warn!(event = "iteration.qa.max_turns", iteration, error = %err);
                iterations.push(IterationResult::assemble(
                    plan_summary,
                    plan_complete,
                    coder_summary,
                    "QA exceeded max turns".to_string(),
                    None,
                    test_result,
                ));
                return finish(run_id, iterations, false);
            }
            Err(err) => return Err(err).context("QA invocation failed"),
        };

        // DECIDE
        let (qa_review, qa_summary) = summarise_output(&qa_output);
        let qa_text = qa_output.as_text();
        let decision = qa_passed(qa_review.as_ref(), &qa_text);

        let record = IterationResult::assemble(
            plan_summary,
            plan_complete,
            coder_summary,
            qa_summary,
            qa_review.clone(),
            test_result,
        );
        debug!(
            event = "iteration.transcript",
            iteration,
            payload = %transcript_value(&record)
        );
        iterations.push(record);

        match decision {
            Some(true) => {
                info!(event = "iteration.qa.pass", iteration);
                return finish(run_id, iterations, true);
            }
            Some(false) => {
                info!(event = "iteration.qa.fail", iteration);
                feedback = Some(planner_feedback(qa_review.as_ref(), &qa_text));
            }
            None => {
                warn!(
                    event = "iteration.qa.undetermined",
                    iteration,
                    "Could not determine QA status; assuming more work is needed"
                );
                feedback = Some(planner_feedback(None, &qa_text));
            }
        }
    }

    finish(run_id, iterations, false)
}

fn finish(
    run_id: Uuid,
    iterations: Vec<IterationResult>,
    success: bool,
) -> Result<WorkflowResult> {
    info!(
        event = "workflow.end",
        run_id = %run_id,
        total_iterations = iterations.len(),
        success,
    );
    Ok(WorkflowResult {
        iterations,
        success,
    })
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
