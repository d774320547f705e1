//! Claude Code agent capability
//!
//! Invokes the Claude CLI in print mode:
//! ```bash
//! claude -p --dangerously-skip-permissions --max-turns 24 --output-format text
//! ```
//!
//! The instruction is piped via stdin. The role prompt rides along as an
//! appended system prompt, and tool access is scoped to the workspace via
//! `--add-dir` for roles that get one.
//!
//! See: https://docs.anthropic.com/en/docs/claude-code

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use super::error::classify_cli_failure;
use super::{AgentCapability, AgentError, AgentOutput};
use crate::config::ClaudeConfig;

/// Claude Code CLI capability for one workflow role.
pub(crate) struct ClaudeCapability {
    config: ClaudeConfig,
    name: String,
    role_prompt: String,
    workspace: Option<PathBuf>,
}

impl ClaudeCapability {
    /// Creates a capability for `role` with the given role prompt.
    ///
    /// `workspace` scopes filesystem tool access; roles that only reason
    /// (the planner) pass `None`.
    pub fn new(
        config: ClaudeConfig,
        role: &str,
        role_prompt: String,
        workspace: Option<PathBuf>,
    ) -> Self {
        Self {
            config,
            name: format!("{role} (claude)"),
            role_prompt,
            workspace,
        }
    }
}

#[async_trait]
impl AgentCapability for ClaudeCapability {
    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(&self, instruction: &str, max_turns: u32) -> Result<AgentOutput, AgentError> {
        let claude_path = &self.config.path;
        info!("Running {}: {}", self.name, claude_path);

        // claude -p [--dangerously-skip-permissions] [--model m] --max-turns n
        //        --append-system-prompt <role> [--add-dir <workspace>]
        let mut args = vec!["-p".to_string()];

        if self.config.skip_permissions {
            args.push("--dangerously-skip-permissions".to_string());
        }

        if let Some(ref model) = self.config.model {
            args.push("--model".to_string());
            args.push(model.clone());
        }

        args.push("--max-turns".to_string());
        args.push(max_turns.to_string());

        args.push("--append-system-prompt".to_string());
        args.push(self.role_prompt.clone());

        if let Some(ref workspace) = self.workspace {
            args.push("--add-dir".to_string());
            args.push(workspace.display().to_string());
        }

        args.push("--output-format".to_string());
        args.push(self.config.output_format.clone());

        debug!("Claude args: {:?}", args);

        let mut command = tokio::process::Command::new(claude_path);
        if let Some(ref workspace) = self.workspace {
            command.current_dir(workspace);
        }

        let mut child = command
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                AgentError::failed(format!(
                    "Failed to run Claude agent '{claude_path}': {e}. \
                     Install it with `npm install -g @anthropic-ai/claude-code` \
                     or set [agent.claude].path in triad.toml."
                ))
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(instruction.as_bytes())
                .await
                .map_err(|e| AgentError::failed(format!("Failed to write instruction: {e}")))?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| AgentError::failed(format!("Failed to wait for Claude agent: {e}")))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            return Err(classify_cli_failure(
                max_turns,
                output.status.code(),
                &stderr,
                &stdout,
            ));
        }

        info!("{} completed successfully", self.name);
        debug!("Output length: {} bytes", stdout.len());

        Ok(AgentOutput::from_cli_text(&stdout))
    }
}
