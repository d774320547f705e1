//! Cursor agent capability
//!
//! Invokes the Cursor CLI agent in print mode:
//! ```bash
//! agent -p "instruction" --output-format text
//! ```
//!
//! The Cursor CLI has no turn-limit flag, so the limit is stated in the
//! instruction preamble and turn exhaustion is recognised from the CLI's
//! own error text.
//!
//! See: https://cursor.com/docs/cli/overview

use async_trait::async_trait;
use std::path::PathBuf;
use tracing::{debug, info};

use super::error::classify_cli_failure;
use super::{AgentCapability, AgentError, AgentOutput};
use crate::config::CursorConfig;

/// Cursor CLI capability for one workflow role.
pub(crate) struct CursorCapability {
    config: CursorConfig,
    name: String,
    role_prompt: String,
    workspace: Option<PathBuf>,
}

impl CursorCapability {
    /// Creates a capability for `role` with the given role prompt.
    pub fn new(
        config: CursorConfig,
        role: &str,
        role_prompt: String,
        workspace: Option<PathBuf>,
    ) -> Self {
        Self {
            config,
            name: format!("{role} (cursor)"),
            role_prompt,
            workspace,
        }
    }
}

#[async_trait]
impl AgentCapability for CursorCapability {
    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(&self, instruction: &str, max_turns: u32) -> Result<AgentOutput, AgentError> {
        let agent_path = &self.config.path;
        info!("Running {}: {}", self.name, agent_path);

        let prompt = format!(
            "{}\n\nUse at most {max_turns} tool calls.\n\n{instruction}",
            self.role_prompt
        );

        // agent -p "prompt" [--model "model"] --output-format text
        let mut args = vec!["-p".to_string(), prompt];

        if let Some(ref model) = self.config.model {
            args.push("--model".to_string());
            args.push(model.clone());
        }

        args.push("--output-format".to_string());
        args.push(self.config.output_format.clone());

        let mut command = tokio::process::Command::new(agent_path);
        if let Some(ref workspace) = self.workspace {
            command.current_dir(workspace);
        }

        let output = command.args(&args).output().await.map_err(|e| {
            AgentError::failed(format!(
                "Failed to run Cursor agent '{agent_path}': {e}. \
                 Install it with `curl https://cursor.com/install -fsS | bash` \
                 or set [agent.cursor].path in triad.toml."
            ))
        })?;

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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_capability_name() {
        let capability = CursorCapability::new(
            CursorConfig::default(),
            "coder",
            "You are the Coder.".to_string(),
            None,
        );
        assert_eq!(capability.name(), "coder (cursor)");
    }
}
