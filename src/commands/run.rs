//! Run the plan / code / review workflow.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::agent::{ClaudeCapability, CursorCapability, Provider};
use crate::config::{Config, RuntimeSettings};
use crate::prompts::{coder_prompt, qa_prompt, PLANNER_PROMPT};
use crate::scaffold;
use crate::workflow::format::{format_banner, format_run_finished, format_workflow_result};
use crate::workflow::{execute_workflow, WorkflowAgents, WorkflowOptions};

/// Runs the workflow command.
pub(crate) async fn run(
    goal: Option<String>,
    workspace: Option<PathBuf>,
    max_iterations: Option<u32>,
    provider_override: Option<String>,
) -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;

    // Load configuration and resolve per-run settings. Both fail before any
    // agent is invoked.
    let config = Config::load(&cwd).context("Failed to load triad.toml")?;
    let settings = RuntimeSettings::resolve(goal, workspace, max_iterations, &config)?;
    let provider = resolve_provider(&config, provider_override.as_deref())?;

    scaffold::ensure_workspace_initialized(&settings.workspace).await?;

    print!(
        "{}",
        format_banner(&settings, &provider.to_string(), &config.tests.command)
    );

    let agents = build_agents(provider, &config, &settings.workspace);
    let options = WorkflowOptions::from_config(&config);

    let started_at = chrono::Utc::now();
    let result = execute_workflow(&settings, &agents, &options).await?;

    print!("{}", format_workflow_result(&result));
    let elapsed = chrono::Utc::now().signed_duration_since(started_at);
    print!("{}", format_run_finished(result.iterations.len(), &elapsed));

    Ok(())
}

/// Resolves the agent provider to use.
/// Priority: CLI flag > `TRIAD_PROVIDER` env var > config file.
fn resolve_provider(config: &Config, provider_override: Option<&str>) -> Result<Provider> {
    let env_provider = std::env::var("TRIAD_PROVIDER").ok();
    resolve_provider_with_env(config, provider_override, env_provider.as_deref())
}

/// Internal helper for provider resolution with explicit env var value.
/// Enables testing without modifying actual environment.
fn resolve_provider_with_env(
    config: &Config,
    provider_override: Option<&str>,
    env_provider: Option<&str>,
) -> Result<Provider> {
    if let Some(p) = provider_override {
        debug!("Using CLI provider override: {}", p);
        return p.parse();
    }

    if let Some(env_val) = env_provider {
        if !env_val.is_empty() {
            debug!("Using TRIAD_PROVIDER env var: {}", env_val);
            return env_val.parse();
        }
    }

    config.agent.get_provider()
}

/// Builds the three role capabilities for the selected provider.
///
/// The planner only reasons and gets no workspace scope; the coder and QA
/// get filesystem access to the workspace.
fn build_agents(provider: Provider, config: &Config, workspace: &Path) -> WorkflowAgents {
    match provider {
        Provider::Claude => {
            let claude = &config.agent.claude;
            WorkflowAgents {
                planner: Box::new(ClaudeCapability::new(
                    claude.clone(),
                    "planner",
                    PLANNER_PROMPT.to_string(),
                    None,
                )),
                coder: Box::new(ClaudeCapability::new(
                    claude.clone(),
                    "coder",
                    coder_prompt(workspace),
                    Some(workspace.to_path_buf()),
                )),
                qa: Box::new(ClaudeCapability::new(
                    claude.clone(),
                    "qa",
                    qa_prompt(workspace),
                    Some(workspace.to_path_buf()),
                )),
            }
        }
        Provider::Cursor => {
            let cursor = &config.agent.cursor;
            WorkflowAgents {
                planner: Box::new(CursorCapability::new(
                    cursor.clone(),
                    "planner",
                    PLANNER_PROMPT.to_string(),
                    None,
                )),
                coder: Box::new(CursorCapability::new(
                    cursor.clone(),
                    "coder",
                    coder_prompt(workspace),
                    Some(workspace.to_path_buf()),
                )),
                qa: Box::new(CursorCapability::new(
                    cursor.clone(),
                    "qa",
                    qa_prompt(workspace),
                    Some(workspace.to_path_buf()),
                )),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentCapability;

    #[test]
    fn test_resolve_provider_config_default() {
        let config = Config::default();
        let provider = resolve_provider_with_env(&config, None, None).unwrap();
        assert_eq!(provider, Provider::Claude);
    }

    #[test]
    fn test_resolve_provider_cli_override() {
        let config = Config::default();
        let provider = resolve_provider_with_env(&config, Some("cursor"), None).unwrap();
        assert_eq!(provider, Provider::Cursor);
    }

    #[test]
    fn test_resolve_provider_env_overrides_config() {
        let config = Config::default();
        let provider = resolve_provider_with_env(&config, None, Some("cursor")).unwrap();
        assert_eq!(provider, Provider::Cursor);
    }

    #[test]
    fn test_resolve_provider_cli_overrides_env() {
        let config = Config::default();
        let provider =
            resolve_provider_with_env(&config, Some("claude"), Some("cursor")).unwrap();
        assert_eq!(provider, Provider::Claude);
    }

    #[test]
    fn test_resolve_provider_empty_env_falls_back() {
        let config = Config::default();
        let provider = resolve_provider_with_env(&config, None, Some("")).unwrap();
        assert_eq!(provider, Provider::Claude);
    }

    #[test]
    fn test_resolve_provider_invalid() {
        let config = Config::default();
        assert!(resolve_provider_with_env(&config, Some("invalid"), None).is_err());
        assert!(resolve_provider_with_env(&config, None, Some("invalid")).is_err());
    }

    #[test]
    fn test_build_agents_names_roles() {
        let config = Config::default();
        let workspace = Path::new("/tmp/ws");

        let claude_agents = build_agents(Provider::Claude, &config, workspace);
        assert_eq!(claude_agents.planner.name(), "planner (claude)");
        assert_eq!(claude_agents.coder.name(), "coder (claude)");
        assert_eq!(claude_agents.qa.name(), "qa (claude)");

        let cursor_agents = build_agents(Provider::Cursor, &config, workspace);
        assert_eq!(cursor_agents.planner.name(), "planner (cursor)");
        assert_eq!(cursor_agents.qa.name(), "qa (cursor)");
    }
}
