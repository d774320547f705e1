//! Configuration for the triad workflow.
//!
//! `triad.toml` holds operator-tunable knobs (provider, turn limits, retry
//! policy, test command). `RuntimeSettings` is the immutable per-run input
//! (goal, workspace, iteration budget) resolved from CLI arguments,
//! environment, and config, and validated before any agent is invoked.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::agent::Provider;
use crate::backoff::RetryPolicy;

const CONFIG_FILE: &str = "triad.toml";

const GOAL_ENV_VAR: &str = "TRIAD_GOAL";
const WORKSPACE_ENV_VAR: &str = "TRIAD_WORKSPACE";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct Config {
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub tests: TestsConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

/// Agent configuration - selects and configures the AI agent CLI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct AgentConfig {
    /// Which agent provider to use: "claude" or "cursor"
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Claude-specific configuration
    #[serde(default)]
    pub claude: ClaudeConfig,

    /// Cursor-specific configuration
    #[serde(default)]
    pub cursor: CursorConfig,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            claude: ClaudeConfig::default(),
            cursor: CursorConfig::default(),
        }
    }
}

impl AgentConfig {
    /// Parse the provider string into a Provider enum
    pub fn get_provider(&self) -> Result<Provider> {
        self.provider.parse()
    }
}

fn default_provider() -> String {
    "claude".to_string()
}

/// Claude Code CLI configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ClaudeConfig {
    /// Path to the Claude CLI
    /// - Default: "claude"
    /// - Custom: "/path/to/claude"
    #[serde(default = "default_claude_path")]
    pub path: String,

    /// Model to use (optional)
    /// - Examples: "opus", "sonnet"
    #[serde(default)]
    pub model: Option<String>,

    /// Skip permission prompts (required for autonomous operation)
    #[serde(default = "default_true")]
    pub skip_permissions: bool,

    /// Output format
    #[serde(default = "default_output_format")]
    pub output_format: String,
}

impl Default for ClaudeConfig {
    fn default() -> Self {
        Self {
            path: default_claude_path(),
            model: None,
            skip_permissions: true,
            output_format: default_output_format(),
        }
    }
}

fn default_claude_path() -> String {
    "claude".to_string()
}

/// Cursor CLI configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CursorConfig {
    /// Path to the Cursor agent CLI
    /// - Default: "agent"
    /// - NixOS: "cursor-agent"
    #[serde(default = "default_cursor_path")]
    pub path: String,

    /// Model to use (optional, uses Cursor's default if not set)
    #[serde(default)]
    pub model: Option<String>,

    /// Output format for non-interactive mode
    #[serde(default = "default_output_format")]
    pub output_format: String,
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self {
            path: default_cursor_path(),
            model: None,
            output_format: default_output_format(),
        }
    }
}

fn default_cursor_path() -> String {
    "agent".to_string()
}

fn default_output_format() -> String {
    "text".to_string()
}

/// Per-role turn limits and the iteration budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct LimitsConfig {
    /// Maximum plan/code/review iterations per run
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// Turn limit for the planner invocation
    #[serde(default = "default_planner_max_turns")]
    pub planner_max_turns: u32,

    /// Turn limit for the coder invocation
    #[serde(default = "default_coder_max_turns")]
    pub coder_max_turns: u32,

    /// Turn limit for the QA invocation
    #[serde(default = "default_qa_max_turns")]
    pub qa_max_turns: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            planner_max_turns: default_planner_max_turns(),
            coder_max_turns: default_coder_max_turns(),
            qa_max_turns: default_qa_max_turns(),
        }
    }
}

fn default_max_iterations() -> u32 {
    3
}

fn default_planner_max_turns() -> u32 {
    8
}

fn default_coder_max_turns() -> u32 {
    24
}

fn default_qa_max_turns() -> u32 {
    16
}

/// Rate-limit retry policy knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct RetryConfig {
    /// Attempts before the rate-limit error is surfaced
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// First backoff delay in seconds
    #[serde(default = "default_initial_delay_secs")]
    pub initial_delay_secs: f64,

    /// Backoff multiplier applied after every failed attempt
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,

    /// Upper bound of the random jitter added to each delay, in seconds
    #[serde(default = "default_jitter_secs")]
    pub jitter_secs: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_secs: default_initial_delay_secs(),
            multiplier: default_multiplier(),
            jitter_secs: default_jitter_secs(),
        }
    }
}

impl RetryConfig {
    /// Builds the gateway retry policy from the configured knobs.
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            initial_delay: Duration::from_secs_f64(self.initial_delay_secs),
            multiplier: self.multiplier,
            jitter: Duration::from_secs_f64(self.jitter_secs),
        }
    }
}

fn default_max_attempts() -> u32 {
    5
}

fn default_initial_delay_secs() -> f64 {
    1.5
}

fn default_multiplier() -> f64 {
    2.0
}

fn default_jitter_secs() -> f64 {
    0.5
}

/// Test command executed in the workspace between the coder and QA steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct TestsConfig {
    /// Command line, parsed shell-style
    #[serde(default = "default_test_command")]
    pub command: String,
}

impl Default for TestsConfig {
    fn default() -> Self {
        Self {
            command: default_test_command(),
        }
    }
}

fn default_test_command() -> String {
    "pytest -q".to_string()
}

/// Fallbacks used when neither CLI nor environment supplies a value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct DefaultsConfig {
    /// Goal sent to the planner when none is given
    #[serde(default = "default_goal")]
    pub goal: String,

    /// Workspace directory, relative paths resolved against the cwd
    #[serde(default = "default_workspace")]
    pub workspace: PathBuf,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            goal: default_goal(),
            workspace: default_workspace(),
        }
    }
}

fn default_goal() -> String {
    "Add add(a,b) in src/add.py and a pytest in tests/test_add.py".to_string()
}

fn default_workspace() -> PathBuf {
    PathBuf::from("workspace")
}

// Default value functions
fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from file, using defaults if not found
    pub fn load(project_dir: &Path) -> Result<Self> {
        let config_path = project_dir.join(CONFIG_FILE);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

        Ok(config)
    }
}

/// Resolved, validated inputs for one workflow run. Immutable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RuntimeSettings {
    /// Free-text task description sent to the planner.
    pub goal: String,
    /// Absolute path the coder may modify.
    pub workspace: PathBuf,
    /// Iteration budget, at least 1.
    pub max_iterations: u32,
}

impl RuntimeSettings {
    /// Resolves settings from CLI arguments, environment, and config.
    ///
    /// Precedence per field: CLI flag > `TRIAD_GOAL` / `TRIAD_WORKSPACE`
    /// env var > `[defaults]` in triad.toml. Validation failures surface
    /// here, before any agent is invoked.
    pub fn resolve(
        goal: Option<String>,
        workspace: Option<PathBuf>,
        max_iterations: Option<u32>,
        config: &Config,
    ) -> Result<Self> {
        Self::resolve_with_env(
            goal,
            workspace,
            max_iterations,
            config,
            std::env::var(GOAL_ENV_VAR).ok().as_deref(),
            std::env::var(WORKSPACE_ENV_VAR).ok().as_deref(),
        )
    }

    /// Internal helper with explicit env var values, for testing.
    fn resolve_with_env(
        goal: Option<String>,
        workspace: Option<PathBuf>,
        max_iterations: Option<u32>,
        config: &Config,
        env_goal: Option<&str>,
        env_workspace: Option<&str>,
    ) -> Result<Self> {
        let goal = goal
            .or_else(|| env_goal.filter(|g| !g.is_empty()).map(String::from))
            .unwrap_or_else(|| config.defaults.goal.clone());

        let workspace = workspace
            .or_else(|| {
                env_workspace
                    .filter(|w| !w.is_empty())
                    .map(PathBuf::from)
            })
            .unwrap_or_else(|| config.defaults.workspace.clone());

        let max_iterations = max_iterations.unwrap_or(config.limits.max_iterations);

        Self::validated(goal, workspace, max_iterations)
    }

    /// Validates and normalises the resolved values.
    fn validated(goal: String, workspace: PathBuf, max_iterations: u32) -> Result<Self> {
        let goal = goal.trim().to_string();
        if goal.is_empty() {
            bail!("Goal must not be empty");
        }

        if max_iterations == 0 {
            bail!("max-iterations must be at least 1");
        }

        let workspace = if workspace.is_absolute() {
            workspace
        } else {
            std::env::current_dir()
                .context("Failed to get current directory")?
                .join(workspace)
        };

        Ok(Self {
            goal,
            workspace,
            max_iterations,
        })
    }
}
