//! Agent capabilities for the planner / coder / QA roles.
//!
//! This module provides a unified interface for invoking different AI agent
//! CLIs as role-scoped capabilities:
//! - Cursor: `agent -p "instruction"`
//! - Claude: `claude -p --dangerously-skip-permissions`
//!
//! A capability accepts one instruction, may issue bounded internal tool
//! calls, and returns a final output. The provider is selected via
//! `[agent].provider` in triad.toml.

mod claude;
mod cursor;
mod error;
#[cfg(test)]
pub(crate) mod mock;

pub(crate) use claude::ClaudeCapability;
pub(crate) use cursor::CursorCapability;
pub(crate) use error::AgentError;

use async_trait::async_trait;

/// Final output produced by a capability.
///
/// A role either returns structured JSON (planner, QA) or free text (coder).
/// The variant is fixed at the provider boundary so downstream code matches
/// on it explicitly.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum AgentOutput {
    /// Output that parsed as a JSON document.
    Structured(serde_json::Value),
    /// Plain final message text.
    Raw(String),
}

impl AgentOutput {
    /// Classifies raw CLI text: JSON documents become `Structured`.
    pub fn from_cli_text(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.starts_with('{') || trimmed.starts_with('[') {
            if let Ok(value) = serde_json::from_str(trimmed) {
                return Self::Structured(value);
            }
        }
        Self::Raw(text.to_string())
    }

    /// Returns the output as display text.
    pub fn as_text(&self) -> String {
        match self {
            Self::Structured(value) => value.to_string(),
            Self::Raw(text) => text.clone(),
        }
    }
}

/// Trait for role-scoped agent capabilities.
#[async_trait]
pub(crate) trait AgentCapability: Send + Sync {
    /// Returns the capability name for display (role and provider).
    fn name(&self) -> &str;

    /// Invokes the agent with an instruction, bounded by `max_turns`
    /// internal tool-use rounds, and returns its final output.
    async fn invoke(&self, instruction: &str, max_turns: u32) -> Result<AgentOutput, AgentError>;
}

/// Supported agent providers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum Provider {
    /// Claude Code CLI agent.
    #[default]
    Claude,
    /// Cursor CLI agent.
    Cursor,
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Claude => write!(f, "claude"),
            Self::Cursor => write!(f, "cursor"),
        }
    }
}

impl std::str::FromStr for Provider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "claude" => Ok(Self::Claude),
            "cursor" => Ok(Self::Cursor),
            _ => anyhow::bail!("Unknown agent provider: '{s}'. Supported: claude, cursor"),
        }
    }
}
