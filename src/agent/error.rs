//! Domain-specific error types for agent invocations.
//!
//! Typed errors enable callers to match on specific failure modes
//! rather than parsing error message strings. The gateway retries
//! `RateLimited`; the workflow controller catches `TurnLimitExceeded`
//! per step; everything else propagates.

/// Errors that can occur while invoking an agent capability.
#[derive(Debug, thiserror::Error)]
pub(crate) enum AgentError {
    /// The upstream model refused the request due to rate limiting.
    #[error("agent is rate limited: {message}")]
    RateLimited { message: String },

    /// The capability exceeded its internal tool-use turn budget.
    #[error("agent exceeded the {max_turns}-turn limit")]
    TurnLimitExceeded { max_turns: u32 },

    /// Any other invocation failure (spawn error, nonzero exit, bad output).
    #[error("agent invocation failed: {message}")]
    Failed { message: String },
}

impl AgentError {
    /// Creates a `RateLimited` error.
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::RateLimited {
            message: message.into(),
        }
    }

    /// Creates a `TurnLimitExceeded` error.
    pub fn turn_limit_exceeded(max_turns: u32) -> Self {
        Self::TurnLimitExceeded { max_turns }
    }

    /// Creates a `Failed` error.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }

    /// Returns true if this is a rate-limit error.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    /// Returns true if this is a turn-limit error.
    pub fn is_turn_limit(&self) -> bool {
        matches!(self, Self::TurnLimitExceeded { .. })
    }
}

/// Classifies a failed CLI invocation from its exit status and output.
///
/// Agent CLIs report rate limiting and turn exhaustion as text on stderr
/// rather than distinct exit codes, so the mapping to error kinds happens
/// once here at the provider boundary.
pub(super) fn classify_cli_failure(
    max_turns: u32,
    exit_code: Option<i32>,
    stderr: &str,
    stdout: &str,
) -> AgentError {
    let combined = format!("{stderr}\n{stdout}");
    let lower = combined.to_lowercase();

    if lower.contains("rate limit")
        || lower.contains("resource_exhausted")
        || lower.contains("429")
        || lower.contains("quota")
        || lower.contains("overloaded")
    {
        let message = stderr.trim();
        let message = if message.is_empty() {
            stdout.trim()
        } else {
            message
        };
        return AgentError::rate_limited(message);
    }

    if lower.contains("max turns") || lower.contains("max_turns") || lower.contains("turn limit") {
        return AgentError::turn_limit_exceeded(max_turns);
    }

    AgentError::failed(format!(
        "exit code {exit_code:?}: {}",
        stderr.trim().lines().take(10).collect::<Vec<_>>().join("\n")
    ))
}
