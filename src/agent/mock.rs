//! Mock agent capability for testing.
//!
//! Provides a configurable mock that returns predetermined responses
//! for workflow testing without invoking real agent CLIs.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::{AgentCapability, AgentError, AgentOutput};

/// A mock capability for testing.
///
/// Returns configurable responses, tracks invocations, and records every
/// instruction it receives so tests can assert on feedback threading.
#[derive(Debug, Clone)]
pub(crate) struct MockCapability {
    /// Responses to return in order. Cycles if invoked more times than
    /// responses are configured.
    responses: Arc<Vec<MockResponse>>,
    /// Number of times `invoke` has been called.
    invocation_count: Arc<AtomicUsize>,
    /// Instructions received, in call order.
    instructions: Arc<Mutex<Vec<String>>>,
    /// Capability name for display.
    name: String,
}

/// A single mock response configuration.
#[derive(Debug, Clone)]
pub(crate) enum MockResponse {
    /// Return a raw text output.
    Raw(String),
    /// Return a structured JSON output.
    Structured(serde_json::Value),
    /// Fail with a rate-limit error.
    RateLimited,
    /// Fail with a turn-limit error.
    TurnLimit,
    /// Fail with a generic error.
    Failed(String),
}

impl MockCapability {
    /// Creates a mock that returns the given responses in order.
    pub fn new(name: &str, responses: Vec<MockResponse>) -> Self {
        Self {
            responses: Arc::new(responses),
            invocation_count: Arc::new(AtomicUsize::new(0)),
            instructions: Arc::new(Mutex::new(Vec::new())),
            name: name.to_string(),
        }
    }

    /// Creates a mock that always returns the given raw text.
    pub fn always_raw(name: &str, output: &str) -> Self {
        Self::new(name, vec![MockResponse::Raw(output.to_string())])
    }

    /// Creates a mock that always returns the given structured value.
    pub fn always_structured(name: &str, value: serde_json::Value) -> Self {
        Self::new(name, vec![MockResponse::Structured(value)])
    }

    /// Number of times `invoke` was called.
    pub fn invocation_count(&self) -> usize {
        self.invocation_count.load(Ordering::SeqCst)
    }

    /// All instructions received so far.
    pub fn instructions(&self) -> Vec<String> {
        self.instructions.lock().unwrap().clone()
    }
}

#[async_trait]
impl AgentCapability for MockCapability {
    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(&self, instruction: &str, max_turns: u32) -> Result<AgentOutput, AgentError> {
        let count = self.invocation_count.fetch_add(1, Ordering::SeqCst);
        self.instructions
            .lock()
            .unwrap()
            .push(instruction.to_string());

        match &self.responses[count % self.responses.len()] {
            MockResponse::Raw(output) => Ok(AgentOutput::Raw(output.clone())),
            MockResponse::Structured(value) => Ok(AgentOutput::Structured(value.clone())),
            MockResponse::RateLimited => Err(AgentError::rate_limited(
                "rate limit exceeded (resource_exhausted)",
            )),
            MockResponse::TurnLimit => Err(AgentError::turn_limit_exceeded(max_turns)),
            MockResponse::Failed(message) => Err(AgentError::failed(message.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_mock_raw_response() {
        let mock = MockCapability::always_raw("planner", "a plan");
        let output = mock.invoke("go", 8).await.unwrap();
        assert_eq!(output, AgentOutput::Raw("a plan".to_string()));
        assert_eq!(mock.name(), "planner");
    }

    #[tokio::test]
    async fn test_mock_structured_response() {
        let mock = MockCapability::always_structured("qa", json!({"status": "PASS"}));
        let output = mock.invoke("review", 8).await.unwrap();
        assert_eq!(output, AgentOutput::Structured(json!({"status": "PASS"})));
    }

    #[tokio::test]
    async fn test_mock_cycles_responses() {
        let mock = MockCapability::new(
            "planner",
            vec![
                MockResponse::Raw("first".to_string()),
                MockResponse::Raw("second".to_string()),
            ],
        );

        let r1 = mock.invoke("", 8).await.unwrap();
        let r2 = mock.invoke("", 8).await.unwrap();
        let r3 = mock.invoke("", 8).await.unwrap();

        assert_eq!(r1, AgentOutput::Raw("first".to_string()));
        assert_eq!(r2, AgentOutput::Raw("second".to_string()));
        assert_eq!(r3, AgentOutput::Raw("first".to_string()));
    }

    #[tokio::test]
    async fn test_mock_records_instructions() {
        let mock = MockCapability::always_raw("planner", "ok");
        let _ = mock.invoke("first instruction", 8).await;
        let _ = mock.invoke("second instruction", 8).await;

        assert_eq!(mock.invocation_count(), 2);
        assert_eq!(
            mock.instructions(),
            vec!["first instruction", "second instruction"]
        );
    }

    #[tokio::test]
    async fn test_mock_rate_limit() {
        let mock = MockCapability::new("planner", vec![MockResponse::RateLimited]);
        let err = mock.invoke("", 8).await.unwrap_err();
        assert!(err.is_rate_limited());
    }

    #[tokio::test]
    async fn test_mock_turn_limit_uses_requested_budget() {
        let mock = MockCapability::new("coder", vec![MockResponse::TurnLimit]);
        let err = mock.invoke("", 24).await.unwrap_err();
        assert!(err.is_turn_limit());
        assert_eq!(err.to_string(), "agent exceeded the 24-turn limit");
    }
}
