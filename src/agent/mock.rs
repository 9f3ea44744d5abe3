//! Mock agent for testing.
//!
//! Returns scripted responses so controller tests never start a real agent.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

use super::{AgentError, AgentInvoker, AgentRequest};

/// A mock agent for testing.
///
/// Returns configurable responses and tracks invocations for test assertions.
#[derive(Debug, Clone)]
pub(crate) struct MockAgent {
    /// Responses to return in order. Cycles if more invocations than responses.
    responses: Arc<Vec<MockResponse>>,
    /// Number of times `invoke` has been called.
    invocation_count: Arc<AtomicUsize>,
    /// Task text of every invocation, in order.
    tasks: Arc<Mutex<Vec<String>>>,
    /// System prompt of every invocation, in order.
    system_prompts: Arc<Mutex<Vec<String>>>,
}

/// A single mock response configuration.
#[derive(Debug, Clone)]
pub(crate) enum MockResponse {
    /// Return the given output.
    Success(String),
    /// Fail as if the process exited non-zero with this stderr.
    Error(String),
    /// Fail as if the binary were missing.
    NotFound,
    /// Block until cancelled, like a long-running agent.
    Hang,
}

impl MockAgent {
    /// Create a mock that returns the given responses in order.
    pub fn new(responses: Vec<MockResponse>) -> Self {
        Self {
            responses: Arc::new(responses),
            invocation_count: Arc::new(AtomicUsize::new(0)),
            tasks: Arc::new(Mutex::new(Vec::new())),
            system_prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a mock whose outputs are the given strings, in order.
    pub fn outputs(outputs: &[&str]) -> Self {
        Self::new(
            outputs
                .iter()
                .map(|o| MockResponse::Success((*o).to_string()))
                .collect(),
        )
    }

    /// Create a mock that always succeeds with the given output.
    pub fn always_succeed(output: &str) -> Self {
        Self::new(vec![MockResponse::Success(output.to_string())])
    }

    /// Create a mock that always fails with the given stderr.
    pub fn always_fail(stderr: &str) -> Self {
        Self::new(vec![MockResponse::Error(stderr.to_string())])
    }

    /// Get the number of times `invoke` was called.
    pub fn invocation_count(&self) -> usize {
        self.invocation_count.load(Ordering::SeqCst)
    }

    /// Task texts received so far.
    pub fn tasks(&self) -> Vec<String> {
        self.tasks.lock().unwrap().clone()
    }

    /// System prompts received so far.
    pub fn system_prompts(&self) -> Vec<String> {
        self.system_prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl AgentInvoker for MockAgent {
    fn name(&self) -> &'static str {
        "Mock"
    }

    async fn invoke(
        &self,
        request: &AgentRequest<'_>,
        cancel: &CancellationToken,
    ) -> Result<String, AgentError> {
        let count = self.invocation_count.fetch_add(1, Ordering::SeqCst);
        self.tasks.lock().unwrap().push(request.task.to_string());
        self.system_prompts
            .lock()
            .unwrap()
            .push(request.system_prompt.to_string());

        if cancel.is_cancelled() {
            return Err(AgentError::Cancelled);
        }

        match &self.responses[count % self.responses.len()] {
            MockResponse::Success(output) => Ok(output.clone()),
            MockResponse::Error(stderr) => Err(AgentError::exit_with("exit status: 1", stderr)),
            MockResponse::NotFound => Err(AgentError::NotFound {
                program: "mock".to_string(),
            }),
            MockResponse::Hang => {
                cancel.cancelled().await;
                Err(AgentError::Cancelled)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Model;
    use std::path::Path;

    fn request(task: &str) -> AgentRequest<'_> {
        AgentRequest {
            project_dir: Path::new("/tmp"),
            system_prompt: "system",
            model: Model::Best,
            task,
        }
    }

    #[test]
    fn test_mock_agent_name() {
        let agent = MockAgent::always_succeed("ok");
        assert_eq!(agent.name(), "Mock");
    }

    #[tokio::test]
    async fn test_mock_agent_success() {
        let agent = MockAgent::always_succeed("test output");
        let result = agent
            .invoke(&request("task"), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(result, "test output");
    }

    #[tokio::test]
    async fn test_mock_agent_error() {
        let agent = MockAgent::always_fail("test error");
        let result = agent
            .invoke(&request("task"), &CancellationToken::new())
            .await;
        assert!(result.unwrap_err().to_string().contains("test error"));
    }

    #[tokio::test]
    async fn test_mock_agent_cycles_responses() {
        let agent = MockAgent::outputs(&["first", "second"]);
        let cancel = CancellationToken::new();

        let r1 = agent.invoke(&request(""), &cancel).await.unwrap();
        let r2 = agent.invoke(&request(""), &cancel).await.unwrap();
        let r3 = agent.invoke(&request(""), &cancel).await.unwrap();

        assert_eq!(r1, "first");
        assert_eq!(r2, "second");
        assert_eq!(r3, "first"); // Cycles back
    }

    #[tokio::test]
    async fn test_mock_agent_records_requests() {
        let agent = MockAgent::always_succeed("ok");
        let cancel = CancellationToken::new();
        assert_eq!(agent.invocation_count(), 0);

        let _ = agent.invoke(&request("one"), &cancel).await;
        let _ = agent.invoke(&request("two"), &cancel).await;

        assert_eq!(agent.invocation_count(), 2);
        assert_eq!(agent.tasks(), vec!["one".to_string(), "two".to_string()]);
        assert_eq!(agent.system_prompts().len(), 2);
    }

    #[tokio::test]
    async fn test_mock_agent_hang_until_cancelled() {
        let agent = MockAgent::new(vec![MockResponse::Hang]);
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move { trigger.cancel() });

        let result = agent.invoke(&request(""), &cancel).await;
        assert!(matches!(result, Err(AgentError::Cancelled)));
    }
}
