//! Agent invocation.
//!
//! One call runs the external coding agent once, non-interactively:
//! `claude --dangerously-skip-permissions --print --model <id> --system-prompt <text> <task>`
//!
//! The controller only sees the [`AgentInvoker`] trait, so tests swap in a
//! scripted mock instead of a real binary.

mod claude;
mod error;
#[cfg(test)]
pub(crate) mod mock;

pub(crate) use claude::ClaudeAgent;
pub(crate) use error::AgentError;

use async_trait::async_trait;
use std::path::Path;
use tokio_util::sync::CancellationToken;

use crate::config::Model;

/// Everything the agent receives for one iteration.
#[derive(Debug, Clone, Copy)]
pub(crate) struct AgentRequest<'a> {
    /// Directory the agent runs in.
    pub project_dir: &'a Path,
    /// Rendered system prompt.
    pub system_prompt: &'a str,
    /// Model tier to request.
    pub model: Model,
    /// Task text, passed as the final positional argument.
    pub task: &'a str,
}

/// A coding agent that turns a prompt into text output.
#[async_trait]
pub(crate) trait AgentInvoker: Send + Sync {
    /// Returns the agent name for display.
    fn name(&self) -> &'static str;

    /// Runs the agent once and returns its standard output.
    ///
    /// Must return [`AgentError::Cancelled`] promptly once `cancel` fires.
    async fn invoke(
        &self,
        request: &AgentRequest<'_>,
        cancel: &CancellationToken,
    ) -> Result<String, AgentError>;
}
