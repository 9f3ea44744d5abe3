//! Typed errors for agent invocations.

use std::io;
use std::process::ExitStatus;

/// Ways a single agent invocation can fail.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// The agent program does not exist.
    #[error(
        "Agent command '{program}' not found. Install Claude Code \
         (npm install -g @anthropic-ai/claude-code) or set agent-command"
    )]
    NotFound { program: String },

    /// The agent program exists but could not be started.
    #[error("Failed to start agent command '{program}'")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The agent ran and exited unsuccessfully.
    #[error("Agent failed ({status}): {stderr}")]
    Exit { status: String, stderr: String },

    /// Waiting for the agent or reading its output failed.
    #[error("Failed to collect agent output")]
    Io(#[source] io::Error),

    /// The run was cancelled while the agent was running.
    #[error("Agent run was cancelled")]
    Cancelled,

    /// The agent exceeded the per-iteration time limit.
    #[error("Agent timed out after {minutes} minutes")]
    TimedOut { minutes: u32 },
}

impl AgentError {
    /// Creates an `Exit` error from a finished process.
    pub fn exit(status: ExitStatus, stderr: &[u8]) -> Self {
        Self::exit_with(status.to_string(), &String::from_utf8_lossy(stderr))
    }

    /// Creates an `Exit` error from a status description and stderr text.
    pub fn exit_with(status: impl Into<String>, stderr: &str) -> Self {
        let stderr = stderr.trim();
        Self::Exit {
            status: status.into(),
            stderr: if stderr.is_empty() {
                "no error output".to_string()
            } else {
                stderr.to_string()
            },
        }
    }

    /// Returns true if the invocation was cancelled rather than failing.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
