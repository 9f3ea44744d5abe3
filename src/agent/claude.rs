//! Claude Code agent.
//!
//! Invokes the Claude CLI in print mode:
//! ```bash
//! claude --dangerously-skip-permissions --print --model claude-opus-4-5 \
//!     --system-prompt "<instructions>" "<task>"
//! ```
//!
//! Standard output is the result. See: https://docs.anthropic.com/en/docs/claude-code

use async_trait::async_trait;
use std::io;
use std::process::Stdio;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{AgentError, AgentInvoker, AgentRequest};
use crate::config::DEFAULT_AGENT_COMMAND;

/// Claude Code CLI agent
pub(crate) struct ClaudeAgent {
    program: String,
    /// Arguments placed before gonzo's own flags (e.g. `npx` package names).
    leading_args: Vec<String>,
}

impl ClaudeAgent {
    /// Creates an agent from a command split into words: program first.
    pub fn from_command(command: &[String]) -> Self {
        match command.split_first() {
            Some((program, args)) => Self {
                program: program.clone(),
                leading_args: args.to_vec(),
            },
            None => Self {
                program: DEFAULT_AGENT_COMMAND.to_string(),
                leading_args: Vec::new(),
            },
        }
    }

    /// Full argument list for one invocation, in the order the CLI expects.
    fn build_args(&self, request: &AgentRequest<'_>) -> Vec<String> {
        let mut args = self.leading_args.clone();
        args.extend([
            "--dangerously-skip-permissions".to_string(),
            "--print".to_string(),
            "--model".to_string(),
            request.model.id().to_string(),
            "--system-prompt".to_string(),
            request.system_prompt.to_string(),
            request.task.to_string(),
        ]);
        args
    }
}

#[async_trait]
impl AgentInvoker for ClaudeAgent {
    fn name(&self) -> &'static str {
        "Claude"
    }

    async fn invoke(
        &self,
        request: &AgentRequest<'_>,
        cancel: &CancellationToken,
    ) -> Result<String, AgentError> {
        info!("Running Claude agent: {}", self.program);
        debug!("Project dir: {}", request.project_dir.display());

        let args = self.build_args(request);
        debug!(
            "Claude args: {} leading, model {}, task {} bytes",
            self.leading_args.len(),
            request.model.id(),
            request.task.len()
        );

        let child = tokio::process::Command::new(&self.program)
            .current_dir(request.project_dir)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| {
                if source.kind() == io::ErrorKind::NotFound {
                    AgentError::NotFound {
                        program: self.program.clone(),
                    }
                } else {
                    AgentError::Spawn {
                        program: self.program.clone(),
                        source,
                    }
                }
            })?;

        // Dropping the child on cancellation kills it (kill_on_drop)
        let output = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                warn!("Cancellation requested, stopping Claude agent");
                return Err(AgentError::Cancelled);
            }
            result = child.wait_with_output() => result.map_err(AgentError::Io)?,
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!("Agent stderr: {}", stderr);
            return Err(AgentError::exit(output.status, &output.stderr));
        }

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        info!("Claude agent completed successfully");
        debug!("Output length: {} bytes", stdout.len());

        Ok(stdout)
    }
}
