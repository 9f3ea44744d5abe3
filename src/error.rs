//! Errors that end a gonzo run.
//!
//! Each variant names the setup phase or iteration where the run stopped.

use std::path::PathBuf;

use crate::agent::AgentError;
use crate::config::ConfigError;

/// Why a run ended without the completion marker.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// Configuration could not be resolved; nothing ran.
    #[error("Invalid configuration")]
    Config(#[from] ConfigError),

    /// The progress log could not be created; no iteration ran.
    #[error("Failed to prepare progress log: {}", path.display())]
    ProgressLog {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The agent failed to start or exited unsuccessfully.
    #[error("Agent call failed at iteration {iteration}")]
    Agent {
        iteration: u32,
        #[source]
        source: AgentError,
    },

    /// Every iteration ran without the completion marker.
    #[error("Reached max iterations ({iterations}) without completion signal")]
    Exhausted { iterations: u32 },

    /// The run was cancelled before completing.
    #[error("Run cancelled at iteration {iteration}")]
    Cancelled { iteration: u32 },
}

impl RunError {
    /// Iteration the run stopped at, if it got that far.
    pub fn iteration(&self) -> Option<u32> {
        match self {
            Self::Agent { iteration, .. } | Self::Cancelled { iteration } => Some(*iteration),
            Self::Exhausted { iterations } => Some(*iterations),
            Self::Config(_) | Self::ProgressLog { .. } => None,
        }
    }

    /// Short label used in structured logs.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Config(_) => "config_error",
            Self::ProgressLog { .. } => "progress_log_error",
            Self::Agent { .. } => "agent_error",
            Self::Exhausted { .. } => "max_iterations_reached",
            Self::Cancelled { .. } => "cancelled",
        }
    }
}
