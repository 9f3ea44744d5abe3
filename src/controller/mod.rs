//! The iteration controller.
//!
//! Runs the agent with the same system prompt and task until an output
//! contains the completion marker, the iteration budget is spent, the agent
//! fails, or the run is cancelled. Iterations are strictly sequential and
//! nothing is carried between them: the agent keeps its own state in the
//! working tree and the progress log.
//!
//! - `format`: console output for the run

mod format;

use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::agent::{AgentError, AgentInvoker, AgentRequest, ClaudeAgent};
use crate::config::Settings;
use crate::detection::is_complete;
use crate::error::RunError;
use crate::progress::{ensure_progress_log, ProgressLog, PROGRESS_FILE};
use crate::prompt::render_system_prompt;

use format::{
    format_banner, format_iteration_header, format_max_iterations_reached,
    format_task_completed, BannerInfo,
};

// -----------------------------------------------------------------------------
// Public types
// -----------------------------------------------------------------------------

/// Successful end of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RunSummary {
    /// Output of the iteration that printed the completion marker.
    pub output: String,
    /// Number of agent invocations performed.
    pub iterations_used: u32,
}

/// One pass through the loop. Only the last one outlives the loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct IterationRecord {
    pub iteration: u32,
    pub output: String,
    pub complete: bool,
}

impl IterationRecord {
    fn new(iteration: u32, output: String) -> Self {
        let complete = is_complete(&output);
        Self {
            iteration,
            output,
            complete,
        }
    }
}

/// Controller state. `Completed`, `Exhausted` and `Failed` are terminal.
#[derive(Debug)]
enum LoopState {
    Running(u32),
    Completed(IterationRecord),
    Exhausted(u32),
    Failed(RunError),
}

/// Decides where the loop goes after a successful invocation.
fn next_state(record: IterationRecord, max_iterations: u32) -> LoopState {
    if record.complete {
        LoopState::Completed(record)
    } else if record.iteration < max_iterations {
        LoopState::Running(record.iteration + 1)
    } else {
        LoopState::Exhausted(max_iterations)
    }
}

// -----------------------------------------------------------------------------
// Controller
// -----------------------------------------------------------------------------

/// Drives one run of the agent loop.
pub(crate) struct Controller {
    agent: Box<dyn AgentInvoker>,
    settings: Settings,
    system_prompt: String,
    project_dir: PathBuf,
}

impl Controller {
    pub fn new(
        agent: Box<dyn AgentInvoker>,
        settings: Settings,
        system_prompt: String,
        project_dir: PathBuf,
    ) -> Self {
        Self {
            agent,
            settings,
            system_prompt,
            project_dir,
        }
    }

    /// Runs iterations until completion, exhaustion, failure or cancellation.
    ///
    /// Returns the output of the completing iteration. Agent failures are not
    /// retried.
    pub async fn generate(
        &self,
        task: &str,
        cancel: &CancellationToken,
    ) -> Result<RunSummary, RunError> {
        let max = self.settings.max_iterations;

        tracing::info!(
            event = "loop_start",
            agent = self.agent.name(),
            model = self.settings.model.id(),
            max_iterations = max,
        );

        let mut state = LoopState::Running(1);
        loop {
            state = match state {
                LoopState::Running(iteration) => self.step(iteration, task, cancel).await,
                LoopState::Completed(record) => {
                    self.say(&format_task_completed(record.iteration, max));
                    tracing::info!(
                        event = "loop_end",
                        total_iterations = record.iteration,
                        reason = "completed",
                    );
                    return Ok(RunSummary {
                        output: record.output,
                        iterations_used: record.iteration,
                    });
                }
                LoopState::Exhausted(iterations) => {
                    self.say(&format_max_iterations_reached(iterations));
                    let err = RunError::Exhausted { iterations };
                    tracing::info!(
                        event = "loop_end",
                        total_iterations = iterations,
                        reason = err.reason(),
                    );
                    return Err(err);
                }
                LoopState::Failed(err) => {
                    tracing::error!(
                        event = "loop_end",
                        total_iterations = err.iteration(),
                        reason = err.reason(),
                        error = %err,
                    );
                    return Err(err);
                }
            };
        }
    }

    /// Runs a single iteration from the `Running` state.
    async fn step(&self, iteration: u32, task: &str, cancel: &CancellationToken) -> LoopState {
        if cancel.is_cancelled() {
            return LoopState::Failed(RunError::Cancelled { iteration });
        }

        let max = self.settings.max_iterations;
        self.say(&format_iteration_header(iteration, max));
        tracing::info!(event = "iteration_start", iteration, max_iterations = max);

        let output = match self.invoke(task, cancel).await {
            Ok(output) => output,
            Err(e) if e.is_cancelled() => {
                warn!("Run cancelled during iteration {}", iteration);
                return LoopState::Failed(RunError::Cancelled { iteration });
            }
            Err(source) => {
                return LoopState::Failed(RunError::Agent { iteration, source });
            }
        };

        let record = IterationRecord::new(iteration, output);
        tracing::info!(
            event = "iteration_complete",
            iteration,
            complete = record.complete,
            output_bytes = record.output.len(),
        );

        if !record.complete {
            debug!("No completion signal in iteration {}", iteration);
        }
        next_state(record, max)
    }

    /// One agent call, bounded by the per-iteration timeout when set.
    async fn invoke(&self, task: &str, cancel: &CancellationToken) -> Result<String, AgentError> {
        let request = AgentRequest {
            project_dir: &self.project_dir,
            system_prompt: &self.system_prompt,
            model: self.settings.model,
            task,
        };

        let minutes = self.settings.timeout_minutes;
        if minutes == 0 {
            return self.agent.invoke(&request, cancel).await;
        }

        // Dropping the invocation on timeout kills the agent process
        let limit = Duration::from_secs(u64::from(minutes) * 60);
        tokio::time::timeout(limit, self.agent.invoke(&request, cancel))
            .await
            .unwrap_or(Err(AgentError::TimedOut { minutes }))
    }

    fn say(&self, message: &str) {
        if !self.settings.quiet {
            println!("{message}");
        }
    }
}

// -----------------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------------

/// Runs the whole pipeline for one task: render the system prompt, ensure
/// the progress log, then loop the Claude agent.
pub(crate) async fn run(
    settings: Settings,
    task: &str,
    project_dir: &Path,
    cancel: &CancellationToken,
) -> Result<RunSummary, RunError> {
    let agent = ClaudeAgent::from_command(&settings.agent_command);
    run_with_agent(Box::new(agent), settings, task, project_dir, cancel).await
}

async fn run_with_agent(
    agent: Box<dyn AgentInvoker>,
    settings: Settings,
    task: &str,
    project_dir: &Path,
    cancel: &CancellationToken,
) -> Result<RunSummary, RunError> {
    let system_prompt = render_system_prompt(&settings);

    let (progress_path, outcome) =
        ensure_progress_log(project_dir, &settings).map_err(|source| RunError::ProgressLog {
            path: project_dir.join(PROGRESS_FILE),
            source,
        })?;
    if outcome == ProgressLog::Existing {
        info!("Continuing with existing progress log");
    }

    if !settings.quiet {
        let banner = BannerInfo::new(&settings, agent.name(), &progress_path);
        print!("{}", format_banner(&banner));
    }

    let controller = Controller::new(agent, settings, system_prompt, project_dir.to_path_buf());
    let result = controller.generate(task, cancel).await;
    result
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
