use anyhow::{Context, Result};
use clap::{ArgAction, CommandFactory, Parser};
use std::io::IsTerminal;
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod agent;
mod config;
mod controller;
mod detection;
mod error;
mod progress;
mod prompt;
mod task;
mod templates;

use config::{ConfigLayer, Model, Settings};
use error::RunError;

#[derive(Parser)]
#[command(name = "gonzo")]
#[command(
    author,
    version,
    about = "Run a coding agent in a loop until it promises the task is complete",
    long_about = "Run a coding agent in a loop until it promises the task is complete.\n\n\
                  The task is taken from the arguments, from a file named by the only \
                  argument, or from piped standard input.\n\n\
                  Every option can also be set with a GONZO_* environment variable \
                  (e.g. GONZO_MAX_ITERATIONS) or in gonzo.yaml in the current \
                  directory, the user config directory, or the home directory."
)]
#[command(disable_version_flag = true)]
struct Cli {
    /// Task description, or the path of a file containing it
    #[arg(value_name = "TASK")]
    task: Vec<String>,

    /// Model: fast (haiku), balanced (sonnet), best (opus) [default: best]
    #[arg(short, long)]
    model: Option<Model>,

    /// Maximum number of agent iterations [default: 10]
    #[arg(short = 'n', long)]
    max_iterations: Option<u32>,

    /// Only print the final agent output [default: false]
    #[arg(short, long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    quiet: Option<bool>,

    /// Have the agent work on a feature branch [default: true]
    #[arg(short, long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    branch: Option<bool>,

    /// Have the agent run tests before committing [default: true]
    #[arg(short, long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    tests: Option<bool>,

    /// Have the agent open a pull request when done [default: false]
    #[arg(short, long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pr: Option<bool>,

    /// Author for the agent's commits, "Name <email>" [default: Gonzo <gonzo@localhost>]
    #[arg(short = 'a', long)]
    commit_author: Option<String>,

    /// Command used to run the agent [default: claude]
    #[arg(long)]
    agent_command: Option<String>,

    /// Time limit per iteration in minutes, 0 for none [default: 0]
    #[arg(long)]
    timeout_minutes: Option<u32>,

    /// Enable verbose logging
    #[arg(long)]
    verbose: bool,

    /// Print version
    #[arg(short = 'v', long, action = ArgAction::Version)]
    version: (),
}

impl Cli {
    /// Options given explicitly on the command line.
    fn config_layer(&self) -> ConfigLayer {
        ConfigLayer {
            model: self.model,
            max_iterations: self.max_iterations,
            quiet: self.quiet,
            branch: self.branch,
            tests: self.tests,
            pr: self.pr,
            commit_author: self.commit_author.clone(),
            agent_command: self.agent_command.clone(),
            timeout_minutes: self.timeout_minutes,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; console progress goes to stdout, logs to stderr
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("gonzo=debug")
        } else {
            EnvFilter::new("gonzo=warn")
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let stdin = std::io::stdin();
    let piped = (!stdin.is_terminal()).then(|| stdin.lock());
    let Some(task) = task::resolve_task(&cli.task, piped).context("Failed to read task")? else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    let settings = Settings::load(cli.config_layer(), &cwd)
        .map_err(RunError::from)
        .inspect_err(|e| error!(reason = e.reason(), error = %e))
        .context("Failed to load configuration")?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping agent");
            on_interrupt.cancel();
        }
    });

    let summary = controller::run(settings, &task, &cwd, &cancel).await?;
    println!("{}", summary.output);

    Ok(())
}
