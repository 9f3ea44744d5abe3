//! Formatting functions for run output display.
//!
//! Pure functions returning strings; the controller decides whether to print
//! them (nothing is printed in quiet mode).

use colored::Colorize;
use std::fmt::Write;
use std::path::Path;

use crate::config::Settings;

/// Banner information for display at run start.
#[derive(Debug, Clone)]
pub(crate) struct BannerInfo {
    pub agent: String,
    pub model: String,
    pub max_iterations: u32,
    pub config_file: Option<String>,
    pub progress_log: String,
    pub branch: bool,
    pub tests: bool,
    pub pr: bool,
}

impl BannerInfo {
    pub fn new(settings: &Settings, agent: &str, progress_log: &Path) -> Self {
        Self {
            agent: agent.to_string(),
            model: settings.model.to_string(),
            max_iterations: settings.max_iterations,
            config_file: settings
                .config_file
                .as_ref()
                .map(|p| p.display().to_string()),
            progress_log: progress_log.display().to_string(),
            branch: settings.create_branch,
            tests: settings.run_tests,
            pr: settings.create_pr,
        }
    }
}

fn on_off(enabled: bool) -> colored::ColoredString {
    if enabled {
        "on".green()
    } else {
        "off".red()
    }
}

/// Formats the startup banner for display.
pub(crate) fn format_banner(info: &BannerInfo) -> String {
    let mut out = String::new();

    writeln!(&mut out, "\n{}", "━".repeat(50).dimmed()).unwrap();
    writeln!(&mut out, "{}", "   🔁 Gonzo Starting".yellow().bold()).unwrap();
    writeln!(&mut out, "{}", "━".repeat(50).dimmed()).unwrap();

    writeln!(&mut out, "  Agent:      {}", info.agent.cyan().bold()).unwrap();
    writeln!(&mut out, "  Model:      {}", info.model.cyan()).unwrap();
    writeln!(
        &mut out,
        "  Max:        {}",
        info.max_iterations.to_string().cyan()
    )
    .unwrap();
    writeln!(
        &mut out,
        "  Config:     {}",
        info.config_file.as_deref().unwrap_or("defaults").cyan()
    )
    .unwrap();
    writeln!(&mut out, "  Progress:   {}", info.progress_log.cyan()).unwrap();
    writeln!(
        &mut out,
        "  Branch: {}  Tests: {}  PR: {}",
        on_off(info.branch),
        on_off(info.tests),
        on_off(info.pr)
    )
    .unwrap();

    writeln!(&mut out, "{}", "━".repeat(50).dimmed()).unwrap();
    writeln!(&mut out, "\n  {} to stop\n", "Ctrl+C".dimmed()).unwrap();

    out
}

/// Formats the iteration header line.
pub(crate) fn format_iteration_header(iteration: u32, max: u32) -> String {
    format!(
        "\n{} Iteration {} of {} {}",
        "━".repeat(20).dimmed(),
        iteration.to_string().cyan().bold(),
        max,
        "━".repeat(20).dimmed()
    )
}

/// Formats the task completed message.
pub(crate) fn format_task_completed(iteration: u32, max: u32) -> String {
    format!(
        "\n{} Task completed at iteration {} of {}.",
        "✅".green(),
        iteration,
        max
    )
}

/// Formats the max iterations reached message.
pub(crate) fn format_max_iterations_reached(max: u32) -> String {
    format!(
        "\n{} Max iterations ({}) reached without completion signal.",
        "🛑".red(),
        max
    )
}
