//! Progress log bootstrap.
//!
//! The agent keeps notes across iterations in `.gonzo/progress.txt`. The log
//! is seeded once per project and never touched again by gonzo.

use chrono::{DateTime, SecondsFormat, Utc};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::Settings;
use crate::templates;

/// Directory holding gonzo's run-local files.
pub(crate) const GONZO_DIR: &str = ".gonzo";

/// Progress log path relative to the project directory.
pub(crate) const PROGRESS_FILE: &str = ".gonzo/progress.txt";

/// Whether the progress log was created by this call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProgressLog {
    /// Seeded from the template.
    Created,
    /// Already present and left untouched.
    Existing,
}

/// Ensures the progress log exists under `project_dir`.
///
/// Returns the path together with what happened. An existing file is never
/// modified.
pub(crate) fn ensure_progress_log(
    project_dir: &Path,
    settings: &Settings,
) -> io::Result<(PathBuf, ProgressLog)> {
    ensure_progress_log_at(project_dir, settings, Utc::now())
}

fn ensure_progress_log_at(
    project_dir: &Path,
    settings: &Settings,
    now: DateTime<Utc>,
) -> io::Result<(PathBuf, ProgressLog)> {
    let path = project_dir.join(PROGRESS_FILE);

    if path.exists() {
        debug!("Progress log already exists: {}", path.display());
        return Ok((path, ProgressLog::Existing));
    }

    fs::create_dir_all(project_dir.join(GONZO_DIR))?;

    // create_new so a file that appeared since the check is left alone
    let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            return Ok((path, ProgressLog::Existing));
        }
        Err(e) => return Err(e),
    };
    file.write_all(render_progress_header(settings, now).as_bytes())?;
    file.flush()?;

    info!("Created progress log: {}", path.display());
    Ok((path, ProgressLog::Created))
}

/// Renders the seed content of a new progress log.
fn render_progress_header(settings: &Settings, now: DateTime<Utc>) -> String {
    let branch_mode = if settings.create_branch {
        "enabled"
    } else {
        "disabled"
    };

    templates::PROGRESS_TXT
        .replace(
            "{started_at}",
            &now.to_rfc3339_opts(SecondsFormat::Secs, true),
        )
        .replace("{branch_mode}", branch_mode)
}
