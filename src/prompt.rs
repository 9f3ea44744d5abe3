//! System prompt rendering.
//!
//! The prompt is assembled from embedded sections so the instructions the
//! agent receives match the run's branch, test and PR toggles.

use crate::config::Settings;
use crate::detection::COMPLETION_MARKER;
use crate::progress::PROGRESS_FILE;
use crate::templates;

/// Renders the system prompt for a run. Same settings, same text.
pub(crate) fn render_system_prompt(settings: &Settings) -> String {
    let mut sections: Vec<String> = vec![templates::PROMPT_BASE.to_string()];

    if settings.create_branch {
        sections.push(templates::PROMPT_BRANCH.to_string());
    }
    if settings.run_tests {
        sections.push(templates::PROMPT_TESTS.to_string());
    }

    sections.push(
        templates::PROMPT_COMMIT.replace("{commit_author}", &settings.commit_author),
    );

    if settings.create_pr {
        sections.push(templates::PROMPT_PR.to_string());
    }

    sections.push(
        templates::PROMPT_COMPLETION
            .replace("{progress_file}", PROGRESS_FILE)
            .replace("{completion_marker}", COMPLETION_MARKER),
    );

    sections
        .iter()
        .map(|s| s.trim_end())
        .collect::<Vec<_>>()
        .join("\n\n")
        + "\n"
}
