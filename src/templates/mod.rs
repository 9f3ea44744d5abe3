//! Embedded templates for gonzo files and prompts.

/// Seed content for `.gonzo/progress.txt`.
///
/// Placeholders: `{started_at}`, `{branch_mode}`.
pub(crate) const PROGRESS_TXT: &str = include_str!("progress.txt");

/// Opening of the system prompt: role and working loop.
pub(crate) const PROMPT_BASE: &str = include_str!("prompt_base.md");

/// Branch instructions, included when branch creation is enabled.
pub(crate) const PROMPT_BRANCH: &str = include_str!("prompt_branch.md");

/// Test instructions, included when test execution is enabled.
pub(crate) const PROMPT_TESTS: &str = include_str!("prompt_tests.md");

/// Pull request instructions, included when PR creation is enabled.
pub(crate) const PROMPT_PR: &str = include_str!("prompt_pr.md");

/// Commit instructions. Placeholder: `{commit_author}`.
pub(crate) const PROMPT_COMMIT: &str = include_str!("prompt_commit.md");

/// Closing of the system prompt: progress log and completion signal.
///
/// Placeholders: `{progress_file}`, `{completion_marker}`.
pub(crate) const PROMPT_COMPLETION: &str = include_str!("prompt_completion.md");
