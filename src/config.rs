//! Layered run configuration.
//!
//! Each option is resolved on its own, highest precedence first:
//! 1. Command-line flag
//! 2. `GONZO_*` environment variable
//! 3. `gonzo.yaml` in the current dir, the user config dir, or the home dir
//! 4. Built-in default
//!
//! The result is an immutable [`Settings`] value built once per run.

use serde::{de, Deserialize, Deserializer};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

/// Prefix for environment variables (`GONZO_MAX_ITERATIONS`, ...).
pub(crate) const ENV_PREFIX: &str = "GONZO";

/// Config file basenames, checked in order within each search directory.
const CONFIG_FILE_NAMES: [&str; 2] = ["gonzo.yaml", "gonzo.yml"];

pub(crate) const KEY_MODEL: &str = "model";
pub(crate) const KEY_MAX_ITERATIONS: &str = "max-iterations";
pub(crate) const KEY_QUIET: &str = "quiet";
pub(crate) const KEY_BRANCH: &str = "branch";
pub(crate) const KEY_TESTS: &str = "tests";
pub(crate) const KEY_PR: &str = "pr";
pub(crate) const KEY_COMMIT_AUTHOR: &str = "commit-author";
pub(crate) const KEY_AGENT_COMMAND: &str = "agent-command";
pub(crate) const KEY_TIMEOUT_MINUTES: &str = "timeout-minutes";

pub(crate) const DEFAULT_MAX_ITERATIONS: u32 = 10;
pub(crate) const DEFAULT_QUIET: bool = false;
pub(crate) const DEFAULT_BRANCH: bool = true;
pub(crate) const DEFAULT_TESTS: bool = true;
pub(crate) const DEFAULT_PR: bool = false;
pub(crate) const DEFAULT_COMMIT_AUTHOR: &str = "Gonzo <gonzo@localhost>";
pub(crate) const DEFAULT_AGENT_COMMAND: &str = "claude";
pub(crate) const DEFAULT_TIMEOUT_MINUTES: u32 = 0;

// -----------------------------------------------------------------------------
// Errors
// -----------------------------------------------------------------------------

/// Errors raised while resolving configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("Failed to read config file: {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file exists but is not valid YAML for the known options.
    #[error("Failed to parse config file: {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A flag, environment or file value has the wrong shape for its option.
    #[error("Invalid value '{value}' for {origin}: {reason}")]
    InvalidValue {
        origin: String,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    fn invalid(origin: &str, value: &str, reason: impl fmt::Display) -> Self {
        Self::InvalidValue {
            origin: origin.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

// -----------------------------------------------------------------------------
// Model
// -----------------------------------------------------------------------------

/// Model tier passed to the agent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum Model {
    /// Cheapest and quickest tier.
    Fast,
    /// Middle tier.
    Balanced,
    /// Most capable tier.
    #[default]
    Best,
}

impl Model {
    /// Identifier understood by the agent's `--model` flag.
    pub fn id(self) -> &'static str {
        match self {
            Self::Fast => "claude-haiku-4-5",
            Self::Balanced => "claude-sonnet-4-5",
            Self::Best => "claude-opus-4-5",
        }
    }

    fn tier(self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Balanced => "balanced",
            Self::Best => "best",
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.tier(), self.id())
    }
}

/// Returned when a model name matches no tier.
#[derive(Debug, thiserror::Error)]
#[error(
    "Unknown model: '{0}'. Supported: fast (claude-haiku-4-5), \
     balanced (claude-sonnet-4-5), best (claude-opus-4-5)"
)]
pub struct ParseModelError(String);

impl FromStr for Model {
    type Err = ParseModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fast" | "haiku" | "claude-haiku-4-5" => Ok(Self::Fast),
            "balanced" | "sonnet" | "claude-sonnet-4-5" => Ok(Self::Balanced),
            "best" | "opus" | "claude-opus-4-5" => Ok(Self::Best),
            _ => Err(ParseModelError(s.to_string())),
        }
    }
}

impl TryFrom<String> for Model {
    type Error = ParseModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// -----------------------------------------------------------------------------
// Layers
// -----------------------------------------------------------------------------

/// One source of configuration. Unset options are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) struct ConfigLayer {
    pub model: Option<Model>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub max_iterations: Option<u32>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub quiet: Option<bool>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub branch: Option<bool>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub tests: Option<bool>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub pr: Option<bool>,
    pub commit_author: Option<String>,
    pub agent_command: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub timeout_minutes: Option<u32>,
}

impl ConfigLayer {
    /// Reads the `GONZO_*` variables of the current process.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with(|name| std::env::var(name).ok())
    }

    /// Reads environment values through `lookup`.
    ///
    /// Empty values count as unset.
    pub fn from_env_with<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            let name = env_var_name(key);
            lookup(&name)
                .filter(|value| !value.trim().is_empty())
                .map(|value| (name, value))
        };

        Ok(Self {
            model: get(KEY_MODEL)
                .map(|(name, value)| parse_value(&name, &value))
                .transpose()?,
            max_iterations: get(KEY_MAX_ITERATIONS)
                .map(|(name, value)| parse_value(&name, &value))
                .transpose()?,
            quiet: get(KEY_QUIET)
                .map(|(name, value)| parse_bool(&name, &value))
                .transpose()?,
            branch: get(KEY_BRANCH)
                .map(|(name, value)| parse_bool(&name, &value))
                .transpose()?,
            tests: get(KEY_TESTS)
                .map(|(name, value)| parse_bool(&name, &value))
                .transpose()?,
            pr: get(KEY_PR)
                .map(|(name, value)| parse_bool(&name, &value))
                .transpose()?,
            commit_author: get(KEY_COMMIT_AUTHOR).map(|(_, value)| value),
            agent_command: get(KEY_AGENT_COMMAND).map(|(_, value)| value),
            timeout_minutes: get(KEY_TIMEOUT_MINUTES)
                .map(|(name, value)| parse_value(&name, &value))
                .transpose()?,
        })
    }

    /// Fills every option unset in `self` from `lower`.
    pub fn over(self, lower: Self) -> Self {
        Self {
            model: self.model.or(lower.model),
            max_iterations: self.max_iterations.or(lower.max_iterations),
            quiet: self.quiet.or(lower.quiet),
            branch: self.branch.or(lower.branch),
            tests: self.tests.or(lower.tests),
            pr: self.pr.or(lower.pr),
            commit_author: self.commit_author.or(lower.commit_author),
            agent_command: self.agent_command.or(lower.agent_command),
            timeout_minutes: self.timeout_minutes.or(lower.timeout_minutes),
        }
    }
}

/// Environment variable name for a config key: `max-iterations` -> `GONZO_MAX_ITERATIONS`.
pub(crate) fn env_var_name(key: &str) -> String {
    format!("{ENV_PREFIX}_{}", key.to_uppercase().replace('-', "_"))
}

fn parse_value<T>(origin: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| ConfigError::invalid(origin, value, e))
}

fn parse_bool(origin: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "t" | "1" | "yes" | "on" => Ok(true),
        "false" | "f" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::invalid(origin, value, "expected true or false")),
    }
}

/// A file value written either as a native YAML scalar or as a string.
///
/// Strings are coerced like environment values.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar<T> {
    Native(T),
    Text(String),
}

/// Origin named in errors for quoted config file values.
const FILE_ORIGIN: &str = "config file";

fn lenient_number<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
    T::Err: fmt::Display,
{
    match Option::<Scalar<T>>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Scalar::Native(value)) => Ok(Some(value)),
        Some(Scalar::Text(text)) => parse_value(FILE_ORIGIN, &text)
            .map(Some)
            .map_err(de::Error::custom),
    }
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Scalar<bool>>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Scalar::Native(value)) => Ok(Some(value)),
        Some(Scalar::Text(text)) => parse_bool(FILE_ORIGIN, &text)
            .map(Some)
            .map_err(de::Error::custom),
    }
}

// -----------------------------------------------------------------------------
// Config file
// -----------------------------------------------------------------------------

/// A config file that was found and parsed.
#[derive(Debug, Clone)]
pub(crate) struct ConfigFile {
    pub path: PathBuf,
    pub layer: ConfigLayer,
}

impl ConfigFile {
    /// Loads the first config file found in `search_dirs`.
    ///
    /// Finding no file is not an error.
    pub fn discover(search_dirs: &[PathBuf]) -> Result<Option<Self>, ConfigError> {
        for dir in search_dirs {
            for name in CONFIG_FILE_NAMES {
                let path = dir.join(name);
                if path.is_file() {
                    debug!("Using config file: {}", path.display());
                    return Self::load(&path).map(Some);
                }
            }
        }
        debug!("No config file found");
        Ok(None)
    }

    /// Loads and parses a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let parse_error = |source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        };

        // Empty and comment-only documents parse as null
        let value: serde_yaml::Value = serde_yaml::from_str(&content).map_err(parse_error)?;
        let layer = if value.is_null() {
            ConfigLayer::default()
        } else {
            serde_yaml::from_value(value).map_err(parse_error)?
        };

        Ok(Self {
            path: path.to_path_buf(),
            layer,
        })
    }
}

/// Directories searched for a config file, in order.
pub(crate) fn config_search_dirs(cwd: &Path) -> Vec<PathBuf> {
    let mut search = vec![cwd.to_path_buf()];
    if let Some(config_dir) = dirs::config_dir() {
        search.push(config_dir.join("gonzo"));
    }
    if let Some(home) = dirs::home_dir() {
        search.push(home);
    }
    search
}

// -----------------------------------------------------------------------------
// Settings
// -----------------------------------------------------------------------------

/// Effective settings for one run. Never modified after resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Settings {
    pub model: Model,
    pub max_iterations: u32,
    pub quiet: bool,
    pub create_branch: bool,
    pub run_tests: bool,
    pub create_pr: bool,
    pub commit_author: String,
    /// Agent program followed by any leading arguments.
    pub agent_command: Vec<String>,
    /// Per-invocation limit; 0 means none.
    pub timeout_minutes: u32,
    /// Config file the settings were read from, if any.
    pub config_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model: Model::default(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            quiet: DEFAULT_QUIET,
            create_branch: DEFAULT_BRANCH,
            run_tests: DEFAULT_TESTS,
            create_pr: DEFAULT_PR,
            commit_author: DEFAULT_COMMIT_AUTHOR.to_string(),
            agent_command: vec![DEFAULT_AGENT_COMMAND.to_string()],
            timeout_minutes: DEFAULT_TIMEOUT_MINUTES,
            config_file: None,
        }
    }
}

impl Settings {
    /// Resolves settings for a run in `cwd` from flags, the process environment
    /// and the first config file found.
    pub fn load(flags: ConfigLayer, cwd: &Path) -> Result<Self, ConfigError> {
        let env = ConfigLayer::from_env()?;
        let file = ConfigFile::discover(&config_search_dirs(cwd))?;
        Self::resolve(flags, env, file)
    }

    /// Merges the layers and applies defaults.
    pub fn resolve(
        flags: ConfigLayer,
        env: ConfigLayer,
        file: Option<ConfigFile>,
    ) -> Result<Self, ConfigError> {
        let (file_layer, config_file) = match file {
            Some(file) => (file.layer, Some(file.path)),
            None => (ConfigLayer::default(), None),
        };
        let merged = flags.over(env).over(file_layer);

        let max_iterations = merged.max_iterations.unwrap_or(DEFAULT_MAX_ITERATIONS);
        if max_iterations == 0 {
            return Err(ConfigError::invalid(
                KEY_MAX_ITERATIONS,
                "0",
                "must be at least 1",
            ));
        }

        let agent_command = match merged.agent_command {
            Some(command) => {
                let words = shell_words::split(&command)
                    .map_err(|e| ConfigError::invalid(KEY_AGENT_COMMAND, &command, e))?;
                if words.is_empty() {
                    return Err(ConfigError::invalid(
                        KEY_AGENT_COMMAND,
                        &command,
                        "command cannot be empty",
                    ));
                }
                words
            }
            None => vec![DEFAULT_AGENT_COMMAND.to_string()],
        };

        Ok(Self {
            model: merged.model.unwrap_or_default(),
            max_iterations,
            quiet: merged.quiet.unwrap_or(DEFAULT_QUIET),
            create_branch: merged.branch.unwrap_or(DEFAULT_BRANCH),
            run_tests: merged.tests.unwrap_or(DEFAULT_TESTS),
            create_pr: merged.pr.unwrap_or(DEFAULT_PR),
            commit_author: merged
                .commit_author
                .unwrap_or_else(|| DEFAULT_COMMIT_AUTHOR.to_string()),
            agent_command,
            timeout_minutes: merged.timeout_minutes.unwrap_or(DEFAULT_TIMEOUT_MINUTES),
            config_file,
        })
    }
}
