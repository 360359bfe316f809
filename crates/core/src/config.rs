//! Shell configuration and path utilities.
//!
//! This module defines the settings read from the YAML config file and the
//! functions that resolve the config and history paths, expanding `~`.

use serde::{Deserialize, Serialize};

/// Default path for the shell configuration file
const DEFAULT_CONFIG_PATH: &str = "~/.argline/config.yml";
/// Default path for the persisted history
const DEFAULT_HISTORY_PATH: &str = "~/.argline/history.yml";

/// Default prompt template; `{cwd}` and `{user}` are substituted.
pub const DEFAULT_PROMPT: &str = "{cwd}> ";
/// Default number of history entries kept.
pub const DEFAULT_HISTORY_SIZE: usize = 500;
/// Default interval between key polls while reading, in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// How the terminal behaves when a write ends exactly on the last column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WrapMode {
    /// The cursor moves to the start of the next row on its own.
    Eager,
    /// The cursor stays on the last column until more text or a newline arrives.
    #[default]
    Deferred,
}

/// Settings of the interactive shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Prompt template rendered before every read.
    pub prompt: String,
    /// Maximum number of history entries; `None` keeps everything.
    pub history_size: Option<usize>,
    pub poll_interval_ms: u64,
    pub wrap_mode: WrapMode,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT.to_string(),
            history_size: Some(DEFAULT_HISTORY_SIZE),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            wrap_mode: WrapMode::default(),
        }
    }
}

/// Resolves the configuration file path.
///
/// If a custom path is provided, uses that path. Otherwise, uses the default
/// configuration path. Shell expansions like `~` are resolved.
///
/// # Examples
///
/// ```
/// use argline_core::config::get_config_path;
///
/// let default_path = get_config_path(&None);
/// let custom_path = get_config_path(&Some("/path/to/config.yml".to_string()));
/// assert_eq!(custom_path, "/path/to/config.yml");
/// ```
#[must_use]
pub fn get_config_path(config_path_arg: &Option<String>) -> String {
    let config_path = match config_path_arg {
        Some(config_path) => config_path,
        None => DEFAULT_CONFIG_PATH,
    };

    shellexpand::tilde(config_path).to_string()
}

/// Resolves the history file path, the same way as [`get_config_path`].
#[must_use]
pub fn get_history_path(history_path_arg: &Option<String>) -> String {
    let history_path = match history_path_arg {
        Some(history_path) => history_path,
        None => DEFAULT_HISTORY_PATH,
    };

    shellexpand::tilde(history_path).to_string()
}

/// Expands `~` in a user-typed path.
#[must_use]
pub fn expand_path(path: &str) -> String {
    shellexpand::tilde(path).to_string()
}
