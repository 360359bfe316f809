//! Reading and writing the shell's YAML files.
//!
//! Both files are optional: a missing config yields [`ShellConfig::default`]
//! and a missing history yields an empty list.

use std::fs::{self, File};
use std::path::Path;

use log::debug;

use crate::config::ShellConfig;
use crate::error::{Error, Result};

fn get_reader(file_description: &str, path: &str) -> Result<Option<File>> {
    if !Path::exists(Path::new(path)) {
        return Ok(None);
    }

    match File::open(path) {
        Ok(reader) => Ok(Some(reader)),
        Err(e) => Err(Error::io_error(
            file_description.to_string(),
            path.to_string(),
            e,
        )),
    }
}

fn get_writer(file_description: &str, path: &str) -> Result<File> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::io_error(file_description.to_string(), path.to_string(), e)
            })?;
        }
    }

    File::create(path)
        .map_err(|e| Error::io_error(file_description.to_string(), path.to_string(), e))
}

/// Loads the shell configuration, falling back to defaults if the file is absent.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or is not valid YAML
/// for [`ShellConfig`]. An empty file is treated as all defaults.
pub fn get_config(config_path: &str) -> Result<ShellConfig> {
    let Some(reader) = get_reader("config", config_path)? else {
        debug!("No config at `{config_path}`, using defaults");
        return Ok(ShellConfig::default());
    };

    let parsed: serde_yaml::Result<Option<ShellConfig>> = serde_yaml::from_reader(reader);

    match parsed {
        Ok(config) => Ok(config.unwrap_or_default()),
        Err(e) => Err(Error::yaml_error(
            "reading".to_string(),
            "config".to_string(),
            config_path.to_string(),
            e,
        )),
    }
}

/// Reads the persisted history, oldest entry first.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn get_history(history_path: &str) -> Result<Vec<String>> {
    let Some(reader) = get_reader("history", history_path)? else {
        return Ok(Vec::new());
    };

    let parsed: serde_yaml::Result<Option<Vec<String>>> = serde_yaml::from_reader(reader);

    match parsed {
        Ok(entries) => {
            let entries = entries.unwrap_or_default();
            debug!("Loaded {} history entries from `{history_path}`", entries.len());
            Ok(entries)
        }
        Err(e) => Err(Error::yaml_error(
            "reading".to_string(),
            "history".to_string(),
            history_path.to_string(),
            e,
        )),
    }
}

/// Writes the history, creating the parent directory if needed.
///
/// # Errors
///
/// Returns an error if the file cannot be created or serialization fails.
pub fn write_history(history_path: &str, entries: &[String]) -> Result<()> {
    let writer = get_writer("history", history_path)?;

    serde_yaml::to_writer(writer, entries).map_err(|e| {
        Error::yaml_error(
            "writing".to_string(),
            "history".to_string(),
            history_path.to_string(),
            e,
        )
    })
}
