use std::fs;
use std::path::Path;
use std::sync::Arc;

use argline_core::completion::{complete, ValueCompleter};
use argline_core::config::expand_path;
use argline_core::descriptor::Descriptor;
use argline_core::tokenizer::unquote;
use argline_core::value::ValueKind;
use log::debug;

use super::CommandRegistry;
use crate::line_editor::Completer;

/// Offers file-system entries for string values.
///
/// The directory part of the fragment, if any, is listed and kept as a prefix
/// of every candidate; directories get a trailing `/`.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileSystemValues;

impl ValueCompleter for FileSystemValues {
    fn complete(&self, descriptor: Option<&Descriptor>, fragment: &str) -> Vec<String> {
        if !descriptor.is_some_and(|descriptor| descriptor.kind() == ValueKind::Str) {
            return Vec::new();
        }

        let (prefix, dir) = match fragment.rfind('/') {
            Some(i) => (&fragment[..=i], expand_path(&fragment[..=i])),
            None => ("", ".".to_string()),
        };

        let entries = match fs::read_dir(Path::new(&dir)) {
            Ok(entries) => entries,
            Err(e) => {
                debug!("Cannot list `{dir}` for completion: {e}");
                return Vec::new();
            }
        };

        entries
            .filter_map(std::result::Result::ok)
            .map(|entry| {
                let suffix = if entry.file_type().is_ok_and(|kind| kind.is_dir()) {
                    "/"
                } else {
                    ""
                };
                format!("{prefix}{}{suffix}", entry.file_name().to_string_lossy())
            })
            .collect()
    }
}

/// Completes command names for the first token and the command's arguments
/// after it.
pub struct ShellCompleter {
    registry: Arc<CommandRegistry>,
}

impl ShellCompleter {
    #[must_use]
    pub fn new(registry: Arc<CommandRegistry>) -> Self {
        Self { registry }
    }
}

impl Completer for ShellCompleter {
    fn complete(&self, context: &[String], fragment: &str) -> Vec<String> {
        let Some((name, arguments)) = context.split_first() else {
            return self.registry.names().map(ToString::to_string).collect();
        };

        match self.registry.get(&unquote(name)) {
            Some(command) => complete(command.catalog(), arguments, fragment, &FileSystemValues),
            None => Vec::new(),
        }
    }
}
