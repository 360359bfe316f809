use std::fmt::{Display, Formatter};

use leon::{ParseError, RenderError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// A token that matched no descriptor and was not absorbed by a variadic one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnparsedToken {
    pub token: String,
    pub value: Option<String>,
}

impl Display for UnparsedToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{} {}", self.token, value),
            None => f.write_str(&self.token),
        }
    }
}

/// A literal that could not be converted to its descriptor's value kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionFailure {
    pub name: String,
    pub literal: String,
    pub reason: String,
}

impl Display for ConversionFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "`{}` for {}: {}", self.literal, self.name, self.reason)
    }
}

fn list_unparsed(tokens: &[UnparsedToken]) -> String {
    tokens
        .iter()
        .map(|token| format!("\n    {token}"))
        .collect()
}

fn list_conversions(failures: &[ConversionFailure]) -> String {
    failures
        .iter()
        .map(|failure| format!("\n    {failure}"))
        .collect()
}

fn suggestion_suffix(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(suggestion) => format!(" (did you mean `{suggestion}`?)"),
        None => String::new(),
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unresolved arguments were given:{}", list_unparsed(.0))]
    UnresolvedTokens(Vec<UnparsedToken>),

    #[error("No value was given for `{}`.", .name)]
    MissingExplicitValue { name: String },

    #[error("Required argument `{}` is missing.", .name)]
    MissingRequired { name: String },

    #[error("Invalid use of `{}`: {}", .name, .reason)]
    TriggerValidationFailed { name: String, reason: String },

    #[error("Could not convert argument values:{}", list_conversions(.0))]
    Conversion(Vec<ConversionFailure>),

    #[error("Read was cancelled.")]
    ReadCancelled,

    #[error("The prompt can only be changed while a read is in progress.")]
    NotReading,

    #[error("STDIO error: {}", .0)]
    Stdio(#[from] std::io::Error),

    #[error("Found a non-unique descriptor name: `{}`", .0)]
    DuplicateName(String),

    #[error("Switch pattern `{}` is used by both `{}` and `{}`", .pattern, .first, .second)]
    DuplicatePattern {
        pattern: String,
        first: String,
        second: String,
    },

    #[error("Only one variadic descriptor is allowed, found `{}` and `{}`", .0, .1)]
    MultipleVariadic(String, String),

    #[error("Invalid descriptor `{}`: {}", .0, .1)]
    InvalidDescriptor(String, String),

    #[error("Descriptor `{}` has a trigger on unknown descriptor `{}`", .0, .1)]
    UnknownTriggerTarget(String, String),

    #[error("Unknown command: `{}`{}", .name, suggestion_suffix(.suggestion))]
    UnknownCommand {
        name: String,
        suggestion: Option<String>,
    },

    #[error("Error {} {} file at `{}`: {}", .action, .file_description, .path, .original)]
    Yaml {
        action: String,
        file_description: String,
        path: String,
        original: serde_yaml::Error,
    },

    #[error("IO error with {} file at path `{}`: {}", .file_description, .path, .original)]
    Io {
        file_description: String,
        path: String,
        original: std::io::Error,
    },

    #[error("Error parsing prompt template: {}", .0)]
    Parse(#[from] ParseError),

    #[error("Error rendering prompt template: {}", .0)]
    Render(#[from] RenderError),
}

impl Error {
    pub fn yaml_error(
        action: String,
        file_description: String,
        path: String,
        original: serde_yaml::Error,
    ) -> Self {
        Self::Yaml {
            action,
            file_description,
            path,
            original,
        }
    }

    pub fn io_error(file_description: String, path: String, original: std::io::Error) -> Self {
        Self::Io {
            file_description,
            path,
            original,
        }
    }

    /// Whether this error came out of argument resolution, as opposed to IO or setup.
    #[must_use]
    pub fn is_resolution_error(&self) -> bool {
        matches!(
            self,
            Self::UnresolvedTokens(_)
                | Self::MissingExplicitValue { .. }
                | Self::MissingRequired { .. }
                | Self::TriggerValidationFailed { .. }
                | Self::Conversion(_)
        )
    }
}
