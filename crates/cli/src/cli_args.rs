//! Command-line argument parsing.
//!
//! This module defines the command-line interface of the `argl` binary using
//! the `clap` crate.

use clap::Parser;

/// Command-line arguments for the argline shell.
///
/// # Examples
///
/// ```rust
/// use clap::Parser;
/// use argline_cli::cli_args::Args;
///
/// let args = Args::parse_from(["argl", "--skip-history-save"]);
/// assert!(args.skip_history_save);
/// ```
#[derive(Parser, Debug)] // requires `derive` feature
#[command(term_width = 0)] // Just to make testing across clap features easier
pub struct Args {
    /// Path to the shell config file YAML.
    ///
    /// If not provided, defaults to `~/.argline/config.yml`.
    #[arg(long, short = 'c')]
    pub config_path: Option<String>,

    /// Path to the file that stores the line history.
    ///
    /// If not provided, defaults to `~/.argline/history.yml`.
    #[arg(long, short = 'H')]
    pub history_path: Option<String>,

    /// Prompt template, overriding the one in the config file.
    ///
    /// `{cwd}` and `{user}` are substituted before every read.
    #[arg(long, short = 'p')]
    pub prompt: Option<String>,

    /// Skip saving the history when the shell exits.
    ///
    /// The existing history file is left as it is.
    #[arg(long, short = 's', action)]
    pub skip_history_save: bool,
}
