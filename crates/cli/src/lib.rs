//! Argline CLI Library
//!
//! Interactive front end of the argline argument engine: a terminal line
//! editor with history and tab completion, and a demo shell whose commands
//! declare their arguments as descriptor catalogs.
//!
//! # Architecture
//!
//! - [`cli_args`]: Command-line argument parsing for the `argl` binary
//! - [`line_editor`]: Raw-mode line editing, history, completion cycling and
//!   output interleaving through [`line_editor::SharedWriter`]
//! - [`shell`]: Command registry, built-in commands and the shell completer
//!
//! # Examples
//!
//! ```bash
//! # Start the shell with the default config and history
//! argl
//!
//! # Use another config file and do not save history on exit
//! argl --config-path ./config.yml --skip-history-save
//!
//! # Override the prompt template
//! argl --prompt "{user}@{cwd} $ "
//! ```

pub mod cli_args;
pub mod line_editor;
pub mod shell;
