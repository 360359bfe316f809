//! A small interactive shell built on the argument engine and the line editor.
//!
//! Each command declares a [`Catalog`]; the first token of a line selects the
//! command and the rest is resolved onto a [`ValueMap`] before the command
//! runs. Unknown commands get a fuzzy "did you mean" suggestion.

use std::env;
use std::io::Write;

use argline_core::catalog::Catalog;
use argline_core::error::{Error, Result};
use argline_core::interpolation::{prompt_values, render_prompt};
use argline_core::resolution::{resolve, ValueMap};
use argline_core::tokenizer::{split_all, unquote};
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use indexmap::IndexMap;
use log::{debug, info};

use crate::line_editor::{Terminal, TerminalDevice};

pub mod commands;
pub mod completer;

pub use completer::{FileSystemValues, ShellCompleter};

/// What the shell does after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Exit,
}

/// What a running command can see and write to.
pub struct Session<'a> {
    pub out: &'a mut dyn Write,
    /// Committed lines, oldest first.
    pub history: &'a [String],
    /// The registry the command was dispatched from.
    pub registry: &'a CommandRegistry,
}

pub trait ShellCommand: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// Arguments the command accepts.
    fn catalog(&self) -> &Catalog;

    fn run(&self, values: &ValueMap, session: &mut Session<'_>) -> Result<Outcome>;
}

/// Commands by name, in registration order.
#[derive(Default)]
pub struct CommandRegistry {
    commands: IndexMap<String, Box<dyn ShellCommand>>,
}

impl CommandRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every command of [`commands`].
    pub fn with_builtins() -> Result<Self> {
        Ok(Self::new()
            .register(commands::Echo::new()?)
            .register(commands::Lock::new()?)
            .register(commands::Ls::new()?)
            .register(commands::Cd::new()?)
            .register(commands::HistoryCommand::new()?)
            .register(commands::Help::new()?)
            .register(commands::Exit::new()?))
    }

    /// Adds `command`, replacing any command of the same name.
    #[must_use]
    pub fn register(mut self, command: impl ShellCommand + 'static) -> Self {
        self.commands
            .insert(command.name().to_string(), Box::new(command));
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.commands.keys().map(String::as_str)
    }

    pub fn commands(&self) -> impl Iterator<Item = &dyn ShellCommand> {
        self.commands.values().map(AsRef::as_ref)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&dyn ShellCommand> {
        self.commands.get(name).map(AsRef::as_ref)
    }

    /// The registered name closest to `name`, if any is close at all.
    #[must_use]
    pub fn suggest(&self, name: &str) -> Option<String> {
        let matcher = SkimMatcherV2::default();
        self.names()
            .filter_map(|candidate| {
                let forward = matcher.fuzzy_match(candidate, name);
                let backward = matcher.fuzzy_match(name, candidate);
                forward.max(backward).map(|score| (score, candidate))
            })
            .max_by_key(|(score, _)| *score)
            .map(|(_, candidate)| candidate.to_string())
    }

    /// Runs one input line, writing the command's output to `out`.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownCommand`] when the first token names no command, any
    /// resolution error of the command's arguments, or the command's own error.
    pub fn execute(&self, line: &str, out: &mut dyn Write, history: &[String]) -> Result<Outcome> {
        let tokens = split_all(line);
        let Some((first, rest)) = tokens.split_first() else {
            return Ok(Outcome::Continue);
        };

        let name = unquote(first);
        let command = self.get(&name).ok_or_else(|| Error::UnknownCommand {
            suggestion: self.suggest(&name),
            name: name.clone(),
        })?;

        let mut values = ValueMap::new();
        resolve(command.catalog(), rest, &mut values)?;
        debug!("Running `{name}` with {} values", values.len());
        let mut session = Session {
            out,
            history,
            registry: self,
        };
        command.run(&values, &mut session)
    }
}

/// Renders the prompt template for the current directory and user.
pub fn current_prompt(template: &str) -> Result<String> {
    let cwd = env::current_dir()?;
    let user = env::var("USER").unwrap_or_default();
    render_prompt(template, &prompt_values(&cwd.display().to_string(), &user))
}

/// Reads and runs lines until a command asks to exit.
///
/// Errors of individual commands are printed and the loop goes on. Ctrl+C
/// abandons the current line.
pub fn run<D: TerminalDevice>(
    terminal: &mut Terminal<D>,
    registry: &CommandRegistry,
    prompt_template: &str,
) -> Result<()> {
    let mut out = terminal.shared_writer();

    loop {
        let prompt = current_prompt(prompt_template)?;
        let line = match terminal.read_string(&prompt) {
            Ok(line) => line,
            Err(Error::ReadCancelled) => continue,
            Err(e) => return Err(e),
        };

        let history = terminal.history();
        match registry.execute(&line, &mut out, &history) {
            Ok(Outcome::Continue) => {}
            Ok(Outcome::Exit) => {
                info!("Exiting shell");
                return Ok(());
            }
            Err(e) => writeln!(out, "{e}")?,
        }
    }
}
