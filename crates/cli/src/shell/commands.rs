//! Built-in shell commands.

use std::env;
use std::fs;

use argline_core::catalog::Catalog;
use argline_core::config::expand_path;
use argline_core::descriptor::Descriptor;
use argline_core::error::{Error, Result};
use argline_core::resolution::ValueMap;
use argline_core::value::{Value, ValueKind};
use itertools::Itertools;
use log::debug;

use super::{Outcome, Session, ShellCommand};

/// Prints its arguments separated by spaces.
pub struct Echo {
    catalog: Catalog,
}

impl Echo {
    pub fn new() -> Result<Self> {
        let catalog = Catalog::builder()
            .descriptor(
                Descriptor::builder("words")
                    .variadic()
                    .description("Text to print")
                    .build(),
            )
            .build()?;
        Ok(Self { catalog })
    }
}

impl ShellCommand for Echo {
    fn name(&self) -> &str {
        "echo"
    }

    fn description(&self) -> &str {
        "Print the given words"
    }

    fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    fn run(&self, values: &ValueMap, session: &mut Session<'_>) -> Result<Outcome> {
        writeln!(session.out, "{}", values.get_strings("words").join(" "))?;
        Ok(Outcome::Continue)
    }
}

/// Takes a named lock on a path. The message is mandatory, the path may be
/// left out.
pub struct Lock {
    catalog: Catalog,
}

impl Lock {
    pub fn new() -> Result<Self> {
        let catalog = Catalog::builder()
            .descriptor(
                Descriptor::builder("path")
                    .required()
                    .default_value("")
                    .description("Path to lock")
                    .build(),
            )
            .descriptor(
                Descriptor::builder("message")
                    .short('m')
                    .long("message")
                    .required()
                    .description("Reason for the lock")
                    .build(),
            )
            .build()?;
        Ok(Self { catalog })
    }
}

impl ShellCommand for Lock {
    fn name(&self) -> &str {
        "lock"
    }

    fn description(&self) -> &str {
        "Lock a path with a message"
    }

    fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    fn run(&self, values: &ValueMap, session: &mut Session<'_>) -> Result<Outcome> {
        let path = values.get_str("path").unwrap_or_default();
        let message = values.get_str("message").unwrap_or_default();
        let path = if path.is_empty() { "." } else { path };

        writeln!(session.out, "Locked `{path}`: {message}")?;
        Ok(Outcome::Continue)
    }
}

/// Lists a directory, directories first marked with a trailing `/`.
pub struct Ls {
    catalog: Catalog,
}

impl Ls {
    pub fn new() -> Result<Self> {
        let catalog = Catalog::builder()
            .descriptor(
                Descriptor::builder("path")
                    .required()
                    .default_value(".")
                    .description("Directory to list")
                    .build(),
            )
            .descriptor(
                Descriptor::builder("all")
                    .short('a')
                    .long("all")
                    .flag()
                    .description("Include entries starting with a dot")
                    .build(),
            )
            .build()?;
        Ok(Self { catalog })
    }
}

impl ShellCommand for Ls {
    fn name(&self) -> &str {
        "ls"
    }

    fn description(&self) -> &str {
        "List directory contents"
    }

    fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    fn run(&self, values: &ValueMap, session: &mut Session<'_>) -> Result<Outcome> {
        let path = expand_path(values.get_str("path").unwrap_or("."));
        let all = values.get_bool("all");

        let entries = fs::read_dir(&path)
            .map_err(|e| Error::io_error("directory".to_string(), path.clone(), e))?;

        let names = entries
            .filter_map(std::result::Result::ok)
            .map(|entry| {
                let is_dir = entry.file_type().is_ok_and(|kind| kind.is_dir());
                (is_dir, entry.file_name().to_string_lossy().into_owned())
            })
            .filter(|(_, name)| all || !name.starts_with('.'))
            .sorted_by(|(a_dir, a), (b_dir, b)| b_dir.cmp(a_dir).then_with(|| a.cmp(b)));

        for (is_dir, name) in names {
            let suffix = if is_dir { "/" } else { "" };
            writeln!(session.out, "{name}{suffix}")?;
        }
        Ok(Outcome::Continue)
    }
}

/// Changes the working directory; `~` when no path is given.
pub struct Cd {
    catalog: Catalog,
}

impl Cd {
    pub fn new() -> Result<Self> {
        let catalog = Catalog::builder()
            .descriptor(
                Descriptor::builder("path")
                    .required()
                    .default_value("~")
                    .description("Directory to change to")
                    .build(),
            )
            .build()?;
        Ok(Self { catalog })
    }
}

impl ShellCommand for Cd {
    fn name(&self) -> &str {
        "cd"
    }

    fn description(&self) -> &str {
        "Change the working directory"
    }

    fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    fn run(&self, values: &ValueMap, _session: &mut Session<'_>) -> Result<Outcome> {
        let path = expand_path(values.get_str("path").unwrap_or("~"));
        env::set_current_dir(&path)
            .map_err(|e| Error::io_error("directory".to_string(), path.clone(), e))?;
        debug!("Changed directory to `{path}`");
        Ok(Outcome::Continue)
    }
}

/// Prints the committed lines, numbered from 1.
pub struct HistoryCommand {
    catalog: Catalog,
}

impl HistoryCommand {
    pub fn new() -> Result<Self> {
        let catalog = Catalog::builder()
            .descriptor(
                Descriptor::builder("count")
                    .short('n')
                    .long("count")
                    .kind(ValueKind::Int)
                    .description("Only show the newest entries")
                    .build(),
            )
            .build()?;
        Ok(Self { catalog })
    }
}

impl ShellCommand for HistoryCommand {
    fn name(&self) -> &str {
        "history"
    }

    fn description(&self) -> &str {
        "Show previously entered lines"
    }

    fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    fn run(&self, values: &ValueMap, session: &mut Session<'_>) -> Result<Outcome> {
        let count = values
            .get("count")
            .and_then(Value::as_int)
            .and_then(|count| usize::try_from(count).ok())
            .filter(|count| *count > 0)
            .unwrap_or(session.history.len());

        let skip = session.history.len().saturating_sub(count);
        for (i, entry) in session.history.iter().enumerate().skip(skip) {
            writeln!(session.out, "{:>4}  {entry}", i + 1)?;
        }
        Ok(Outcome::Continue)
    }
}

/// Lists the registered commands, or the arguments of one command.
pub struct Help {
    catalog: Catalog,
}

impl Help {
    pub fn new() -> Result<Self> {
        let catalog = Catalog::builder()
            .descriptor(
                Descriptor::builder("command")
                    .required()
                    .default_value("")
                    .description("Command to describe")
                    .build(),
            )
            .build()?;
        Ok(Self { catalog })
    }
}

impl ShellCommand for Help {
    fn name(&self) -> &str {
        "help"
    }

    fn description(&self) -> &str {
        "List commands or describe one"
    }

    fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    fn run(&self, values: &ValueMap, session: &mut Session<'_>) -> Result<Outcome> {
        let wanted = values.get_str("command").unwrap_or_default();
        let registry = session.registry;

        if wanted.is_empty() {
            for command in registry.commands() {
                writeln!(session.out, "{:<10}{}", command.name(), command.description())?;
            }
            return Ok(Outcome::Continue);
        }

        let command = registry.get(wanted).ok_or_else(|| Error::UnknownCommand {
            name: wanted.to_string(),
            suggestion: registry.suggest(wanted),
        })?;

        writeln!(session.out, "{}: {}", command.name(), command.description())?;
        for argument in command.catalog().iter() {
            writeln!(session.out, "    {argument}")?;
        }
        Ok(Outcome::Continue)
    }
}

pub struct Exit {
    catalog: Catalog,
}

impl Exit {
    pub fn new() -> Result<Self> {
        Ok(Self {
            catalog: Catalog::builder().build()?,
        })
    }
}

impl ShellCommand for Exit {
    fn name(&self) -> &str {
        "exit"
    }

    fn description(&self) -> &str {
        "Leave the shell"
    }

    fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    fn run(&self, _values: &ValueMap, _session: &mut Session<'_>) -> Result<Outcome> {
        Ok(Outcome::Exit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::CommandRegistry;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn run(line: &str, history: &[String]) -> Result<String> {
        let registry = CommandRegistry::with_builtins()?;
        let mut out = Vec::new();
        registry.execute(line, &mut out, history)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_echo_joins_words() {
        assert_eq!(run("echo a  b \"c d\"", &[]).unwrap(), "a b c d\n");
        assert_eq!(run("echo", &[]).unwrap(), "\n");
        assert_eq!(run("echo -- -m x", &[]).unwrap(), "-m x\n");
    }

    #[test]
    fn test_lock_scenarios() {
        assert_eq!(run("lock x -m 123", &[]).unwrap(), "Locked `x`: 123\n");
        assert_eq!(run("lock -m 123", &[]).unwrap(), "Locked `.`: 123\n");
        assert!(matches!(run("lock x", &[]), Err(Error::MissingRequired { .. })));
        assert!(matches!(run("lock -m", &[]), Err(Error::MissingExplicitValue { .. })));
    }

    #[test]
    fn test_ls_lists_directories_first() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("zeta")).unwrap();
        fs::write(dir.path().join("alpha.txt"), "").unwrap();
        fs::write(dir.path().join(".hidden"), "").unwrap();
        let path = dir.path().to_str().unwrap();

        assert_eq!(run(&format!("ls \"{path}\""), &[]).unwrap(), "zeta/\nalpha.txt\n");
        assert_eq!(
            run(&format!("ls \"{path}\" --all"), &[]).unwrap(),
            "zeta/\n.hidden\nalpha.txt\n"
        );
    }

    #[test]
    fn test_ls_missing_directory() {
        let result = run("ls /this/path/does/not/exist", &[]);
        assert!(matches!(result, Err(Error::Io { .. })));
    }

    #[test]
    fn test_history_count() {
        let history: Vec<String> = ["a", "b", "c"].iter().map(ToString::to_string).collect();
        assert_eq!(run("history", &history).unwrap(), "   1  a\n   2  b\n   3  c\n");
        assert_eq!(run("history -n 2", &history).unwrap(), "   2  b\n   3  c\n");
        assert!(matches!(
            run("history -n many", &history),
            Err(Error::Conversion(_))
        ));
    }

    #[test]
    fn test_help() {
        let all = run("help", &[]).unwrap();
        assert!(all.starts_with("echo"));
        assert!(all.contains("help      List commands or describe one"));

        let lock = run("help lock", &[]).unwrap();
        assert_eq!(
            lock,
            "lock: Lock a path with a message\n    `path` (Path to lock)\n    `--message` (Reason for the lock)\n"
        );
        assert!(matches!(run("help nope", &[]), Err(Error::UnknownCommand { .. })));
    }

    struct Greet {
        catalog: Catalog,
    }

    impl ShellCommand for Greet {
        fn name(&self) -> &str {
            "greet"
        }

        fn description(&self) -> &str {
            "Say hello"
        }

        fn catalog(&self) -> &Catalog {
            &self.catalog
        }

        fn run(&self, _values: &ValueMap, session: &mut Session<'_>) -> Result<Outcome> {
            writeln!(session.out, "hello")?;
            Ok(Outcome::Continue)
        }
    }

    #[test]
    fn test_help_lists_registered_commands() {
        let catalog = Catalog::builder()
            .descriptor(Descriptor::builder("name").variadic().description("Who to greet").build())
            .build()
            .unwrap();
        let registry = CommandRegistry::with_builtins()
            .unwrap()
            .register(Greet { catalog });

        let mut out = Vec::new();
        registry.execute("help", &mut out, &[]).unwrap();
        let all = String::from_utf8(out).unwrap();
        assert!(all.ends_with("exit      Leave the shell\ngreet     Say hello\n"));

        let mut out = Vec::new();
        registry.execute("help greet", &mut out, &[]).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "greet: Say hello\n    `name` (Who to greet)\n"
        );
    }
}
