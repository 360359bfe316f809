use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use argline_cli::cli_args::Args;
use argline_cli::line_editor::{History, Terminal};
use argline_cli::shell::{self, CommandRegistry, ShellCompleter};
use argline_core::error::Result;
use argline_core::{config, file_handling, interpolation};
use clap::Parser;
use log::{debug, info};

fn execute() -> Result<()> {
    let args = Args::parse();

    let config_path = config::get_config_path(&args.config_path);
    debug!("Config path: `{config_path}`");
    let shell_config = file_handling::get_config(&config_path)?;

    let prompt_template = args.prompt.unwrap_or(shell_config.prompt);
    // Fail on a broken template before entering raw mode
    let keys = interpolation::get_keys(&prompt_template)?;
    debug!("Prompt template keys: {keys:?}");

    let history_path = config::get_history_path(&args.history_path);
    let history = History::with_entries(
        file_handling::get_history(&history_path)?,
        shell_config.history_size,
    );

    let registry = Arc::new(CommandRegistry::with_builtins()?);
    let mut terminal = Terminal::stdio(shell_config.wrap_mode)
        .with_history(history)
        .with_poll_interval(Duration::from_millis(shell_config.poll_interval_ms))
        .with_completer(ShellCompleter::new(Arc::clone(&registry)));

    println!("Type `help` for a list of commands, `exit` to leave.");
    shell::run(&mut terminal, &registry, &prompt_template)?;

    if args.skip_history_save {
        info!("Skipping history save was specified. Not (over)writing history.");
    } else {
        file_handling::write_history(&history_path, &terminal.history())?;
    }

    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    match execute() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
