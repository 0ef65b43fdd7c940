//! Interactive developer console on the terminal.

use std::env;
use std::process::ExitCode;

use console_repl::cli::{self, CliCommand};
use console_repl::config::load_config;

fn main() -> ExitCode {
    let command = match cli::parse(env::args().skip(1).collect()) {
        Ok(command) => command,
        Err(err) => {
            eprintln!("error: {err}");
            cli::print_usage();
            return ExitCode::from(2);
        }
    };

    let CliCommand::Run { config } = command else {
        cli::print_usage();
        return ExitCode::SUCCESS;
    };

    let logs = console_repl::setup_tracing();
    let result = load_config(config.as_deref()).and_then(|config| console_repl::run(config, logs));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(1)
        }
    }
}
