//! Command-line parsing and help output.

use std::path::PathBuf;

use crate::error::{ReplError, ReplResult};

/// What the binary was asked to do.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CliCommand {
    /// Run the interactive console.
    Run {
        /// Explicit config path from `--config`.
        config: Option<PathBuf>,
    },
    /// Print usage and exit.
    Help,
}

/// Parse raw command-line arguments (without the program name).
pub fn parse(args: Vec<String>) -> ReplResult<CliCommand> {
    let mut config = None;
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "help" | "--help" | "-h" => return Ok(CliCommand::Help),
            "--config" | "-c" => {
                let Some(path) = args.next() else {
                    return Err(ReplError::usage("--config requires a path"));
                };
                config = Some(PathBuf::from(path));
            }
            other => {
                if let Some(path) = other.strip_prefix("--config=") {
                    config = Some(PathBuf::from(path));
                } else {
                    return Err(ReplError::usage(format!("unknown argument: {other}")));
                }
            }
        }
    }

    Ok(CliCommand::Run { config })
}

/// Print the usage text.
pub fn print_usage() {
    eprintln!(
        "Usage: console_repl [--config <path>]\n\
         \n\
         Options:\n\
           -c, --config <path>   Load [console] options from this TOML file (default: console.toml)\n\
           -h, --help            Show this help\n\
         \n\
         Input:\n\
           <line>                Type a line and submit it\n\
           :<Key>                Press a key: :Tab, :ArrowUp, :ArrowDown, :Enter, :Backquote\n\
           :type <text>          Replace the input text without submitting\n\
           :quit                 Exit\n"
    );
}
