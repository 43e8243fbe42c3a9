//! CLI command implementations

mod finetune;
mod info;

use crate::cli::logging::LogLevel;
use crate::cli::{Cli, Command};
use crate::error::Result;

/// Execute a CLI command based on the parsed arguments
pub fn run_command(cli: Cli) -> Result<()> {
    let level = LogLevel::from_flags(cli.verbose, cli.quiet);

    match cli.command {
        Command::Finetune(args) => finetune::run_finetune(args, level),
        Command::Info(args) => info::run_info(args, level),
    }
}
