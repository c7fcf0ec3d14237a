//! CLI command implementations

mod info;
mod train;
mod validate;

#[cfg(test)]
mod tests;

use super::args::{Cli, Command};
use exetree_common::Result;

/// Execute a CLI command based on the parsed arguments
pub fn run_command(cli: Cli) -> Result<()> {
    let log_level = cli.common.log_level();

    match cli.command {
        Command::Train(args) => train::run_train(args, log_level),
        Command::Info(args) => info::run_info(args, log_level),
        Command::Validate(args) => validate::run_validate(args, log_level),
    }
}
