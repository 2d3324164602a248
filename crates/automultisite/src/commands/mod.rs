//! Command dispatch: bridges CLI args -> core operations -> output formatting.

pub mod config_cmd;
pub mod new;
pub mod resolve;
pub mod settings;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a project-bound command to its handler.
pub fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::New(args) => new::handle(args, global),
        Command::Resolve(args) => resolve::handle(args, global),
        Command::Settings(args) => settings::handle(args, global),
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
