// src/cli/mod.rs
pub mod args;
pub mod commands;
pub mod error;

use crate::cli::args::{Cli, Commands};
use crate::cli::error::{CliError, CliResult};
use crate::infrastructure::di::ServiceContainer;

pub fn execute_command(container: &ServiceContainer, cli: Cli) -> CliResult<()> {
    match cli.command {
        Some(Commands::Fetch { all, auth, silent }) => {
            commands::fetch(container, all, auth.as_deref(), silent)
        }
        Some(Commands::Autotag {
            errors,
            all,
            categorize_url,
            save_html,
        }) => commands::autotag(container, errors, all, categorize_url.as_deref(), save_html),
        Some(Commands::AutotagSync { num, auth }) => {
            commands::autotag_sync(container, num, auth.as_deref())
        }
        Some(Commands::CreateDb { path }) => commands::create_db(&path),
        Some(Commands::Info) => commands::info(container),
        None => Err(CliError::InvalidInput(
            "no command given; try --help".to_string(),
        )),
    }
}
