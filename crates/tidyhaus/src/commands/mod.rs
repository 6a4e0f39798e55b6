//! Command handlers, one module per top-level subcommand.

pub mod areas;
pub mod config_cmd;
pub mod deps;
pub mod device;
pub mod execute;
pub mod override_cmd;
pub mod preview;
pub mod stats;
pub mod util;

use tidyhaus_core::{HomeAssistantBackend, JsonOverrideStore, Restructurer};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// The fully wired engine the connected commands operate on.
pub type Engine = Restructurer<HomeAssistantBackend, JsonOverrideStore>;

pub async fn dispatch(cmd: Command, engine: &Engine, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Areas(args) => areas::handle(engine, args, global).await,
        Command::Preview(args) => preview::handle(engine, &args, global).await,
        Command::Execute(args) => execute::handle(engine, args, global).await,
        Command::Deps(args) => deps::handle(engine, &args, global).await,
        Command::RenameDevice(args) => device::handle(engine, &args, global).await,
        Command::Override(cmd) => override_cmd::handle(engine, cmd, global).await,
        Command::Stats => stats::handle(engine, global).await,
        // Handled in main before a backend connection exists.
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
