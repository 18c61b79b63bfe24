//! Command dispatch: bridges CLI args -> core operations -> output formatting.

pub mod airtable;
pub mod config_cmd;
pub mod data;
pub mod util;

use mapinv_config::Config;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a command that works on the data file or a remote service.
pub async fn dispatch(cmd: Command, cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Data(args) => data::handle(args, cfg, global).await,
        Command::Airtable(args) => airtable::handle(args, cfg, global).await,
        Command::Config(args) => config_cmd::handle(args, global),
        Command::Completions(_) => Err(CliError::Validation {
            field: "command".into(),
            reason: "completions are generated before dispatch".into(),
        }),
    }
}
