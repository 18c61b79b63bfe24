//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::path::Path;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use mapinv_core::{Catalogue, EntityKind};

use crate::cli::KindArg;
use crate::error::CliError;

impl From<KindArg> for EntityKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Servers => Self::Server,
            KindArg::Namespaces => Self::Namespace,
            KindArg::Repositories => Self::Repository,
            KindArg::Styles => Self::Style,
            KindArg::Layers => Self::Layer,
            KindArg::LayerGroups => Self::LayerGroup,
        }
    }
}

/// Read the data file, pointing at `data fetch` when it is absent.
pub fn load_catalogue(path: &Path) -> Result<Catalogue, CliError> {
    if !path.exists() {
        return Err(CliError::DataFile {
            path: path.display().to_string(),
            message: "file does not exist".into(),
        });
    }
    Ok(Catalogue::load(path)?)
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Stderr spinner for long remote operations; hidden when quiet or
/// not attached to a terminal.
pub fn spinner(message: impl Into<String>, quiet: bool) -> ProgressBar {
    if quiet || !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        bar.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "));
    }
    bar.set_message(message.into());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}
