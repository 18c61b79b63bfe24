//! CLI-side configuration glue: `--config` / `--data` / `--timeout`
//! overrides on top of `mapinv_config`.
//!
//! Core never sees these types -- it receives pre-built runtime configs.

use std::path::PathBuf;

use mapinv_config::Config;
use mapinv_core::{AirtableConfig, GeoServerSource};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// The config file in effect: `--config` or the platform default.
pub fn config_file(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(mapinv_config::config_path)
}

/// Load the config file in effect, layered over defaults and environment.
pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    Ok(mapinv_config::load_config_from(&config_file(global))?)
}

/// Data file path (flag > config).
pub fn data_path(global: &GlobalOpts, cfg: &Config) -> PathBuf {
    global.data.clone().unwrap_or_else(|| cfg.data.path.clone())
}

pub fn airtable(global: &GlobalOpts, cfg: &Config) -> Result<AirtableConfig, CliError> {
    Ok(cfg.airtable_config(global.timeout)?)
}

pub fn geoserver_sources(global: &GlobalOpts, cfg: &Config) -> Result<Vec<GeoServerSource>, CliError> {
    Ok(cfg.geoserver_sources(global.timeout)?)
}
