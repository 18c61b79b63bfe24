//! Shared configuration for the map inventory tools.
//!
//! TOML file with an environment overlay, credential resolution
//! (env + keyring + plaintext), and translation into the runtime types
//! `mapinv_core::AirtableConfig` and `mapinv_core::GeoServerSource`. The
//! CLI layers its global flags on top.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use mapinv_core::{AirtableConfig, EntityId, EntityKind, GeoServerSource, TableNames, TlsVerification};

/// Service name for every keyring entry.
pub const KEYRING_SERVICE: &str = "mapinv";

/// Keyring user for the Airtable API key.
pub const AIRTABLE_KEYRING_USER: &str = "airtable/api-key";

const DEFAULT_AIRTABLE_URL: &str = "https://api.airtable.com/v0/";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for {subject}")]
    NoCredentials { subject: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub defaults: Defaults,

    #[serde(default)]
    pub data: DataSection,

    #[serde(default)]
    pub airtable: AirtableSection,

    /// GeoServer instances crawled by `data fetch`.
    #[serde(default)]
    pub servers: Vec<ServerProfile>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DataSection {
    /// Data file written by `data fetch` and read by the airtable commands.
    #[serde(default = "default_data_path")]
    pub path: PathBuf,
}

impl Default for DataSection {
    fn default() -> Self {
        Self {
            path: default_data_path(),
        }
    }
}

fn default_data_path() -> PathBuf {
    PathBuf::from("resources").join("data.json")
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AirtableSection {
    #[serde(default = "default_airtable_url")]
    pub api_url: String,

    /// Base id (`app…`).
    pub base_id: Option<String>,

    /// API key (plaintext; prefer keyring or env var).
    pub api_key: Option<String>,

    /// Environment variable name containing the API key.
    pub api_key_env: Option<String>,

    /// Pause between paged or chunked requests, in milliseconds.
    #[serde(default = "default_batch_delay_ms")]
    pub batch_delay_ms: u64,

    #[serde(default)]
    pub tables: TableSection,
}

impl Default for AirtableSection {
    fn default() -> Self {
        Self {
            api_url: default_airtable_url(),
            base_id: None,
            api_key: None,
            api_key_env: None,
            batch_delay_ms: default_batch_delay_ms(),
            tables: TableSection::default(),
        }
    }
}

fn default_airtable_url() -> String {
    DEFAULT_AIRTABLE_URL.into()
}
fn default_batch_delay_ms() -> u64 {
    200
}

/// Table name per kind; unset names fall back to the standard base layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct TableSection {
    pub servers: Option<String>,
    pub namespaces: Option<String>,
    pub repositories: Option<String>,
    pub styles: Option<String>,
    pub layers: Option<String>,
    pub layer_groups: Option<String>,
}

impl TableSection {
    fn names(&self) -> TableNames {
        let pick = |name: Option<&str>, kind: EntityKind| {
            name.map_or_else(|| kind.default_table().to_owned(), str::to_owned)
        };
        TableNames {
            servers: pick(self.servers.as_deref(), EntityKind::Server),
            namespaces: pick(self.namespaces.as_deref(), EntityKind::Namespace),
            repositories: pick(self.repositories.as_deref(), EntityKind::Repository),
            styles: pick(self.styles.as_deref(), EntityKind::Style),
            layers: pick(self.layers.as_deref(), EntityKind::Layer),
            layer_groups: pick(self.layer_groups.as_deref(), EntityKind::LayerGroup),
        }
    }
}

/// One GeoServer instance.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ServerProfile {
    /// Local id of the server entity; keep it fixed so Airtable records
    /// survive a re-fetch.
    pub id: String,

    /// Short name, e.g. "production".
    pub label: String,

    pub hostname: String,

    pub port: Option<u16>,

    #[serde(default = "default_scheme")]
    pub scheme: String,

    /// REST root below the host.
    #[serde(default = "default_api_path")]
    pub api_path: String,

    pub username: String,

    /// Password (plaintext; prefer keyring or env var).
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Skip TLS verification.
    pub insecure: Option<bool>,

    /// Override timeout.
    pub timeout: Option<u64>,
}

fn default_scheme() -> String {
    "https".into()
}
fn default_api_path() -> String {
    "/geoserver/rest".into()
}

impl ServerProfile {
    /// Keyring user for this server's password.
    pub fn keyring_user(&self) -> String {
        format!("servers/{}/password", self.label)
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("uk.ac", "bas", "mapinv").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("mapinv");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file + environment. A missing file yields the
/// defaults.
///
/// Nested keys use a double underscore, e.g. `MAPINV_AIRTABLE__BASE_ID`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("MAPINV_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

/// Env var named by the config → system keyring → plaintext in the file.
fn resolve_secret(
    env_name: Option<&str>,
    keyring_user: &str,
    plaintext: Option<&str>,
    lookup_env: impl Fn(&str) -> Option<String>,
) -> Option<SecretString> {
    if let Some(val) = env_name.and_then(&lookup_env) {
        return Some(SecretString::from(val));
    }

    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, keyring_user) {
        if let Ok(secret) = entry.get_password() {
            return Some(SecretString::from(secret));
        }
    }

    plaintext.map(|p| SecretString::from(p.to_owned()))
}

fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Resolve the Airtable API key from the credential chain.
pub fn resolve_airtable_api_key(section: &AirtableSection) -> Result<SecretString, ConfigError> {
    resolve_secret(
        section.api_key_env.as_deref(),
        AIRTABLE_KEYRING_USER,
        section.api_key.as_deref(),
        process_env,
    )
    .ok_or_else(|| ConfigError::NoCredentials {
        subject: "airtable".into(),
    })
}

/// Resolve a GeoServer password from the credential chain.
pub fn resolve_server_password(profile: &ServerProfile) -> Result<SecretString, ConfigError> {
    resolve_secret(
        profile.password_env.as_deref(),
        &profile.keyring_user(),
        profile.password.as_deref(),
        process_env,
    )
    .ok_or_else(|| ConfigError::NoCredentials {
        subject: format!("server '{}'", profile.label),
    })
}

/// Store a secret in the system keyring under [`KEYRING_SERVICE`].
pub fn store_secret(keyring_user: &str, secret: &str) -> Result<(), ConfigError> {
    keyring::Entry::new(KEYRING_SERVICE, keyring_user)?.set_password(secret)?;
    Ok(())
}

// ── Translation into core types ─────────────────────────────────────

impl Config {
    /// Build the Airtable runtime config. `timeout` overrides the default.
    pub fn airtable_config(&self, timeout: Option<u64>) -> Result<AirtableConfig, ConfigError> {
        let section = &self.airtable;
        let api_url: url::Url = section.api_url.parse().map_err(|_| ConfigError::Validation {
            field: "airtable.api_url".into(),
            reason: format!("invalid URL: {}", section.api_url),
        })?;
        let base_id = section
            .base_id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| ConfigError::Validation {
                field: "airtable.base_id".into(),
                reason: "not set".into(),
            })?;

        Ok(AirtableConfig {
            api_url,
            base_id,
            api_key: resolve_airtable_api_key(section)?,
            tables: section.tables.names(),
            batch_delay: Duration::from_millis(section.batch_delay_ms),
            timeout: Duration::from_secs(timeout.unwrap_or(self.defaults.timeout)),
        })
    }

    /// Build one crawl source per configured server. `timeout` overrides
    /// the per-server and default timeouts.
    pub fn geoserver_sources(&self, timeout: Option<u64>) -> Result<Vec<GeoServerSource>, ConfigError> {
        if self.servers.is_empty() {
            return Err(ConfigError::Validation {
                field: "servers".into(),
                reason: "no GeoServer instances configured".into(),
            });
        }
        self.servers
            .iter()
            .map(|profile| {
                let seconds = timeout
                    .or(profile.timeout)
                    .unwrap_or(self.defaults.timeout);
                server_source(profile, Duration::from_secs(seconds))
            })
            .collect()
    }
}

fn server_source(profile: &ServerProfile, timeout: Duration) -> Result<GeoServerSource, ConfigError> {
    if profile.id.trim().is_empty() {
        return Err(ConfigError::Validation {
            field: format!("servers.{}.id", profile.label),
            reason: "must not be empty".into(),
        });
    }

    let tls = if profile.insecure.unwrap_or(false) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    Ok(GeoServerSource {
        id: EntityId::from(profile.id.as_str()),
        label: profile.label.clone(),
        hostname: profile.hostname.clone(),
        port: profile.port,
        scheme: profile.scheme.clone(),
        api_path: profile.api_path.clone(),
        username: profile.username.clone(),
        password: resolve_server_password(profile)?,
        tls,
        timeout,
    })
}
