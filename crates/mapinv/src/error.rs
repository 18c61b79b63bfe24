//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and process exit codes.

use miette::Diagnostic;
use thiserror::Error;

use mapinv_config::ConfigError;
use mapinv_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not connect to {url}")]
    #[diagnostic(
        code(mapinv::connection_failed),
        help(
            "Check that the server is running and reachable.\n\
             Reason: {reason}"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    // ── Authentication ───────────────────────────────────────────────

    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(mapinv::auth_failed),
        help(
            "Verify the Airtable API key or GeoServer credentials.\n\
             Run: mapinv config set-api-key  or  mapinv config set-password --server <label>"
        )
    )]
    AuthFailed { message: String },

    #[error("No credentials configured for {subject}")]
    #[diagnostic(
        code(mapinv::no_credentials),
        help(
            "Configure credentials with: mapinv config init\n\
             Or name an environment variable with api_key_env / password_env."
        )
    )]
    NoCredentials { subject: String },

    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(mapinv::not_found),
        help("Re-fetch the data file with: mapinv data fetch")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
    },

    #[error("{kind} {local_id} references a {relation} that is not in Airtable yet")]
    #[diagnostic(
        code(mapinv::unresolved_reference),
        help("Sync kinds in order, or run: mapinv airtable sync")
    )]
    UnresolvedReference {
        kind: String,
        local_id: String,
        relation: String,
    },

    // ── Data file ────────────────────────────────────────────────────

    #[error("Cannot use data file {path}")]
    #[diagnostic(
        code(mapinv::data_file),
        help(
            "{message}\n\
             Create it with: mapinv data fetch"
        )
    )]
    DataFile { path: String, message: String },

    #[error("Invalid data: {message}")]
    #[diagnostic(code(mapinv::invalid_data))]
    InvalidData { message: String },

    // ── API ──────────────────────────────────────────────────────────

    #[error("API error ({code}): {message}")]
    #[diagnostic(code(mapinv::api_error))]
    ApiError { code: String, message: String },

    #[error("Rate limited by Airtable")]
    #[diagnostic(
        code(mapinv::rate_limited),
        help("Wait {retry_after_secs}s, or raise airtable.batch_delay_ms in the config file.")
    )]
    RateLimited { retry_after_secs: u64 },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(mapinv::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Server '{label}' not found in configuration")]
    #[diagnostic(
        code(mapinv::server_not_found),
        help("Configured servers: {available}")
    )]
    ServerNotFound { label: String, available: String },

    #[error(transparent)]
    #[diagnostic(code(mapinv::config))]
    Config(Box<figment::Error>),

    #[error("Configuration error: {message}")]
    #[diagnostic(
        code(mapinv::config),
        help("Check the config file, or run: mapinv config path")
    )]
    ConfigInvalid { message: String },

    // ── Interactive ──────────────────────────────────────────────────

    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(mapinv::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Timeout ──────────────────────────────────────────────────────

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(mapinv::timeout),
        help("Increase timeout with --timeout or check server responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── IO / Serialization ───────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON output failed: {0}")]
    #[diagnostic(code(mapinv::json))]
    Json(#[from] serde_json::Error),

    #[error("YAML output failed: {0}")]
    #[diagnostic(code(mapinv::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } | Self::ServerNotFound { .. } => exit_code::NOT_FOUND,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed { url, reason },

            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },

            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },

            CoreError::NotFound { kind, identifier } => CliError::NotFound {
                resource_type: kind.to_string(),
                identifier,
            },

            CoreError::UnresolvedReference {
                kind,
                local_id,
                relation,
            } => CliError::UnresolvedReference {
                kind: kind.to_string(),
                local_id,
                relation: relation.to_string(),
            },

            CoreError::Snapshot { path, message } => CliError::DataFile {
                path: path.display().to_string(),
                message,
            },

            err @ (CoreError::MissingField { .. }
            | CoreError::MalformedField { .. }
            | CoreError::UnrecognizedValue { .. }
            | CoreError::DuplicateId { .. }) => CliError::InvalidData {
                message: err.to_string(),
            },

            CoreError::Api { message, code, status } => CliError::ApiError {
                code: code
                    .or_else(|| status.map(|s| s.to_string()))
                    .unwrap_or_default(),
                message,
            },

            CoreError::RateLimited { retry_after_secs } => CliError::RateLimited { retry_after_secs },

            CoreError::Config { message } => CliError::ConfigInvalid { message },

            CoreError::Internal(message) => CliError::ApiError {
                code: "internal".into(),
                message,
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoCredentials { subject } => CliError::NoCredentials { subject },
            ConfigError::Figment(err) => CliError::Config(err),
            ConfigError::Io(err) => CliError::Io(err),
            other @ (ConfigError::Serialization(_) | ConfigError::Keyring(_)) => {
                CliError::ConfigInvalid {
                    message: other.to_string(),
                }
            }
        }
    }
}
