use thiserror::Error;

/// Top-level error type for the `mapinv-api` crate.
///
/// Covers every failure mode of the two remote surfaces: the Airtable
/// record API and the GeoServer REST catalogue. `mapinv-core` maps these
/// into its own error type.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Credentials rejected (HTTP 401/403) or unusable as a header value.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// TLS setup or HTTP client construction failed.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Airtable ────────────────────────────────────────────────────
    /// Airtable allows five requests per second per base; exceeding it
    /// locks the caller out for 30 seconds.
    #[error("Rate limited -- retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// Structured error from the Airtable API (`{"error": {"type", "message"}}`).
    #[error("Airtable API error (HTTP {status}): {message}")]
    Airtable {
        message: String,
        error_type: Option<String>,
        status: u16,
    },

    // ── GeoServer ───────────────────────────────────────────────────
    /// Non-success response from the GeoServer REST API.
    #[error("GeoServer API error (HTTP {status}): {message}")]
    GeoServer { message: String, status: u16 },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the remote service rejected our credentials.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } | Self::RateLimited { .. } => true,
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Airtable { status: 404, .. } | Self::GeoServer { status: 404, .. } => true,
            _ => false,
        }
    }

    /// Extract the Airtable error type (e.g. `INVALID_MULTIPLE_CHOICE_OPTIONS`), if available.
    pub fn api_error_type(&self) -> Option<&str> {
        match self {
            Self::Airtable { error_type, .. } => error_type.as_deref(),
            _ => None,
        }
    }
}
