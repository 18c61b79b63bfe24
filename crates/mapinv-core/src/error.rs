// ── Core error types ──
//
// User-facing errors from mapinv-core. These are NOT API-specific --
// consumers never see HTTP status codes or JSON parse failures directly.
// The `From<mapinv_api::Error>` impl translates transport-layer errors
// into domain-appropriate variants.

use std::path::PathBuf;

use thiserror::Error;

use crate::model::EntityKind;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Data errors ──────────────────────────────────────────────────
    /// A local or remote identifier did not resolve.
    #[error("{kind} not found: {identifier}")]
    NotFound {
        kind: EntityKind,
        identifier: String,
    },

    /// A remote record lacks a field its kind requires.
    #[error("{kind} record {record} is missing required field '{field}'")]
    MissingField {
        kind: EntityKind,
        field: &'static str,
        record: String,
    },

    /// A remote cell holding the wrong JSON type, such as a number in a
    /// text field.
    #[error("{kind} record {record} has a malformed '{field}' value: {value}")]
    MalformedField {
        kind: EntityKind,
        field: &'static str,
        record: String,
        value: String,
    },

    /// A remote value outside the kind's display vocabulary.
    #[error("Unrecognized value for {kind} field '{field}': {value:?}")]
    UnrecognizedValue {
        kind: EntityKind,
        field: &'static str,
        value: String,
    },

    /// An outbound record references an entity that has no remote id
    /// yet. Kinds were synced out of dependency order.
    #[error("{kind} {local_id} references a {relation} with no remote record")]
    UnresolvedReference {
        kind: EntityKind,
        local_id: String,
        relation: EntityKind,
    },

    #[error("Duplicate {kind} id: {id}")]
    DuplicateId { kind: EntityKind, id: String },

    // ── Snapshot errors ──────────────────────────────────────────────
    #[error("Cannot read or write data file {path}: {message}")]
    Snapshot { path: PathBuf, message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// The service-specific error type (e.g. "INVALID_REQUEST_UNKNOWN").
        code: Option<String>,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    #[error("Rate limited -- retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Per-record failures met while parsing a remote record. The
    /// reconciler files such records as orphaned instead of aborting.
    pub fn is_record_local(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::MissingField { .. } | Self::MalformedField { .. }
        )
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<mapinv_api::Error> for CoreError {
    fn from(err: mapinv_api::Error) -> Self {
        match err {
            mapinv_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            mapinv_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        code: None,
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            mapinv_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            mapinv_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            mapinv_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            mapinv_api::Error::RateLimited { retry_after_secs } => {
                CoreError::RateLimited { retry_after_secs }
            }
            mapinv_api::Error::Airtable {
                message,
                error_type,
                status,
            } => CoreError::Api {
                message,
                code: error_type,
                status: Some(status),
            },
            mapinv_api::Error::GeoServer { message, status } => CoreError::Api {
                message,
                code: None,
                status: Some(status),
            },
            mapinv_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_local_errors() {
        let dangling = CoreError::NotFound {
            kind: EntityKind::Server,
            identifier: "recGone".into(),
        };
        let missing = CoreError::MissingField {
            kind: EntityKind::Style,
            field: "Type",
            record: "recTest00000sty1".into(),
        };
        let malformed = CoreError::MalformedField {
            kind: EntityKind::Namespace,
            field: "Name",
            record: "recTest00000ns01".into(),
            value: "42".into(),
        };
        let drift = CoreError::UnrecognizedValue {
            kind: EntityKind::Layer,
            field: "Geometry",
            value: "Curve".into(),
        };
        assert!(dangling.is_record_local());
        assert!(missing.is_record_local());
        assert!(malformed.is_record_local());
        assert!(!drift.is_record_local());
    }

    #[test]
    fn rate_limit_survives_translation() {
        let err: CoreError = mapinv_api::Error::RateLimited {
            retry_after_secs: 30,
        }
        .into();
        assert!(matches!(err, CoreError::RateLimited { retry_after_secs: 30 }));
    }

    #[test]
    fn airtable_error_keeps_its_type() {
        let err: CoreError = mapinv_api::Error::Airtable {
            message: "Could not find table Servers".into(),
            error_type: Some("TABLE_NOT_FOUND".into()),
            status: 404,
        }
        .into();
        match err {
            CoreError::Api { code, status, .. } => {
                assert_eq!(code.as_deref(), Some("TABLE_NOT_FOUND"));
                assert_eq!(status, Some(404));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }
}
