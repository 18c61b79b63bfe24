// Airtable wire types.
//
// Records are deliberately schemaless here: the field names and value
// shapes of each table belong to the adapters in `mapinv-core`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Named cell values of one record, keyed by column name.
///
/// Airtable omits empty cells entirely, so absence and `null` mean the
/// same thing on read.
pub type Fields = Map<String, Value>;

/// Maximum records per create or delete request.
pub const BATCH_LIMIT: usize = 10;

/// Maximum records per list page.
pub const PAGE_SIZE: usize = 100;

/// A record as returned by the list, create and update endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: String,
    #[serde(default)]
    pub fields: Fields,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_time: Option<DateTime<Utc>>,
}

// ── Request bodies ──────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub(crate) struct NewRecord<'a> {
    pub fields: &'a Fields,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateRequest<'a> {
    pub records: Vec<NewRecord<'a>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct UpdateRequest<'a> {
    pub fields: &'a Fields,
}

// ── Response bodies ─────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(crate) struct RecordPage {
    #[serde(default)]
    pub records: Vec<Record>,
    #[serde(default)]
    pub offset: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateResponse {
    #[serde(default)]
    pub records: Vec<Record>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DeletedRecord {
    pub id: String,
    #[serde(default)]
    pub deleted: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DeleteResponse {
    #[serde(default)]
    pub records: Vec<DeletedRecord>,
}

/// Airtable reports errors either as `{"error": "NOT_FOUND"}` or as
/// `{"error": {"type": "...", "message": "..."}}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ErrorBody {
    Detailed {
        #[serde(rename = "type")]
        error_type: Option<String>,
        message: Option<String>,
    },
    Code(String),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn record_tolerates_missing_fields_and_timestamp() {
        let record: Record = serde_json::from_value(json!({ "id": "recTest000000srv1" })).unwrap();
        assert_eq!(record.id, "recTest000000srv1");
        assert!(record.fields.is_empty());
        assert!(record.created_time.is_none());
    }

    #[test]
    fn record_parses_created_time() {
        let record: Record = serde_json::from_value(json!({
            "id": "recTest000000srv1",
            "fields": { "ID": "01DRS53XAG5E85MJNYTA6WPTBM", "Name": "test-server-1" },
            "createdTime": "2019-10-23T14:50:04.000Z"
        }))
        .unwrap();
        assert_eq!(record.fields["Name"], "test-server-1");
        assert_eq!(
            record.created_time.unwrap().to_rfc3339(),
            "2019-10-23T14:50:04+00:00"
        );
    }

    #[test]
    fn error_body_accepts_both_shapes() {
        let coded: ErrorResponse = serde_json::from_value(json!({ "error": "NOT_FOUND" })).unwrap();
        assert!(matches!(coded.error, ErrorBody::Code(ref c) if c == "NOT_FOUND"));

        let detailed: ErrorResponse = serde_json::from_value(json!({
            "error": { "type": "INVALID_REQUEST_UNKNOWN", "message": "Invalid request" }
        }))
        .unwrap();
        assert!(matches!(
            detailed.error,
            ErrorBody::Detailed { error_type: Some(ref t), .. } if t == "INVALID_REQUEST_UNKNOWN"
        ));
    }
}
