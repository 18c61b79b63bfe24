// Hand-crafted async HTTP client for the Airtable record API.
//
// One `AirtableClient` per base; `Table` handles address a single table
// within it and carry the four record operations the sync engine needs.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, info};
use url::Url;

use super::models::{
    BATCH_LIMIT, CreateRequest, CreateResponse, DeleteResponse, ErrorBody, ErrorResponse, Fields,
    NewRecord, PAGE_SIZE, Record, RecordPage, UpdateRequest,
};
use crate::{Error, TransportConfig};

/// Airtable locks a client out for this long after a 429.
const RATE_LIMIT_PENALTY_SECS: u64 = 30;

// ── Client ───────────────────────────────────────────────────────────

/// Async client for one Airtable base.
#[derive(Debug, Clone)]
pub struct AirtableClient {
    http: reqwest::Client,
    base_url: Url,
    batch_delay: Duration,
    timeout_secs: u64,
}

impl AirtableClient {
    pub const DEFAULT_API_URL: &'static str = "https://api.airtable.com/v0/";
    pub const DEFAULT_BATCH_DELAY: Duration = Duration::from_millis(200);

    // ── Constructors ─────────────────────────────────────────────────

    /// Build from an API key (personal access token) and transport config.
    ///
    /// Injects `Authorization: Bearer <key>` as a default header on every
    /// request.
    pub fn from_api_key(
        api_url: &str,
        base_id: &str,
        api_key: &SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        let mut auth_value = HeaderValue::from_str(&format!("Bearer {}", api_key.expose_secret()))
            .map_err(|e| Error::Authentication {
                message: format!("invalid API key header value: {e}"),
            })?;
        auth_value.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth_value);

        let http = transport.build_client_with_headers(headers)?;
        let mut client = Self::with_client(http, Url::parse(api_url)?, base_id)?;
        client.timeout_secs = transport.timeout.as_secs();
        Ok(client)
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn with_client(http: reqwest::Client, api_url: Url, base_id: &str) -> Result<Self, Error> {
        let base_url = push_segment(&api_url, base_id)?;
        Ok(Self {
            http,
            base_url,
            batch_delay: Self::DEFAULT_BATCH_DELAY,
            timeout_secs: TransportConfig::default().timeout.as_secs(),
        })
    }

    /// Override the pause inserted between consecutive paged or chunked
    /// requests.
    #[must_use]
    pub fn with_batch_delay(mut self, delay: Duration) -> Self {
        self.batch_delay = delay;
        self
    }

    /// Address a table by name (e.g. `"Layer Groups"`).
    pub fn table(&self, name: &str) -> Result<Table, Error> {
        Ok(Table {
            http: self.http.clone(),
            url: push_segment(&self.base_url, name)?,
            name: name.to_owned(),
            batch_delay: self.batch_delay,
            timeout_secs: self.timeout_secs,
        })
    }
}

/// Append one percent-encoded path segment, tolerating a trailing slash
/// on the input.
fn push_segment(url: &Url, segment: &str) -> Result<Url, Error> {
    let mut url = url.clone();
    url.path_segments_mut()
        .map_err(|()| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
        .pop_if_empty()
        .push(segment);
    Ok(url)
}

// ── Table ────────────────────────────────────────────────────────────

/// Handle on a single Airtable table.
#[derive(Debug, Clone)]
pub struct Table {
    http: reqwest::Client,
    url: Url,
    name: String,
    batch_delay: Duration,
    timeout_secs: u64,
}

impl Table {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fetch every record in the table, following `offset` cursors until
    /// the last page.
    pub async fn list_records(&self) -> Result<Vec<Record>, Error> {
        let mut all = Vec::new();
        let mut offset: Option<String> = None;

        loop {
            let mut params = vec![("pageSize", PAGE_SIZE.to_string())];
            if let Some(ref cursor) = offset {
                params.push(("offset", cursor.clone()));
            }
            debug!(table = %self.name, "GET {} params={params:?}", self.url);

            let resp = self
                .send(self.http.get(self.url.clone()).query(&params))
                .await?;
            let page: RecordPage = handle_response(resp).await?;
            all.extend(page.records);

            match page.offset {
                Some(next) => {
                    offset = Some(next);
                    self.pause().await;
                }
                None => break,
            }
        }

        debug!(table = %self.name, count = all.len(), "listed records");
        Ok(all)
    }

    /// Create records in chunks of ten. An empty input issues no request.
    pub async fn create_records(&self, records: &[Fields]) -> Result<Vec<Record>, Error> {
        let mut created = Vec::with_capacity(records.len());

        for (index, chunk) in records.chunks(BATCH_LIMIT).enumerate() {
            if index > 0 {
                self.pause().await;
            }
            let body = CreateRequest {
                records: chunk.iter().map(|fields| NewRecord { fields }).collect(),
            };
            debug!(table = %self.name, count = chunk.len(), "POST {}", self.url);

            let resp = self
                .send(self.http.post(self.url.clone()).json(&body))
                .await?;
            let response: CreateResponse = handle_response(resp).await?;
            created.extend(response.records);
        }

        if !created.is_empty() {
            info!(table = %self.name, count = created.len(), "created records");
        }
        Ok(created)
    }

    /// Replace the given fields of one record, leaving other cells untouched.
    pub async fn update_record(&self, record_id: &str, fields: &Fields) -> Result<Record, Error> {
        let url = push_segment(&self.url, record_id)?;
        debug!(table = %self.name, "PATCH {url}");

        let resp = self
            .send(self.http.patch(url).json(&UpdateRequest { fields }))
            .await?;
        handle_response(resp).await
    }

    /// Delete records in chunks of ten, returning the ids Airtable
    /// confirmed as deleted. An empty input issues no request.
    pub async fn delete_records(&self, record_ids: &[String]) -> Result<Vec<String>, Error> {
        let mut deleted = Vec::with_capacity(record_ids.len());

        for (index, chunk) in record_ids.chunks(BATCH_LIMIT).enumerate() {
            if index > 0 {
                self.pause().await;
            }
            let params: Vec<(&str, &str)> =
                chunk.iter().map(|id| ("records[]", id.as_str())).collect();
            debug!(table = %self.name, count = chunk.len(), "DELETE {}", self.url);

            let resp = self
                .send(self.http.delete(self.url.clone()).query(&params))
                .await?;
            let response: DeleteResponse = handle_response(resp).await?;
            deleted.extend(
                response
                    .records
                    .into_iter()
                    .filter(|r| r.deleted)
                    .map(|r| r.id),
            );
        }

        if !deleted.is_empty() {
            info!(table = %self.name, count = deleted.len(), "deleted records");
        }
        Ok(deleted)
    }

    // ── Transport helpers ────────────────────────────────────────────

    async fn pause(&self) {
        if !self.batch_delay.is_zero() {
            tokio::time::sleep(self.batch_delay).await;
        }
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, Error> {
        request.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Timeout {
                    timeout_secs: self.timeout_secs,
                }
            } else {
                Error::Transport(e)
            }
        })
    }
}

// ── Response handling ───────────────────────────────────────────────

async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
    let status = resp.status();
    if status.is_success() {
        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            let preview = crate::body_preview(&body);
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body,
            }
        })
    } else {
        Err(parse_error(status, resp).await)
    }
}

async fn parse_error(status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Error::RateLimited {
            retry_after_secs: RATE_LIMIT_PENALTY_SECS,
        };
    }

    let raw = resp.text().await.unwrap_or_default();
    let (error_type, message) = match serde_json::from_str::<ErrorResponse>(&raw) {
        Ok(ErrorResponse {
            error: ErrorBody::Detailed {
                error_type,
                message,
            },
        }) => (error_type, message),
        Ok(ErrorResponse {
            error: ErrorBody::Code(code),
        }) => (Some(code), None),
        Err(_) => (None, (!raw.is_empty()).then_some(raw)),
    };

    if matches!(
        status,
        reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN
    ) {
        return Error::Authentication {
            message: message
                .or(error_type)
                .unwrap_or_else(|| status.to_string()),
        };
    }

    Error::Airtable {
        status: status.as_u16(),
        message: message
            .or_else(|| error_type.clone())
            .unwrap_or_else(|| status.to_string()),
        error_type,
    }
}
