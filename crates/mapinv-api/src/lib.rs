// mapinv-api: async clients for the Airtable record API and the GeoServer REST catalogue

pub mod airtable;
pub mod error;
pub mod geoserver;
pub mod transport;

pub use airtable::{AirtableClient, Fields, Record, Table};
pub use error::Error;
pub use geoserver::GeoServerClient;
pub use transport::{TlsMode, TransportConfig};

/// First 200 characters of a response body, for error messages.
pub(crate) fn body_preview(body: &str) -> &str {
    let end = body.char_indices().nth(200).map_or(body.len(), |(i, _)| i);
    &body[..end]
}
