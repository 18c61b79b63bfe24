// Airtable record API client.
//
// Base path: /v0/{base_id}/{table_name}
// Auth: `Authorization: Bearer <api key>`

mod client;
pub mod models;

pub use client::{AirtableClient, Table};
pub use models::{Fields, Record};
