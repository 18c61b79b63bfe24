// GeoServer REST catalogue client (read-only).

mod client;
pub mod models;

pub use client::GeoServerClient;
