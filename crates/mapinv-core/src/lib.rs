//! Inventory model and one-way Airtable reconciliation for map servers.
//!
//! This crate owns the domain model and business logic of the `mapinv`
//! workspace:
//!
//! - **Domain model** ([`model`]) — six entity kinds (servers, namespaces,
//!   repositories, styles, layers, layer groups) with typed enumerations
//!   and explicit relationship fields keyed by [`EntityId`].
//!
//! - **[`Catalogue`]** — the six [`Collection`]s of one inventory, loaded
//!   from and saved to the JSON data file with relationship validation.
//!
//! - **[`Fetcher`]** — crawls GeoServer instances into a `Catalogue`.
//!
//! - **[`Inventory`]** — one [`Reconciler`] per kind, driven in dependency
//!   order. Each pass classifies local entities as missing, current or
//!   outdated and remote records as orphaned, then creates, updates and
//!   deletes remote records until the table mirrors the catalogue.
//!
//! Core never reads config files; callers hand in [`AirtableConfig`] and
//! [`GeoServerSource`] values.

pub mod config;
pub mod error;
pub mod fetch;
pub mod model;
pub mod store;
pub mod sync;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{AirtableConfig, GeoServerSource, TableNames, TlsVerification};
pub use error::CoreError;
pub use fetch::Fetcher;
pub use store::{Catalogue, Collection};
pub use sync::{
    Inventory, KindStatus, MemoryTable, RecordTable, Reconciler, ResetReport, StatusCounts,
    StatusReport, SyncOutcome, SyncReport, SyncStatus, Tables,
};

pub use model::{
    Entity, EntityId, EntityKind, Layer, LayerGeometry, LayerGroup, LayerType, Namespace,
    RemoteId, Repository, RepositoryType, Server, ServerType, Service, Style, StyleType,
};
