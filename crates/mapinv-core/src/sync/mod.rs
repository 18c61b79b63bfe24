// ── One-way sync into Airtable ──
//
// bridge     local id ↔ Airtable record id, per kind and per pass
// record     per-kind table representation and field mapping
// table      the remote-table capability (Airtable, in-memory)
// reconcile  classification and corrective writes for one kind
// inventory  the six kinds driven in dependency order

pub mod bridge;
pub mod inventory;
pub mod reconcile;
pub mod record;
pub mod table;

pub use bridge::IdBridge;
pub use inventory::{Inventory, KindStatus, ResetReport, StatusReport, SyncReport, Tables};
pub use reconcile::{Orphan, Reconciler, StatusCounts, SyncOutcome, SyncStatus};
pub use record::{Link, RemoteRecord, Tracked};
pub use table::{CallCounts, MemoryTable, RawRecord, RecordTable};
