// ── Remote table capability ──
//
// The four operations the reconciler needs from a remote table. The
// Airtable client implements them over HTTP; `MemoryTable` keeps records
// in-process for tests and dry runs.

use std::future::Future;
use std::sync::{Mutex, PoisonError};

use indexmap::IndexMap;
use mapinv_api::Fields;
use tracing::debug;

use crate::error::CoreError;
use crate::model::RemoteId;

/// A record as read back from a remote table.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub id: RemoteId,
    pub fields: Fields,
}

impl From<mapinv_api::Record> for RawRecord {
    fn from(record: mapinv_api::Record) -> Self {
        Self {
            id: record.id.into(),
            fields: record.fields,
        }
    }
}

/// A remote collection of records for one entity kind.
pub trait RecordTable: Send + Sync {
    /// Table name, for logs and reports.
    fn name(&self) -> &str;

    /// Every record currently in the table.
    fn get_all(&self) -> impl Future<Output = Result<Vec<RawRecord>, CoreError>> + Send;

    /// Create records, returning the ids the table assigned.
    fn batch_insert(
        &self,
        records: Vec<Fields>,
    ) -> impl Future<Output = Result<Vec<RemoteId>, CoreError>> + Send;

    /// Overwrite the named fields of one record.
    fn update(
        &self,
        id: &RemoteId,
        fields: Fields,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;

    fn batch_delete(
        &self,
        ids: Vec<RemoteId>,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;
}

// ── Airtable ─────────────────────────────────────────────────────────

impl RecordTable for mapinv_api::Table {
    fn name(&self) -> &str {
        mapinv_api::Table::name(self)
    }

    async fn get_all(&self) -> Result<Vec<RawRecord>, CoreError> {
        let records = self.list_records().await?;
        Ok(records.into_iter().map(RawRecord::from).collect())
    }

    async fn batch_insert(&self, records: Vec<Fields>) -> Result<Vec<RemoteId>, CoreError> {
        let created = self.create_records(&records).await?;
        Ok(created.into_iter().map(|r| RemoteId::from(r.id)).collect())
    }

    async fn update(&self, id: &RemoteId, fields: Fields) -> Result<(), CoreError> {
        self.update_record(id.as_str(), &fields).await?;
        Ok(())
    }

    async fn batch_delete(&self, ids: Vec<RemoteId>) -> Result<(), CoreError> {
        let ids: Vec<String> = ids.into_iter().map(RemoteId::into_string).collect();
        self.delete_records(&ids).await?;
        Ok(())
    }
}

// ── In-memory ────────────────────────────────────────────────────────

/// Number of calls made against a [`MemoryTable`], per operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub get_all: usize,
    pub batch_insert: usize,
    pub update: usize,
    pub batch_delete: usize,
}

#[derive(Debug, Default)]
struct MemoryState {
    records: IndexMap<RemoteId, Fields>,
    next_id: u64,
    calls: CallCounts,
}

impl MemoryState {
    fn mint(&mut self) -> RemoteId {
        self.next_id += 1;
        RemoteId::from(format!("rec{:014}", self.next_id))
    }
}

/// An in-process remote table with Airtable's semantics: ids are minted
/// on insert, updates merge fields, unknown ids are rejected.
#[derive(Debug, Default)]
pub struct MemoryTable {
    name: String,
    state: Mutex<MemoryState>,
}

impl MemoryTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Mutex::default(),
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert a record directly, bypassing call accounting.
    pub fn seed(&self, fields: Fields) -> RemoteId {
        let mut state = self.state();
        let id = state.mint();
        state.records.insert(id.clone(), fields);
        id
    }

    /// Overwrite one field of a stored record, bypassing call accounting.
    pub fn set_field(&self, id: &RemoteId, field: &str, value: serde_json::Value) -> bool {
        match self.state().records.get_mut(id) {
            Some(fields) => {
                fields.insert(field.to_owned(), value);
                true
            }
            None => false,
        }
    }

    /// Snapshot of the stored records, in insertion order.
    pub fn records(&self) -> Vec<RawRecord> {
        self.state()
            .records
            .iter()
            .map(|(id, fields)| RawRecord {
                id: id.clone(),
                fields: fields.clone(),
            })
            .collect()
    }

    pub fn get(&self, id: &RemoteId) -> Option<Fields> {
        self.state().records.get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.state().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state().records.is_empty()
    }

    pub fn calls(&self) -> CallCounts {
        self.state().calls
    }

    fn unknown(&self, id: &RemoteId) -> CoreError {
        CoreError::Api {
            message: format!("Record {id} not found in table {}", self.name),
            code: Some("NOT_FOUND".into()),
            status: Some(404),
        }
    }
}

impl RecordTable for MemoryTable {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get_all(&self) -> Result<Vec<RawRecord>, CoreError> {
        self.state().calls.get_all += 1;
        Ok(self.records())
    }

    async fn batch_insert(&self, records: Vec<Fields>) -> Result<Vec<RemoteId>, CoreError> {
        let mut state = self.state();
        state.calls.batch_insert += 1;
        let ids = records
            .into_iter()
            .map(|fields| {
                let id = state.mint();
                state.records.insert(id.clone(), fields);
                id
            })
            .collect::<Vec<_>>();
        debug!(table = %self.name, count = ids.len(), "inserted records");
        Ok(ids)
    }

    async fn update(&self, id: &RemoteId, fields: Fields) -> Result<(), CoreError> {
        let mut state = self.state();
        state.calls.update += 1;
        let Some(existing) = state.records.get_mut(id) else {
            return Err(self.unknown(id));
        };
        existing.extend(fields);
        Ok(())
    }

    async fn batch_delete(&self, ids: Vec<RemoteId>) -> Result<(), CoreError> {
        let mut state = self.state();
        state.calls.batch_delete += 1;
        if let Some(missing) = ids.iter().find(|id| !state.records.contains_key(*id)) {
            return Err(self.unknown(missing));
        }
        for id in &ids {
            state.records.shift_remove(id);
        }
        debug!(table = %self.name, count = ids.len(), "deleted records");
        Ok(())
    }
}
