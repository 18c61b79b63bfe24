// ── Reconciliation engine ──
//
// One `Reconciler` per entity kind. `stat()` rebuilds every piece of
// state from scratch: outbound records from the local collection, inbound
// records from a full table scan, the identifier bridge, and the four
// classification lists. The write operations act on the classification
// of the last pass and never update it; callers re-stat to observe.

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::bridge::IdBridge;
use super::record::{ID_FIELD, RemoteRecord, Tracked};
use super::table::{RawRecord, RecordTable};
use crate::error::CoreError;
use crate::model::{Entity, EntityId, EntityKind, RemoteId};
use crate::store::Collection;

// ── Status ───────────────────────────────────────────────────────────

/// Classification of one kind after a reconciliation pass.
///
/// Every local id appears in exactly one of `missing`, `current` and
/// `outdated`. `orphaned` holds the ids declared by remote records that
/// match no local entity, which need not be valid local ids.
/// `duplicates` holds the remote ids of extra records declaring a local id
/// that another record already claimed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncStatus {
    pub missing: Vec<EntityId>,
    pub current: Vec<EntityId>,
    pub outdated: Vec<EntityId>,
    pub orphaned: Vec<String>,
    pub duplicates: Vec<RemoteId>,
}

impl SyncStatus {
    pub fn counts(&self) -> StatusCounts {
        StatusCounts {
            missing: self.missing.len(),
            current: self.current.len(),
            outdated: self.outdated.len(),
            orphaned: self.orphaned.len(),
            duplicates: self.duplicates.len(),
        }
    }

    /// Nothing to create, update or delete.
    pub fn is_in_sync(&self) -> bool {
        self.missing.is_empty()
            && self.outdated.is_empty()
            && self.orphaned.is_empty()
            && self.duplicates.is_empty()
    }

    fn clear(&mut self) {
        self.missing.clear();
        self.current.clear();
        self.outdated.clear();
        self.orphaned.clear();
        self.duplicates.clear();
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub missing: usize,
    pub current: usize,
    pub outdated: usize,
    pub orphaned: usize,
    pub duplicates: usize,
}

impl StatusCounts {
    pub fn add(&mut self, other: StatusCounts) {
        self.missing += other.missing;
        self.current += other.current;
        self.outdated += other.outdated;
        self.orphaned += other.orphaned;
        self.duplicates += other.duplicates;
    }
}

/// Remote writes made by one `sync()` or `reset()`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncOutcome {
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
}

/// A remote record with no local counterpart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Orphan {
    /// The record's `ID` field, or its remote id when that is absent.
    pub declared_id: String,
    pub remote_id: RemoteId,
}

// ── Reconciler ───────────────────────────────────────────────────────

pub struct Reconciler<R: RemoteRecord, T> {
    table: T,
    entities: Collection<R::Entity>,
    local: IndexMap<EntityId, Tracked<R>>,
    remote: IndexMap<EntityId, Tracked<R>>,
    bridge: IdBridge,
    orphans: Vec<Orphan>,
    duplicates: Vec<RemoteId>,
    seen: Vec<RemoteId>,
    status: SyncStatus,
}

impl<R: RemoteRecord, T: RecordTable> Reconciler<R, T> {
    pub fn new(entities: Collection<R::Entity>, table: T) -> Self {
        Self {
            table,
            entities,
            local: IndexMap::new(),
            remote: IndexMap::new(),
            bridge: IdBridge::new(Self::kind()),
            orphans: Vec::new(),
            duplicates: Vec::new(),
            seen: Vec::new(),
            status: SyncStatus::default(),
        }
    }

    pub fn kind() -> EntityKind {
        <R::Entity as Entity>::KIND
    }

    pub fn table(&self) -> &T {
        &self.table
    }

    pub fn entities(&self) -> &Collection<R::Entity> {
        &self.entities
    }

    /// Local↔remote id pairs found by the last pass.
    pub fn bridge(&self) -> &IdBridge {
        &self.bridge
    }

    /// Classification from the last pass.
    pub fn last_status(&self) -> &SyncStatus {
        &self.status
    }

    pub fn orphans(&self) -> &[Orphan] {
        &self.orphans
    }

    /// Extra remote records declaring a local id already seen this pass.
    pub fn duplicates(&self) -> &[RemoteId] {
        &self.duplicates
    }

    // ── Lookups ──────────────────────────────────────────────────────

    pub fn get_by_id(&self, id: &EntityId) -> Result<&Tracked<R>, CoreError> {
        self.local.get(id).ok_or_else(|| CoreError::NotFound {
            kind: Self::kind(),
            identifier: id.to_string(),
        })
    }

    pub fn get_by_remote_id(&self, remote_id: &RemoteId) -> Result<&Tracked<R>, CoreError> {
        let local_id = self.bridge.local_id(remote_id)?;
        self.get_by_id(local_id)
    }

    // ── Reconciliation pass ──────────────────────────────────────────

    /// Rescan the remote table and classify every local entity. The
    /// bridges in `links` must already hold this pass's ids for the
    /// kinds referenced.
    pub async fn stat(&mut self, links: R::Links<'_>) -> Result<(), CoreError> {
        let kind = Self::kind();
        self.remote.clear();
        self.bridge.clear();
        self.orphans.clear();
        self.duplicates.clear();
        self.seen.clear();
        self.status.clear();

        self.local = self
            .entities
            .iter()
            .map(|entity| {
                let record = R::to_remote(entity, links);
                (entity.id().clone(), Tracked::local(record))
            })
            .collect();

        let raw_records = self.table.get_all().await?;
        debug!(%kind, table = self.table.name(), count = raw_records.len(), "scanned remote table");

        for raw in raw_records {
            self.seen.push(raw.id.clone());
            match R::from_remote(&raw, links) {
                Ok(record) => self.accept(raw.id, record),
                Err(e) if e.is_record_local() => self.accept_unreadable(&raw, &e),
                Err(e) => return Err(e),
            }
        }

        for (id, tracked) in &self.local {
            let Some(remote_id) = &tracked.remote_id else {
                debug!(%kind, %id, "missing");
                self.status.missing.push(id.clone());
                continue;
            };
            let current = self
                .remote
                .get(id)
                .is_some_and(|remote| remote.record == tracked.record);
            if current {
                self.status.current.push(id.clone());
            } else {
                debug!(%kind, %id, %remote_id, "outdated");
                self.status.outdated.push(id.clone());
            }
        }
        self.status.orphaned = self.orphans.iter().map(|o| o.declared_id.clone()).collect();
        self.status.duplicates.clone_from(&self.duplicates);

        let counts = self.status.counts();
        info!(
            %kind,
            missing = counts.missing,
            current = counts.current,
            outdated = counts.outdated,
            orphaned = counts.orphaned,
            duplicates = counts.duplicates,
            "reconciled"
        );
        Ok(())
    }

    fn accept(&mut self, remote_id: RemoteId, record: R) {
        let kind = Self::kind();
        let local_id = record.local_id().clone();
        if self.bridge.remote_id(&local_id).is_some() {
            warn!(%kind, %local_id, %remote_id, "duplicate remote record");
            self.duplicates.push(remote_id);
            return;
        }
        let Some(local) = self.local.get_mut(&local_id) else {
            warn!(%kind, %local_id, %remote_id, "orphaned remote record");
            self.orphans.push(Orphan {
                declared_id: local_id.to_string(),
                remote_id,
            });
            return;
        };
        local.remote_id = Some(remote_id.clone());
        self.bridge.link(local_id.clone(), remote_id.clone());
        self.remote
            .insert(local_id, Tracked::remote(remote_id, record));
    }

    /// A record whose references no longer resolve, that lacks a
    /// required field, or holds a cell of the wrong type. When it still declares a known local id it is
    /// correlated and left to be overwritten as outdated; otherwise it is
    /// an orphan.
    fn accept_unreadable(&mut self, raw: &RawRecord, error: &CoreError) {
        let kind = Self::kind();
        let declared = raw
            .fields
            .get(ID_FIELD)
            .and_then(serde_json::Value::as_str)
            .filter(|s| !s.is_empty());

        if let Some(declared) = declared {
            let local_id = EntityId::from(declared);
            let claimed = self.bridge.remote_id(&local_id).is_some();
            if let Some(local) = self.local.get_mut(&local_id) {
                if claimed {
                    warn!(%kind, %local_id, remote_id = %raw.id, "duplicate remote record");
                    self.duplicates.push(raw.id.clone());
                } else {
                    warn!(%kind, %local_id, remote_id = %raw.id, %error, "unreadable remote record");
                    local.remote_id = Some(raw.id.clone());
                    self.bridge.link(local_id, raw.id.clone());
                }
                return;
            }
        }

        let declared_id = declared.map_or_else(|| raw.id.to_string(), ToOwned::to_owned);
        warn!(%kind, %declared_id, remote_id = %raw.id, %error, "orphaned remote record");
        self.orphans.push(Orphan {
            declared_id,
            remote_id: raw.id.clone(),
        });
    }

    // ── Writes ───────────────────────────────────────────────────────

    /// Create a remote record for every missing entity.
    pub async fn load(&mut self) -> Result<usize, CoreError> {
        if self.status.missing.is_empty() {
            return Ok(0);
        }
        let fields = self
            .status
            .missing
            .iter()
            .map(|id| self.get_by_id(id)?.record.to_fields())
            .collect::<Result<Vec<_>, _>>()?;
        let created = self.table.batch_insert(fields).await?;
        info!(kind = %Self::kind(), table = self.table.name(), count = created.len(), "created records");
        Ok(created.len())
    }

    /// Create missing records, overwrite outdated ones, then delete
    /// orphaned and duplicate records.
    pub async fn sync(&mut self) -> Result<SyncOutcome, CoreError> {
        let kind = Self::kind();
        let created = self.load().await?;

        let mut updated = 0;
        for id in &self.status.outdated {
            let tracked = self.get_by_id(id)?;
            let remote_id = tracked.remote_id.as_ref().ok_or_else(|| {
                CoreError::Internal(format!("{kind} {id} is outdated but has no remote id"))
            })?;
            self.table
                .update(remote_id, tracked.record.to_fields()?)
                .await?;
            updated += 1;
        }
        if updated > 0 {
            info!(%kind, table = self.table.name(), count = updated, "updated records");
        }

        let stale: Vec<RemoteId> = self
            .orphans
            .iter()
            .map(|o| o.remote_id.clone())
            .chain(self.duplicates.iter().cloned())
            .collect();
        let deleted = stale.len();
        if deleted > 0 {
            self.table.batch_delete(stale).await?;
            info!(%kind, table = self.table.name(), count = deleted, "deleted records");
        }

        Ok(SyncOutcome {
            created,
            updated,
            deleted,
        })
    }

    /// Delete every record seen by the last pass, whatever its status.
    pub async fn reset(&mut self) -> Result<usize, CoreError> {
        if self.seen.is_empty() {
            return Ok(0);
        }
        let ids = std::mem::take(&mut self.seen);
        let count = ids.len();
        self.table.batch_delete(ids).await?;
        info!(kind = %Self::kind(), table = self.table.name(), count, "deleted all records");
        Ok(count)
    }

    /// Run a fresh pass and return its classification.
    pub async fn status(&mut self, links: R::Links<'_>) -> Result<SyncStatus, CoreError> {
        self.stat(links).await?;
        Ok(self.status.clone())
    }
}
