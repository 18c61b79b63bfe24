// ── Inventory orchestrator ──
//
// Owns one reconciler per kind and drives them in dependency order
// (servers, namespaces, repositories, styles, layers, layer groups),
// handing each kind the bridges of the kinds it references. A kind is
// only ever stat'ed after its predecessors in the same invocation.

use serde::Serialize;
use tracing::info;

use super::reconcile::{Reconciler, StatusCounts, SyncOutcome, SyncStatus};
use super::record::{
    LayerGroupLinks, LayerGroupRecord, LayerLinks, LayerRecord, NamespaceLinks, NamespaceRecord,
    RepositoryLinks, RepositoryRecord, ServerRecord, StyleLinks, StyleRecord,
};
use super::table::RecordTable;
use crate::error::CoreError;
use crate::model::EntityKind;
use crate::store::Catalogue;

// ── Tables ───────────────────────────────────────────────────────────

/// One remote table per kind.
#[derive(Debug)]
pub struct Tables<T> {
    pub servers: T,
    pub namespaces: T,
    pub repositories: T,
    pub styles: T,
    pub layers: T,
    pub layer_groups: T,
}

impl<T> Tables<T> {
    /// Build each table from its kind, stopping at the first failure.
    pub fn try_from_fn<E>(mut f: impl FnMut(EntityKind) -> Result<T, E>) -> Result<Self, E> {
        Ok(Self {
            servers: f(EntityKind::Server)?,
            namespaces: f(EntityKind::Namespace)?,
            repositories: f(EntityKind::Repository)?,
            styles: f(EntityKind::Style)?,
            layers: f(EntityKind::Layer)?,
            layer_groups: f(EntityKind::LayerGroup)?,
        })
    }
}

// ── Reports ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KindStatus {
    pub kind: EntityKind,
    pub table: String,
    pub counts: StatusCounts,
    pub status: SyncStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub kinds: Vec<KindStatus>,
    pub totals: StatusCounts,
}

impl StatusReport {
    fn push(&mut self, kind: KindStatus) {
        self.totals.add(kind.counts);
        self.kinds.push(kind);
    }

    pub fn is_in_sync(&self) -> bool {
        self.kinds.iter().all(|k| k.status.is_in_sync())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub kind: EntityKind,
    pub table: String,
    pub before: StatusCounts,
    pub outcome: SyncOutcome,
    pub after: StatusCounts,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResetReport {
    pub kind: EntityKind,
    pub table: String,
    pub deleted: usize,
}

// ── Inventory ────────────────────────────────────────────────────────

pub struct Inventory<T: RecordTable> {
    servers: Reconciler<ServerRecord, T>,
    namespaces: Reconciler<NamespaceRecord, T>,
    repositories: Reconciler<RepositoryRecord, T>,
    styles: Reconciler<StyleRecord, T>,
    layers: Reconciler<LayerRecord, T>,
    layer_groups: Reconciler<LayerGroupRecord, T>,
}

impl<T: RecordTable> Inventory<T> {
    pub fn new(catalogue: Catalogue, tables: Tables<T>) -> Self {
        Self {
            servers: Reconciler::new(catalogue.servers, tables.servers),
            namespaces: Reconciler::new(catalogue.namespaces, tables.namespaces),
            repositories: Reconciler::new(catalogue.repositories, tables.repositories),
            styles: Reconciler::new(catalogue.styles, tables.styles),
            layers: Reconciler::new(catalogue.layers, tables.layers),
            layer_groups: Reconciler::new(catalogue.layer_groups, tables.layer_groups),
        }
    }

    pub fn servers(&self) -> &Reconciler<ServerRecord, T> {
        &self.servers
    }

    pub fn namespaces(&self) -> &Reconciler<NamespaceRecord, T> {
        &self.namespaces
    }

    pub fn repositories(&self) -> &Reconciler<RepositoryRecord, T> {
        &self.repositories
    }

    pub fn styles(&self) -> &Reconciler<StyleRecord, T> {
        &self.styles
    }

    pub fn layers(&self) -> &Reconciler<LayerRecord, T> {
        &self.layers
    }

    pub fn layer_groups(&self) -> &Reconciler<LayerGroupRecord, T> {
        &self.layer_groups
    }

    /// Remote table name for a kind.
    pub fn table_name(&self, kind: EntityKind) -> &str {
        match kind {
            EntityKind::Server => self.servers.table().name(),
            EntityKind::Namespace => self.namespaces.table().name(),
            EntityKind::Repository => self.repositories.table().name(),
            EntityKind::Style => self.styles.table().name(),
            EntityKind::Layer => self.layers.table().name(),
            EntityKind::LayerGroup => self.layer_groups.table().name(),
        }
    }

    // ── Per-kind dispatch ────────────────────────────────────────────

    async fn stat(&mut self, kind: EntityKind) -> Result<(), CoreError> {
        match kind {
            EntityKind::Server => self.servers.stat(()).await,
            EntityKind::Namespace => {
                let links = NamespaceLinks {
                    servers: self.servers.bridge(),
                };
                self.namespaces.stat(links).await
            }
            EntityKind::Repository => {
                let links = RepositoryLinks {
                    namespaces: self.namespaces.bridge(),
                };
                self.repositories.stat(links).await
            }
            EntityKind::Style => {
                let links = StyleLinks {
                    namespaces: self.namespaces.bridge(),
                };
                self.styles.stat(links).await
            }
            EntityKind::Layer => {
                let links = LayerLinks {
                    namespaces: self.namespaces.bridge(),
                    repositories: self.repositories.bridge(),
                    styles: self.styles.bridge(),
                };
                self.layers.stat(links).await
            }
            EntityKind::LayerGroup => {
                let links = LayerGroupLinks {
                    namespaces: self.namespaces.bridge(),
                    layers: self.layers.bridge(),
                    styles: self.styles.bridge(),
                };
                self.layer_groups.stat(links).await
            }
        }
    }

    async fn stat_predecessors(&mut self, kind: EntityKind) -> Result<(), CoreError> {
        for &predecessor in kind.predecessors() {
            self.stat(predecessor).await?;
        }
        Ok(())
    }

    fn last_status(&self, kind: EntityKind) -> &SyncStatus {
        match kind {
            EntityKind::Server => self.servers.last_status(),
            EntityKind::Namespace => self.namespaces.last_status(),
            EntityKind::Repository => self.repositories.last_status(),
            EntityKind::Style => self.styles.last_status(),
            EntityKind::Layer => self.layers.last_status(),
            EntityKind::LayerGroup => self.layer_groups.last_status(),
        }
    }

    async fn sync_stated(&mut self, kind: EntityKind) -> Result<SyncOutcome, CoreError> {
        match kind {
            EntityKind::Server => self.servers.sync().await,
            EntityKind::Namespace => self.namespaces.sync().await,
            EntityKind::Repository => self.repositories.sync().await,
            EntityKind::Style => self.styles.sync().await,
            EntityKind::Layer => self.layers.sync().await,
            EntityKind::LayerGroup => self.layer_groups.sync().await,
        }
    }

    async fn reset_stated(&mut self, kind: EntityKind) -> Result<usize, CoreError> {
        match kind {
            EntityKind::Server => self.servers.reset().await,
            EntityKind::Namespace => self.namespaces.reset().await,
            EntityKind::Repository => self.repositories.reset().await,
            EntityKind::Style => self.styles.reset().await,
            EntityKind::Layer => self.layers.reset().await,
            EntityKind::LayerGroup => self.layer_groups.reset().await,
        }
    }

    fn kind_status(&self, kind: EntityKind) -> KindStatus {
        let status = self.last_status(kind).clone();
        KindStatus {
            kind,
            table: self.table_name(kind).to_owned(),
            counts: status.counts(),
            status,
        }
    }

    async fn sync_after_predecessors(&mut self, kind: EntityKind) -> Result<SyncReport, CoreError> {
        self.stat(kind).await?;
        let before = self.last_status(kind).counts();
        let outcome = self.sync_stated(kind).await?;
        self.stat(kind).await?;
        let after = self.last_status(kind).counts();
        info!(
            %kind,
            created = outcome.created,
            updated = outcome.updated,
            deleted = outcome.deleted,
            "synced"
        );
        Ok(SyncReport {
            kind,
            table: self.table_name(kind).to_owned(),
            before,
            outcome,
            after,
        })
    }

    // ━━ Public API ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    pub async fn status(&mut self, kind: EntityKind) -> Result<KindStatus, CoreError> {
        self.stat_predecessors(kind).await?;
        self.stat(kind).await?;
        Ok(self.kind_status(kind))
    }

    pub async fn status_all(&mut self) -> Result<StatusReport, CoreError> {
        let mut report = StatusReport::default();
        for kind in EntityKind::ALL {
            self.stat(kind).await?;
            report.push(self.kind_status(kind));
        }
        Ok(report)
    }

    pub async fn sync(&mut self, kind: EntityKind) -> Result<SyncReport, CoreError> {
        self.stat_predecessors(kind).await?;
        self.sync_after_predecessors(kind).await
    }

    /// Sync every kind in dependency order; each kind is re-stat'ed
    /// after its writes so the next kind links to the new records.
    pub async fn sync_all(&mut self) -> Result<Vec<SyncReport>, CoreError> {
        let mut reports = Vec::with_capacity(EntityKind::ALL.len());
        for kind in EntityKind::ALL {
            reports.push(self.sync_after_predecessors(kind).await?);
        }
        Ok(reports)
    }

    /// Delete every remote record of one kind. Records of later kinds
    /// that referenced them become orphans on their next pass.
    pub async fn reset(&mut self, kind: EntityKind) -> Result<ResetReport, CoreError> {
        self.stat_predecessors(kind).await?;
        self.stat(kind).await?;
        let deleted = self.reset_stated(kind).await?;
        Ok(ResetReport {
            kind,
            table: self.table_name(kind).to_owned(),
            deleted,
        })
    }

    /// Delete every remote record of every kind, dependants first.
    pub async fn reset_all(&mut self) -> Result<Vec<ResetReport>, CoreError> {
        for kind in EntityKind::ALL {
            self.stat(kind).await?;
        }
        let mut reports = Vec::with_capacity(EntityKind::ALL.len());
        for kind in EntityKind::ALL.into_iter().rev() {
            let deleted = self.reset_stated(kind).await?;
            reports.push(ResetReport {
                kind,
                table: self.table_name(kind).to_owned(),
                deleted,
            });
        }
        Ok(reports)
    }
}
