// ── Identifier bridge ──
//
// Pairs local ids with the Airtable record ids found for them during the
// last reconciliation pass. Rebuilt from scratch on every pass and never
// persisted.

use std::collections::HashMap;

use crate::error::CoreError;
use crate::model::{EntityId, EntityKind, RemoteId};

#[derive(Debug, Clone)]
pub struct IdBridge {
    kind: EntityKind,
    to_remote: HashMap<EntityId, RemoteId>,
    to_local: HashMap<RemoteId, EntityId>,
}

impl IdBridge {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            to_remote: HashMap::new(),
            to_local: HashMap::new(),
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Record that `local` is stored remotely as `remote`.
    pub fn link(&mut self, local: EntityId, remote: RemoteId) {
        if let Some(previous) = self.to_remote.insert(local.clone(), remote.clone()) {
            self.to_local.remove(&previous);
        }
        self.to_local.insert(remote, local);
    }

    /// Remote id of a local entity, if it has been seen remotely.
    pub fn remote_id(&self, local: &EntityId) -> Option<&RemoteId> {
        self.to_remote.get(local)
    }

    /// Local id behind a remote record. Fails with `NotFound` when the
    /// remote id was not correlated in the last pass.
    pub fn local_id(&self, remote: &RemoteId) -> Result<&EntityId, CoreError> {
        self.to_local.get(remote).ok_or_else(|| CoreError::NotFound {
            kind: self.kind,
            identifier: remote.to_string(),
        })
    }

    pub fn clear(&mut self) {
        self.to_remote.clear();
        self.to_local.clear();
    }

    pub fn len(&self) -> usize {
        self.to_remote.len()
    }

    pub fn is_empty(&self) -> bool {
        self.to_remote.is_empty()
    }
}
