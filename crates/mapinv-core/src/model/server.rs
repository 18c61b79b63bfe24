// ── Server domain type ──

use serde::{Deserialize, Serialize};

use super::entity_id::EntityId;
use super::enums::ServerType;
use super::kind::{Entity, EntityKind};

/// An application or platform that provides access to layers.
///
/// Server ids come from configuration rather than being minted at fetch
/// time, so they stay stable across fetches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    pub id: EntityId,
    pub label: String,
    pub hostname: String,
    #[serde(rename = "type")]
    pub server_type: ServerType,
    pub version: String,
}

impl Entity for Server {
    const KIND: EntityKind = EntityKind::Server;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn scope(&self) -> Option<&EntityId> {
        None
    }
}
