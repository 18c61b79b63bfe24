// ── Namespace domain type ──
//
// Known as a workspace in GeoServer. Labels are unique within a server.

use serde::{Deserialize, Serialize};

use super::entity_id::EntityId;
use super::kind::{Entity, EntityKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Namespace {
    pub id: EntityId,
    pub label: String,
    pub title: String,
    /// Namespace URI.
    pub namespace: String,
    #[serde(default)]
    pub isolated: bool,
    pub relationships: NamespaceRelationships,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceRelationships {
    pub servers: EntityId,
}

impl Entity for Namespace {
    const KIND: EntityKind = EntityKind::Namespace;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn scope(&self) -> Option<&EntityId> {
        Some(&self.relationships.servers)
    }
}
