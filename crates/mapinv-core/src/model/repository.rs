// ── Repository domain type ──
//
// A data source backing one or more layers; a store in GeoServer.

use serde::{Deserialize, Serialize};

use super::entity_id::EntityId;
use super::enums::RepositoryType;
use super::kind::{Entity, EntityKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub id: EntityId,
    pub label: String,
    pub title: String,
    #[serde(rename = "type")]
    pub repository_type: RepositoryType,
    /// Connection details, PostGIS only.
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub schema: Option<String>,
    pub relationships: RepositoryRelationships,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryRelationships {
    pub namespaces: EntityId,
}

impl Entity for Repository {
    const KIND: EntityKind = EntityKind::Repository;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn scope(&self) -> Option<&EntityId> {
        Some(&self.relationships.namespaces)
    }
}
