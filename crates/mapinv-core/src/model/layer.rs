// ── Layer domain type ──

use serde::{Deserialize, Serialize};

use super::entity_id::EntityId;
use super::enums::{LayerGeometry, LayerType, Service};
use super::kind::{Entity, EntityKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layer {
    pub id: EntityId,
    pub label: String,
    pub title: String,
    #[serde(rename = "type")]
    pub layer_type: LayerType,
    /// Vector layers only.
    #[serde(default)]
    pub geometry: Option<LayerGeometry>,
    #[serde(default)]
    pub services: Vec<Service>,
    /// Backing table or view, for database repositories.
    #[serde(default)]
    pub table_view: Option<String>,
    pub relationships: LayerRelationships,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerRelationships {
    pub namespaces: EntityId,
    pub repositories: EntityId,
    /// Order carries no meaning.
    #[serde(default)]
    pub styles: Vec<EntityId>,
}

impl Entity for Layer {
    const KIND: EntityKind = EntityKind::Layer;

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
