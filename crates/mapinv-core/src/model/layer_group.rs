// ── Layer group domain type ──
//
// Layers treated as a single, indivisible unit (a base map built from
// several layers, resolution-dependent detail, or an alias for
// whichever layer is current).

use serde::{Deserialize, Serialize};

use super::entity_id::EntityId;
use super::enums::Service;
use super::kind::{Entity, EntityKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerGroup {
    pub id: EntityId,
    pub label: String,
    pub title: String,
    #[serde(default)]
    pub services: Vec<Service>,
    #[serde(default)]
    pub relationships: LayerGroupRelationships,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerGroupRelationships {
    #[serde(default)]
    pub namespaces: Option<EntityId>,
    #[serde(default)]
    pub layers: Vec<EntityId>,
    #[serde(default)]
    pub styles: Vec<EntityId>,
}

impl Entity for LayerGroup {
    const KIND: EntityKind = EntityKind::LayerGroup;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn scope(&self) -> Option<&EntityId> {
        self.relationships.namespaces.as_ref()
    }
}
