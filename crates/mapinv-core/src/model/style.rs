// ── Style domain type ──

use serde::{Deserialize, Serialize};

use super::entity_id::EntityId;
use super::enums::StyleType;
use super::kind::{Entity, EntityKind};

/// Symbology and labelling rules for presenting a layer.
///
/// Global styles belong to no namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Style {
    pub id: EntityId,
    pub label: String,
    pub title: String,
    #[serde(rename = "type")]
    pub style_type: StyleType,
    #[serde(default)]
    pub relationships: StyleRelationships,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleRelationships {
    #[serde(default)]
    pub namespaces: Option<EntityId>,
}

impl Entity for Style {
    const KIND: EntityKind = EntityKind::Style;

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
