// ── Entity collection ──
//
// Insertion-ordered map from `EntityId` to entity, with label lookups.
// Entities are immutable once inserted.

use indexmap::IndexMap;
use serde::{Serialize, Serializer};

use crate::error::CoreError;
use crate::model::{Entity, EntityId};

/// All entities of one kind, keyed by local id.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection<T: Entity> {
    items: IndexMap<EntityId, T>,
}

impl<T: Entity> Default for Collection<T> {
    fn default() -> Self {
        Self {
            items: IndexMap::new(),
        }
    }
}

impl<T: Entity> Collection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from entities, rejecting repeated ids.
    pub fn from_entities(entities: impl IntoIterator<Item = T>) -> Result<Self, CoreError> {
        let mut collection = Self::new();
        for entity in entities {
            collection.insert(entity)?;
        }
        Ok(collection)
    }

    /// Add an entity. Ids are unique within a collection.
    pub fn insert(&mut self, entity: T) -> Result<(), CoreError> {
        if self.items.contains_key(entity.id()) {
            return Err(CoreError::DuplicateId {
                kind: T::KIND,
                id: entity.id().to_string(),
            });
        }
        self.items.insert(entity.id().clone(), entity);
        Ok(())
    }

    pub fn get(&self, id: &EntityId) -> Option<&T> {
        self.items.get(id)
    }

    /// Like [`Collection::get`], failing with `NotFound`.
    pub fn require(&self, id: &EntityId) -> Result<&T, CoreError> {
        self.get(id).ok_or_else(|| CoreError::NotFound {
            kind: T::KIND,
            identifier: id.to_string(),
        })
    }

    pub fn contains(&self, id: &EntityId) -> bool {
        self.items.contains_key(id)
    }

    /// First entity with this label in any scope.
    pub fn get_by_label(&self, label: &str) -> Option<&T> {
        self.items.values().find(|e| e.label() == label)
    }

    /// Entity with this label in exactly this scope (`None` = global).
    pub fn get_by_scoped_label(&self, label: &str, scope: Option<&EntityId>) -> Option<&T> {
        self.items
            .values()
            .find(|e| e.label() == label && e.scope() == scope)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = &EntityId> {
        self.items.keys()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<'a, T: Entity> IntoIterator for &'a Collection<T> {
    type Item = &'a T;
    type IntoIter = indexmap::map::Values<'a, EntityId, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.values()
    }
}

/// Serializes as a plain array, the data file representation.
impl<T: Entity> Serialize for Collection<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.items.values())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{Namespace, NamespaceRelationships};

    fn namespace(id: &str, label: &str, server: &str) -> Namespace {
        Namespace {
            id: id.into(),
            label: label.into(),
            title: label.to_uppercase(),
            namespace: format!("https://example.com/{label}"),
            isolated: false,
            relationships: NamespaceRelationships {
                servers: server.into(),
            },
        }
    }

    #[test]
    fn insert_rejects_duplicate_ids() {
        let mut col = Collection::new();
        col.insert(namespace("N1", "base", "S1")).unwrap();
        let err = col.insert(namespace("N1", "other", "S1")).unwrap_err();
        assert!(matches!(err, CoreError::DuplicateId { ref id, .. } if id == "N1"));
        assert_eq!(col.len(), 1);
    }

    #[test]
    fn preserves_insertion_order() {
        let col = Collection::from_entities([
            namespace("N3", "c", "S1"),
            namespace("N1", "a", "S1"),
            namespace("N2", "b", "S1"),
        ])
        .unwrap();
        let ids: Vec<&str> = col.ids().map(EntityId::as_str).collect();
        assert_eq!(ids, vec!["N3", "N1", "N2"]);
    }

    #[test]
    fn scoped_label_lookup_distinguishes_owners() {
        let col = Collection::from_entities([
            namespace("N1", "base", "S1"),
            namespace("N2", "base", "S2"),
        ])
        .unwrap();
        let s2 = EntityId::from("S2");
        assert_eq!(
            col.get_by_scoped_label("base", Some(&s2)).unwrap().id.as_str(),
            "N2"
        );
        assert_eq!(col.get_by_label("base").unwrap().id.as_str(), "N1");
        assert!(col.get_by_scoped_label("base", None).is_none());
    }

    #[test]
    fn require_reports_kind_and_id() {
        let col: Collection<Namespace> = Collection::new();
        let err = col.require(&"N9".into()).unwrap_err();
        assert_eq!(err.to_string(), "namespace not found: N9");
    }

    #[test]
    fn serializes_as_array() {
        let col = Collection::from_entities([namespace("N1", "base", "S1")]).unwrap();
        let value = serde_json::to_value(&col).unwrap();
        assert!(value.is_array());
        assert_eq!(value[0]["relationships"]["servers"], "S1");
    }
}
