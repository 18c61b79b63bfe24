// ── Catalogue ──
//
// The six collections that make up one inventory, and the JSON data file
// they are persisted to. Every relationship must point at an entity of
// an earlier kind that is already present; loading checks this in
// dependency order.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::collection::Collection;
use crate::error::CoreError;
use crate::model::{
    Entity, EntityId, EntityKind, Layer, LayerGroup, Namespace, Repository, Server, Style,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Catalogue {
    pub servers: Collection<Server>,
    pub namespaces: Collection<Namespace>,
    pub repositories: Collection<Repository>,
    pub styles: Collection<Style>,
    pub layers: Collection<Layer>,
    #[serde(rename = "layer-groups")]
    pub layer_groups: Collection<LayerGroup>,
}

/// On-disk shape; kinds missing from the file are empty.
#[derive(Debug, Default, Deserialize)]
struct Snapshot {
    #[serde(default)]
    servers: Vec<Server>,
    #[serde(default)]
    namespaces: Vec<Namespace>,
    #[serde(default)]
    repositories: Vec<Repository>,
    #[serde(default)]
    styles: Vec<Style>,
    #[serde(default)]
    layers: Vec<Layer>,
    #[serde(default, rename = "layer-groups")]
    layer_groups: Vec<LayerGroup>,
}

impl Catalogue {
    /// Parse and validate a data file's contents.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        Self::parse(json, Path::new("<inline>"))
    }

    /// Read a data file written by [`Catalogue::save`] (or the `data fetch`
    /// command).
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let json = std::fs::read_to_string(path).map_err(|e| CoreError::Snapshot {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let catalogue = Self::parse(&json, path)?;
        debug!(path = %path.display(), entities = catalogue.total(), "loaded data file");
        Ok(catalogue)
    }

    fn parse(json: &str, path: &Path) -> Result<Self, CoreError> {
        let snapshot: Snapshot = serde_json::from_str(json).map_err(|e| CoreError::Snapshot {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let catalogue = Self {
            servers: Collection::from_entities(snapshot.servers)?,
            namespaces: Collection::from_entities(snapshot.namespaces)?,
            repositories: Collection::from_entities(snapshot.repositories)?,
            styles: Collection::from_entities(snapshot.styles)?,
            layers: Collection::from_entities(snapshot.layers)?,
            layer_groups: Collection::from_entities(snapshot.layer_groups)?,
        };
        catalogue.validate()?;
        Ok(catalogue)
    }

    /// Write the catalogue as pretty-printed JSON, creating parent
    /// directories as needed.
    pub fn save(&self, path: &Path) -> Result<(), CoreError> {
        let snapshot_err = |message: String| CoreError::Snapshot {
            path: path.to_path_buf(),
            message,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| snapshot_err(e.to_string()))?;
        }
        let mut json =
            serde_json::to_string_pretty(self).map_err(|e| snapshot_err(e.to_string()))?;
        json.push('\n');
        std::fs::write(path, json).map_err(|e| snapshot_err(e.to_string()))?;

        debug!(path = %path.display(), entities = self.total(), "saved data file");
        Ok(())
    }

    /// Check every relationship resolves against an earlier kind.
    pub fn validate(&self) -> Result<(), CoreError> {
        for namespace in &self.namespaces {
            check(namespace, &self.servers, &namespace.relationships.servers)?;
        }
        for repository in &self.repositories {
            check(
                repository,
                &self.namespaces,
                &repository.relationships.namespaces,
            )?;
        }
        for style in &self.styles {
            if let Some(ref ns) = style.relationships.namespaces {
                check(style, &self.namespaces, ns)?;
            }
        }
        for layer in &self.layers {
            check(layer, &self.namespaces, &layer.relationships.namespaces)?;
            check(layer, &self.repositories, &layer.relationships.repositories)?;
            for style in &layer.relationships.styles {
                check(layer, &self.styles, style)?;
            }
        }
        for group in &self.layer_groups {
            if let Some(ref ns) = group.relationships.namespaces {
                check(group, &self.namespaces, ns)?;
            }
            for layer in &group.relationships.layers {
                check(group, &self.layers, layer)?;
            }
            for style in &group.relationships.styles {
                check(group, &self.styles, style)?;
            }
        }
        Ok(())
    }

    /// Number of entities of one kind.
    pub fn count(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Server => self.servers.len(),
            EntityKind::Namespace => self.namespaces.len(),
            EntityKind::Repository => self.repositories.len(),
            EntityKind::Style => self.styles.len(),
            EntityKind::Layer => self.layers.len(),
            EntityKind::LayerGroup => self.layer_groups.len(),
        }
    }

    pub fn total(&self) -> usize {
        EntityKind::ALL.iter().map(|k| self.count(*k)).sum()
    }
}

/// Fail with `NotFound` naming both the missing target and the entity
/// that references it.
fn check<E: Entity, T: Entity>(
    referrer: &E,
    targets: &Collection<T>,
    target: &EntityId,
) -> Result<(), CoreError> {
    if targets.contains(target) {
        Ok(())
    } else {
        Err(CoreError::NotFound {
            kind: T::KIND,
            identifier: format!("{target} (referenced by {} {})", E::KIND, referrer.id()),
        })
    }
}
