// ── Entity kinds ──
//
// The six inventory kinds, in the dependency order every multi-kind
// operation walks them: each kind only references kinds before it.

use std::fmt::Debug;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::entity_id::EntityId;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum EntityKind {
    Server,
    Namespace,
    Repository,
    Style,
    Layer,
    LayerGroup,
}

impl EntityKind {
    /// Every kind, predecessors first.
    pub const ALL: [EntityKind; 6] = [
        Self::Server,
        Self::Namespace,
        Self::Repository,
        Self::Style,
        Self::Layer,
        Self::LayerGroup,
    ];

    /// Key of this kind's array in the data file.
    pub fn plural(self) -> &'static str {
        match self {
            Self::Server => "servers",
            Self::Namespace => "namespaces",
            Self::Repository => "repositories",
            Self::Style => "styles",
            Self::Layer => "layers",
            Self::LayerGroup => "layer-groups",
        }
    }

    /// Human-readable plural, for headings.
    pub fn title(self) -> &'static str {
        match self {
            Self::Server => "Servers",
            Self::Namespace => "Namespaces",
            Self::Repository => "Repositories",
            Self::Style => "Styles",
            Self::Layer => "Layers",
            Self::LayerGroup => "Layer Groups",
        }
    }

    /// Airtable table name, using GeoServer's terminology.
    pub fn default_table(self) -> &'static str {
        match self {
            Self::Server => "Servers",
            Self::Namespace => "Workspaces",
            Self::Repository => "Stores",
            Self::Style => "Styles",
            Self::Layer => "Layers",
            Self::LayerGroup => "Layer Groups",
        }
    }

    /// Kinds whose identifier bridges must be populated before records of
    /// this kind can be parsed (transitively).
    pub fn predecessors(self) -> &'static [EntityKind] {
        let position = match self {
            Self::Server => 0,
            Self::Namespace => 1,
            Self::Repository | Self::Style => 2,
            Self::Layer => 4,
            Self::LayerGroup => 5,
        };
        &Self::ALL[..position]
    }
}

/// Capabilities shared by the six entity types.
pub trait Entity: Clone + Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync {
    const KIND: EntityKind;

    fn id(&self) -> &EntityId;

    /// Short machine-usable name, unique within [`Entity::scope`].
    fn label(&self) -> &str;

    /// The entity that owns this one's label namespace: the server for a
    /// namespace, the namespace for everything below it. `None` means the
    /// label is global.
    fn scope(&self) -> Option<&EntityId>;
}
