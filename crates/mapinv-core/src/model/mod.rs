// ── Domain model ──
//
// Six plain value types with typed enumerations and explicit relationship
// fields. Relationships hold the `EntityId` of an entity of an earlier
// kind; nothing owns what it references.

pub mod entity_id;
pub mod enums;
pub mod kind;
pub mod layer;
pub mod layer_group;
pub mod namespace;
pub mod repository;
pub mod server;
pub mod style;

pub use entity_id::{EntityId, RemoteId};
pub use enums::{LayerGeometry, LayerType, RepositoryType, Service, ServerType, StyleType};
pub use kind::{Entity, EntityKind};
pub use layer::{Layer, LayerRelationships};
pub use layer_group::{LayerGroup, LayerGroupRelationships};
pub use namespace::{Namespace, NamespaceRelationships};
pub use repository::{Repository, RepositoryRelationships};
pub use server::Server;
pub use style::{Style, StyleRelationships};
