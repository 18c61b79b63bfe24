// ── Layer record ──
//
// Fields: ID, Name, Title, Type, Geometry, Services, Table/View,
// Workspace, Store, Styles.

use mapinv_api::Fields;

use super::{Link, Reader, RemoteRecord, Writer, non_empty, outbound_links};
use crate::error::CoreError;
use crate::model::{Entity, EntityId, EntityKind, Layer, LayerGeometry, LayerType, Service};
use crate::sync::bridge::IdBridge;
use crate::sync::table::RawRecord;

#[derive(Clone, Copy, Debug)]
pub struct LayerLinks<'a> {
    pub namespaces: &'a IdBridge,
    pub repositories: &'a IdBridge,
    pub styles: &'a IdBridge,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerRecord {
    pub local_id: EntityId,
    pub name: String,
    pub title: String,
    pub layer_type: LayerType,
    pub geometry: Option<LayerGeometry>,
    /// Sorted.
    pub services: Vec<Service>,
    pub table_view: Option<String>,
    pub namespace: Option<Link>,
    pub repository: Option<Link>,
    pub styles: Vec<Link>,
}

impl RemoteRecord for LayerRecord {
    type Entity = Layer;
    type Links<'a> = LayerLinks<'a>;

    fn to_remote(entity: &Layer, links: LayerLinks<'_>) -> Self {
        let mut services = entity.services.clone();
        services.sort();
        services.dedup();
        Self {
            local_id: entity.id.clone(),
            name: entity.label.clone(),
            title: entity.title.clone(),
            layer_type: entity.layer_type,
            geometry: entity.geometry,
            services,
            table_view: non_empty(entity.table_view.as_ref()),
            namespace: Some(Link::outbound(
                links.namespaces,
                &entity.relationships.namespaces,
            )),
            repository: Some(Link::outbound(
                links.repositories,
                &entity.relationships.repositories,
            )),
            styles: outbound_links(links.styles, &entity.relationships.styles),
        }
    }

    fn from_remote(raw: &RawRecord, links: LayerLinks<'_>) -> Result<Self, CoreError> {
        let reader = Reader::new(Layer::KIND, raw);
        Ok(Self {
            local_id: reader.id()?,
            name: reader.text("Name")?,
            title: reader.text("Title")?,
            layer_type: reader.label("Type")?,
            geometry: reader.optional_label("Geometry")?,
            services: reader.labels("Services")?,
            table_view: reader.optional_text("Table/View")?,
            namespace: reader.link("Workspace", links.namespaces)?,
            repository: reader.link("Store", links.repositories)?,
            styles: reader.links("Styles", links.styles)?,
        })
    }

    fn to_fields(&self) -> Result<Fields, CoreError> {
        Ok(Writer::new(Layer::KIND, &self.local_id)
            .text("Name", &self.name)
            .text("Title", &self.title)
            .label("Type", &self.layer_type)
            .optional_label("Geometry", self.geometry.as_ref())
            .labels("Services", &self.services)
            .optional_text("Table/View", self.table_view.as_deref())
            .link("Workspace", self.namespace.as_ref(), EntityKind::Namespace)?
            .link("Store", self.repository.as_ref(), EntityKind::Repository)?
            .links("Styles", &self.styles, EntityKind::Style)?
            .finish())
    }

    fn local_id(&self) -> &EntityId {
        &self.local_id
    }
}
