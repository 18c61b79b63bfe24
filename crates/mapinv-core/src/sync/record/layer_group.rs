// ── Layer group record ──
//
// Fields: ID, Name, Title, Services, Workspace, Layers, Styles.

use mapinv_api::Fields;

use super::{Link, Reader, RemoteRecord, Writer, outbound_links};
use crate::error::CoreError;
use crate::model::{Entity, EntityId, EntityKind, LayerGroup, Service};
use crate::sync::bridge::IdBridge;
use crate::sync::table::RawRecord;

#[derive(Clone, Copy, Debug)]
pub struct LayerGroupLinks<'a> {
    pub namespaces: &'a IdBridge,
    pub layers: &'a IdBridge,
    pub styles: &'a IdBridge,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerGroupRecord {
    pub local_id: EntityId,
    pub name: String,
    pub title: String,
    pub services: Vec<Service>,
    pub namespace: Option<Link>,
    pub layers: Vec<Link>,
    pub styles: Vec<Link>,
}

impl RemoteRecord for LayerGroupRecord {
    type Entity = LayerGroup;
    type Links<'a> = LayerGroupLinks<'a>;

    fn to_remote(entity: &LayerGroup, links: LayerGroupLinks<'_>) -> Self {
        let mut services = entity.services.clone();
        services.sort();
        services.dedup();
        let relationships = &entity.relationships;
        Self {
            local_id: entity.id.clone(),
            name: entity.label.clone(),
            title: entity.title.clone(),
            services,
            namespace: relationships
                .namespaces
                .as_ref()
                .map(|id| Link::outbound(links.namespaces, id)),
            layers: outbound_links(links.layers, &relationships.layers),
            styles: outbound_links(links.styles, &relationships.styles),
        }
    }

    fn from_remote(raw: &RawRecord, links: LayerGroupLinks<'_>) -> Result<Self, CoreError> {
        let reader = Reader::new(LayerGroup::KIND, raw);
        Ok(Self {
            local_id: reader.id()?,
            name: reader.text("Name")?,
            title: reader.text("Title")?,
            services: reader.labels("Services")?,
            namespace: reader.link("Workspace", links.namespaces)?,
            layers: reader.links("Layers", links.layers)?,
            styles: reader.links("Styles", links.styles)?,
        })
    }

    fn to_fields(&self) -> Result<Fields, CoreError> {
        Ok(Writer::new(LayerGroup::KIND, &self.local_id)
            .text("Name", &self.name)
            .text("Title", &self.title)
            .labels("Services", &self.services)
            .optional_link("Workspace", self.namespace.as_ref(), EntityKind::Namespace)?
            .links("Layers", &self.layers, EntityKind::Layer)?
            .links("Styles", &self.styles, EntityKind::Style)?
            .finish())
    }

    fn local_id(&self) -> &EntityId {
        &self.local_id
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::LayerGroupRelationships;
    use crate::sync::record::tests::{bridge, raw};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn basemap(namespace: Option<&str>) -> LayerGroup {
        LayerGroup {
            id: EntityId::from("LG1"),
            label: "basemap".into(),
            title: "Base map".into(),
            services: vec![Service::Wms],
            relationships: LayerGroupRelationships {
                namespaces: namespace.map(EntityId::from),
                layers: vec![EntityId::from("L1"), EntityId::from("L2")],
                styles: vec![EntityId::from("ST1")],
            },
        }
    }

    #[test]
    fn round_trip_with_and_without_workspace() {
        let namespaces = bridge(EntityKind::Namespace, &[("N1", "recN1")]);
        let layers = bridge(EntityKind::Layer, &[("L1", "recL1"), ("L2", "recL2")]);
        let styles = bridge(EntityKind::Style, &[("ST1", "recST1")]);
        let links = LayerGroupLinks {
            namespaces: &namespaces,
            layers: &layers,
            styles: &styles,
        };

        for namespace in [Some("N1"), None] {
            let outbound = LayerGroupRecord::to_remote(&basemap(namespace), links);
            let fields = serde_json::Value::Object(outbound.to_fields().unwrap());
            assert_eq!(fields["Services"], json!(["WMS"]));
            assert_eq!(fields["Layers"], json!(["recL1", "recL2"]));
            let inbound = LayerGroupRecord::from_remote(&raw("recLG1", fields), links).unwrap();
            assert_eq!(inbound, outbound);
        }
    }

    #[test]
    fn global_group_writes_empty_workspace() {
        let namespaces = IdBridge::new(EntityKind::Namespace);
        let layers = bridge(EntityKind::Layer, &[("L1", "recL1"), ("L2", "recL2")]);
        let styles = bridge(EntityKind::Style, &[("ST1", "recST1")]);
        let fields = LayerGroupRecord::to_remote(
            &basemap(None),
            LayerGroupLinks {
                namespaces: &namespaces,
                layers: &layers,
                styles: &styles,
            },
        )
        .to_fields()
        .unwrap();
        assert_eq!(fields["Workspace"], json!([]));
    }

    #[test]
    fn unsynced_layer_blocks_write() {
        let namespaces = IdBridge::new(EntityKind::Namespace);
        let layers = bridge(EntityKind::Layer, &[("L1", "recL1")]);
        let styles = bridge(EntityKind::Style, &[("ST1", "recST1")]);
        let record = LayerGroupRecord::to_remote(
            &basemap(None),
            LayerGroupLinks {
                namespaces: &namespaces,
                layers: &layers,
                styles: &styles,
            },
        );
        assert!(record.layers.contains(&Link::Unsynced(EntityId::from("L2"))));
        assert!(matches!(
            record.to_fields().unwrap_err(),
            CoreError::UnresolvedReference { relation: EntityKind::Layer, .. }
        ));
    }
}
