// ── Style record ──
//
// Fields: ID, Name, Title, Type, Workspace. Global styles leave
// Workspace empty.

use mapinv_api::Fields;

use super::{Link, Reader, RemoteRecord, Writer};
use crate::error::CoreError;
use crate::model::{Entity, EntityId, EntityKind, Style, StyleType};
use crate::sync::bridge::IdBridge;
use crate::sync::table::RawRecord;

#[derive(Clone, Copy, Debug)]
pub struct StyleLinks<'a> {
    pub namespaces: &'a IdBridge,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleRecord {
    pub local_id: EntityId,
    pub name: String,
    pub title: String,
    pub style_type: StyleType,
    pub namespace: Option<Link>,
}

impl RemoteRecord for StyleRecord {
    type Entity = Style;
    type Links<'a> = StyleLinks<'a>;

    fn to_remote(entity: &Style, links: StyleLinks<'_>) -> Self {
        Self {
            local_id: entity.id.clone(),
            name: entity.label.clone(),
            title: entity.title.clone(),
            style_type: entity.style_type,
            namespace: entity
                .relationships
                .namespaces
                .as_ref()
                .map(|id| Link::outbound(links.namespaces, id)),
        }
    }

    fn from_remote(raw: &RawRecord, links: StyleLinks<'_>) -> Result<Self, CoreError> {
        let reader = Reader::new(Style::KIND, raw);
        Ok(Self {
            local_id: reader.id()?,
            name: reader.text("Name")?,
            title: reader.text("Title")?,
            style_type: reader.label("Type")?,
            namespace: reader.link("Workspace", links.namespaces)?,
        })
    }

    fn to_fields(&self) -> Result<Fields, CoreError> {
        Ok(Writer::new(Style::KIND, &self.local_id)
            .text("Name", &self.name)
            .text("Title", &self.title)
            .label("Type", &self.style_type)
            .optional_link("Workspace", self.namespace.as_ref(), EntityKind::Namespace)?
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
    use crate::model::StyleRelationships;
    use crate::sync::record::tests::{bridge, raw};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn style(namespace: Option<&str>) -> Style {
        Style {
            id: EntityId::from("ST1"),
            label: "coastline".into(),
            title: "-".into(),
            style_type: StyleType::Sld,
            relationships: StyleRelationships {
                namespaces: namespace.map(EntityId::from),
            },
        }
    }

    #[test]
    fn global_style_has_empty_workspace() {
        let namespaces = IdBridge::new(EntityKind::Namespace);
        let links = StyleLinks { namespaces: &namespaces };
        let outbound = StyleRecord::to_remote(&style(None), links);
        let fields = outbound.to_fields().unwrap();
        assert_eq!(fields["Type"], "SLD");
        assert_eq!(fields["Workspace"], json!([]));

        let inbound =
            StyleRecord::from_remote(&raw("recST1", serde_json::Value::Object(fields)), links)
                .unwrap();
        assert_eq!(inbound, outbound);
    }

    #[test]
    fn workspace_style_round_trips() {
        let namespaces = bridge(EntityKind::Namespace, &[("N1", "recN1")]);
        let links = StyleLinks { namespaces: &namespaces };
        let outbound = StyleRecord::to_remote(&style(Some("N1")), links);
        let fields = serde_json::Value::Object(outbound.to_fields().unwrap());
        assert_eq!(fields["Workspace"], json!(["recN1"]));
        let inbound = StyleRecord::from_remote(&raw("recST1", fields), links).unwrap();
        assert_eq!(inbound, outbound);
    }

    #[test]
    fn absent_workspace_field_is_allowed() {
        let namespaces = IdBridge::new(EntityKind::Namespace);
        let record = StyleRecord::from_remote(
            &raw("recST1", json!({ "ID": "ST1", "Name": "point", "Type": "SLD" })),
            StyleLinks { namespaces: &namespaces },
        )
        .unwrap();
        assert_eq!(record.namespace, None);
        assert_eq!(record.title, "");
    }
}
