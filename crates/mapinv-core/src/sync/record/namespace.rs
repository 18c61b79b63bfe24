// ── Namespace record ──
//
// Fields: ID, Name, Title, Isolated, Server. The table is named after
// GeoServer's workspaces.

use mapinv_api::Fields;

use super::{Link, Reader, RemoteRecord, Writer};
use crate::error::CoreError;
use crate::model::{Entity, EntityId, EntityKind, Namespace};
use crate::sync::bridge::IdBridge;
use crate::sync::table::RawRecord;

#[derive(Clone, Copy, Debug)]
pub struct NamespaceLinks<'a> {
    pub servers: &'a IdBridge,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceRecord {
    pub local_id: EntityId,
    pub name: String,
    pub title: String,
    pub isolated: bool,
    pub server: Option<Link>,
}

impl RemoteRecord for NamespaceRecord {
    type Entity = Namespace;
    type Links<'a> = NamespaceLinks<'a>;

    fn to_remote(entity: &Namespace, links: NamespaceLinks<'_>) -> Self {
        Self {
            local_id: entity.id.clone(),
            name: entity.label.clone(),
            title: entity.title.clone(),
            isolated: entity.isolated,
            server: Some(Link::outbound(links.servers, &entity.relationships.servers)),
        }
    }

    fn from_remote(raw: &RawRecord, links: NamespaceLinks<'_>) -> Result<Self, CoreError> {
        let reader = Reader::new(Namespace::KIND, raw);
        Ok(Self {
            local_id: reader.id()?,
            name: reader.text("Name")?,
            title: reader.text("Title")?,
            isolated: reader.flag("Isolated")?,
            server: reader.link("Server", links.servers)?,
        })
    }

    fn to_fields(&self) -> Result<Fields, CoreError> {
        Ok(Writer::new(Namespace::KIND, &self.local_id)
            .text("Name", &self.name)
            .text("Title", &self.title)
            .flag("Isolated", self.isolated)
            .link("Server", self.server.as_ref(), EntityKind::Server)?
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
    use crate::model::{NamespaceRelationships, RemoteId};
    use crate::sync::record::tests::{bridge, raw};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn namespace() -> Namespace {
        Namespace {
            id: EntityId::from("N1"),
            label: "foo".into(),
            title: "Foo".into(),
            namespace: "https://example.com/foo".into(),
            isolated: false,
            relationships: NamespaceRelationships {
                servers: EntityId::from("S1"),
            },
        }
    }

    #[test]
    fn server_link_is_a_remote_id_list() {
        let servers = bridge(EntityKind::Server, &[("S1", "recS1")]);
        let record = NamespaceRecord::to_remote(&namespace(), NamespaceLinks { servers: &servers });
        let fields = record.to_fields().unwrap();
        assert_eq!(fields["Name"], "foo");
        assert_eq!(fields["Title"], "Foo");
        assert_eq!(fields["Server"], json!(["recS1"]));
    }

    #[test]
    fn round_trip_is_equal() {
        let servers = bridge(EntityKind::Server, &[("S1", "recS1")]);
        let links = NamespaceLinks { servers: &servers };
        let outbound = NamespaceRecord::to_remote(&namespace(), links);
        let fields = serde_json::Value::Object(outbound.to_fields().unwrap());
        let inbound = NamespaceRecord::from_remote(&raw("recN1", fields), links).unwrap();
        assert_eq!(inbound, outbound);
    }

    #[test]
    fn absent_isolated_reads_as_false() {
        let servers = bridge(EntityKind::Server, &[("S1", "recS1")]);
        let record = NamespaceRecord::from_remote(
            &raw(
                "recN1",
                json!({ "ID": "N1", "Name": "foo", "Title": "Foo", "Server": ["recS1"] }),
            ),
            NamespaceLinks { servers: &servers },
        )
        .unwrap();
        assert!(!record.isolated);
        assert_eq!(record.server, Some(Link::Remote(RemoteId::from("recS1"))));
    }

    #[test]
    fn unsynced_server_cannot_be_written() {
        let servers = IdBridge::new(EntityKind::Server);
        let record = NamespaceRecord::to_remote(&namespace(), NamespaceLinks { servers: &servers });
        let err = record.to_fields().unwrap_err();
        assert!(matches!(
            err,
            CoreError::UnresolvedReference { kind: EntityKind::Namespace, relation: EntityKind::Server, .. }
        ));
    }

    #[test]
    fn dangling_server_is_not_found() {
        let servers = bridge(EntityKind::Server, &[("S1", "recS1")]);
        let err = NamespaceRecord::from_remote(
            &raw("recN1", json!({ "ID": "N1", "Server": ["recDeleted"] })),
            NamespaceLinks { servers: &servers },
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::NotFound { .. }));
    }
}
