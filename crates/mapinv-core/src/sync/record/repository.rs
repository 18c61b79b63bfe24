// ── Repository record ──
//
// Fields: ID, Name, Title, Type, Host, Database, Schema, Workspace. The
// table is named after GeoServer's stores.

use mapinv_api::Fields;

use super::{Link, Reader, RemoteRecord, Writer, non_empty};
use crate::error::CoreError;
use crate::model::{Entity, EntityId, EntityKind, Repository, RepositoryType};
use crate::sync::bridge::IdBridge;
use crate::sync::table::RawRecord;

#[derive(Clone, Copy, Debug)]
pub struct RepositoryLinks<'a> {
    pub namespaces: &'a IdBridge,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryRecord {
    pub local_id: EntityId,
    pub name: String,
    pub title: String,
    pub repository_type: RepositoryType,
    pub host: Option<String>,
    pub database: Option<String>,
    pub schema: Option<String>,
    pub namespace: Option<Link>,
}

impl RemoteRecord for RepositoryRecord {
    type Entity = Repository;
    type Links<'a> = RepositoryLinks<'a>;

    fn to_remote(entity: &Repository, links: RepositoryLinks<'_>) -> Self {
        Self {
            local_id: entity.id.clone(),
            name: entity.label.clone(),
            title: entity.title.clone(),
            repository_type: entity.repository_type,
            host: non_empty(entity.hostname.as_ref()),
            database: non_empty(entity.database.as_ref()),
            schema: non_empty(entity.schema.as_ref()),
            namespace: Some(Link::outbound(
                links.namespaces,
                &entity.relationships.namespaces,
            )),
        }
    }

    fn from_remote(raw: &RawRecord, links: RepositoryLinks<'_>) -> Result<Self, CoreError> {
        let reader = Reader::new(Repository::KIND, raw);
        Ok(Self {
            local_id: reader.id()?,
            name: reader.text("Name")?,
            title: reader.text("Title")?,
            repository_type: reader.label("Type")?,
            host: reader.optional_text("Host")?,
            database: reader.optional_text("Database")?,
            schema: reader.optional_text("Schema")?,
            namespace: reader.link("Workspace", links.namespaces)?,
        })
    }

    fn to_fields(&self) -> Result<Fields, CoreError> {
        Ok(Writer::new(Repository::KIND, &self.local_id)
            .text("Name", &self.name)
            .text("Title", &self.title)
            .label("Type", &self.repository_type)
            .optional_text("Host", self.host.as_deref())
            .optional_text("Database", self.database.as_deref())
            .optional_text("Schema", self.schema.as_deref())
            .link("Workspace", self.namespace.as_ref(), EntityKind::Namespace)?
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
    use crate::model::RepositoryRelationships;
    use crate::sync::record::tests::{bridge, raw};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn postgis() -> Repository {
        Repository {
            id: EntityId::from("R1"),
            label: "postgis".into(),
            title: "Base PostGIS".into(),
            repository_type: RepositoryType::Postgis,
            hostname: Some("db.example.com".into()),
            database: Some("gis".into()),
            schema: Some("public".into()),
            relationships: RepositoryRelationships {
                namespaces: EntityId::from("N1"),
            },
        }
    }

    #[test]
    fn fields_for_postgis_store() {
        let namespaces = bridge(EntityKind::Namespace, &[("N1", "recN1")]);
        let fields = RepositoryRecord::to_remote(&postgis(), RepositoryLinks { namespaces: &namespaces })
            .to_fields()
            .unwrap();
        assert_eq!(
            serde_json::Value::Object(fields),
            json!({
                "ID": "R1",
                "Name": "postgis",
                "Title": "Base PostGIS",
                "Type": "PostGIS",
                "Host": "db.example.com",
                "Database": "gis",
                "Schema": "public",
                "Workspace": ["recN1"]
            })
        );
    }

    #[test]
    fn raster_store_round_trips_without_connection() {
        let namespaces = bridge(EntityKind::Namespace, &[("N1", "recN1")]);
        let links = RepositoryLinks { namespaces: &namespaces };
        let mut repository = postgis();
        repository.repository_type = RepositoryType::Jpeg2000;
        repository.hostname = None;
        repository.database = None;
        repository.schema = Some(String::new());

        let outbound = RepositoryRecord::to_remote(&repository, links);
        let mut fields = outbound.to_fields().unwrap();
        assert_eq!(fields["Type"], "JPEG2000");
        // Airtable drops empty cells.
        fields.retain(|_, v| !v.is_null());
        let inbound =
            RepositoryRecord::from_remote(&raw("recR1", serde_json::Value::Object(fields)), links)
                .unwrap();
        assert_eq!(inbound, outbound);
    }

    #[test]
    fn changed_title_is_unequal() {
        let namespaces = bridge(EntityKind::Namespace, &[("N1", "recN1")]);
        let links = RepositoryLinks { namespaces: &namespaces };
        let outbound = RepositoryRecord::to_remote(&postgis(), links);
        let mut fields = outbound.to_fields().unwrap();
        fields.insert("Title".into(), json!("Renamed"));
        let inbound =
            RepositoryRecord::from_remote(&raw("recR1", serde_json::Value::Object(fields)), links)
                .unwrap();
        assert_ne!(inbound, outbound);
    }
}
