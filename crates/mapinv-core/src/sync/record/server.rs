// ── Server record ──
//
// Fields: ID, Name, Hostname, Type, Version. Servers reference nothing.

use mapinv_api::Fields;

use super::{Reader, RemoteRecord, Writer};
use crate::error::CoreError;
use crate::model::{Entity, EntityId, Server, ServerType};
use crate::sync::table::RawRecord;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerRecord {
    pub local_id: EntityId,
    pub name: String,
    pub hostname: String,
    pub server_type: ServerType,
    pub version: String,
}

impl RemoteRecord for ServerRecord {
    type Entity = Server;
    type Links<'a> = ();

    fn to_remote(entity: &Server, (): ()) -> Self {
        Self {
            local_id: entity.id.clone(),
            name: entity.label.clone(),
            hostname: entity.hostname.clone(),
            server_type: entity.server_type,
            version: entity.version.clone(),
        }
    }

    fn from_remote(raw: &RawRecord, (): ()) -> Result<Self, CoreError> {
        let reader = Reader::new(Server::KIND, raw);
        Ok(Self {
            local_id: reader.id()?,
            name: reader.text("Name")?,
            hostname: reader.text("Hostname")?,
            server_type: reader.label("Type")?,
            version: reader.text("Version")?,
        })
    }

    fn to_fields(&self) -> Result<Fields, CoreError> {
        Ok(Writer::new(Server::KIND, &self.local_id)
            .text("Name", &self.name)
            .text("Hostname", &self.hostname)
            .label("Type", &self.server_type)
            .text("Version", &self.version)
            .finish())
    }

    fn local_id(&self) -> &EntityId {
        &self.local_id
    }
}
