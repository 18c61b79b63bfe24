// ── Remote record adapters ──
//
// One record type per entity kind, the shape an entity takes in its
// Airtable table. Outbound records are built from an entity plus the
// bridges of the kinds it references; inbound records are parsed from a
// raw table row through the same bridges. Equality on records is the
// sole test for "outdated".

mod layer;
mod layer_group;
mod namespace;
mod repository;
mod server;
mod style;

use std::fmt::Debug;
use std::str::FromStr;

use serde_json::Value;

use mapinv_api::Fields;

use super::bridge::IdBridge;
use super::table::RawRecord;
use crate::error::CoreError;
use crate::model::{Entity, EntityId, EntityKind, RemoteId};

pub use layer::{LayerLinks, LayerRecord};
pub use layer_group::{LayerGroupLinks, LayerGroupRecord};
pub use namespace::{NamespaceLinks, NamespaceRecord};
pub use repository::{RepositoryLinks, RepositoryRecord};
pub use server::ServerRecord;
pub use style::{StyleLinks, StyleRecord};

/// Field holding the local id in every table.
pub const ID_FIELD: &str = "ID";

// ── Links ────────────────────────────────────────────────────────────

/// One relationship value of an outbound or inbound record.
///
/// Inbound records only ever hold `Remote` links. An outbound record
/// holds `Unsynced` when the referenced entity has no remote record yet;
/// such a record never equals its remote counterpart and cannot be
/// written.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Link {
    Remote(RemoteId),
    Unsynced(EntityId),
}

impl Link {
    /// Resolve a local reference through the referenced kind's bridge.
    pub fn outbound(bridge: &IdBridge, local: &EntityId) -> Self {
        match bridge.remote_id(local) {
            Some(remote) => Self::Remote(remote.clone()),
            None => Self::Unsynced(local.clone()),
        }
    }

    pub fn remote_id(&self) -> Option<&RemoteId> {
        match self {
            Self::Remote(id) => Some(id),
            Self::Unsynced(_) => None,
        }
    }
}

/// Outbound link list, sorted so comparison ignores order.
pub(crate) fn outbound_links<'a>(
    bridge: &IdBridge,
    locals: impl IntoIterator<Item = &'a EntityId>,
) -> Vec<Link> {
    let mut links: Vec<Link> = locals
        .into_iter()
        .map(|id| Link::outbound(bridge, id))
        .collect();
    links.sort();
    links.dedup();
    links
}

// ── Tracked ──────────────────────────────────────────────────────────

/// A record plus the Airtable id it is stored under, once known.
#[derive(Debug, Clone, PartialEq)]
pub struct Tracked<R> {
    pub remote_id: Option<RemoteId>,
    pub record: R,
}

impl<R> Tracked<R> {
    pub fn local(record: R) -> Self {
        Self {
            remote_id: None,
            record,
        }
    }

    pub fn remote(remote_id: RemoteId, record: R) -> Self {
        Self {
            remote_id: Some(remote_id),
            record,
        }
    }
}

// ── RemoteRecord ─────────────────────────────────────────────────────

/// Conversion between an entity kind and its table representation.
pub trait RemoteRecord: Clone + Debug + PartialEq + Send + Sync {
    type Entity: Entity;

    /// Bridges of the kinds this kind references.
    type Links<'a>: Copy;

    fn to_remote(entity: &Self::Entity, links: Self::Links<'_>) -> Self;

    /// Parse a table row. Fails with `NotFound` when a relationship
    /// points at a record the bridges do not know, `MissingField` when a
    /// required field is absent, `MalformedField` when a cell holds the
    /// wrong JSON type, `UnrecognizedValue` on a select option outside the
    /// kind's vocabulary.
    fn from_remote(raw: &RawRecord, links: Self::Links<'_>) -> Result<Self, CoreError>;

    /// The exact field set for a create or update call. Fails with
    /// `UnresolvedReference` while a required link is unsynced.
    fn to_fields(&self) -> Result<Fields, CoreError>;

    fn local_id(&self) -> &EntityId;
}

// ── Inbound field helpers ────────────────────────────────────────────

pub(crate) struct Reader<'r> {
    kind: EntityKind,
    raw: &'r RawRecord,
}

impl<'r> Reader<'r> {
    pub(crate) fn new(kind: EntityKind, raw: &'r RawRecord) -> Self {
        Self { kind, raw }
    }

    fn missing(&self, field: &'static str) -> CoreError {
        CoreError::MissingField {
            kind: self.kind,
            field,
            record: self.raw.id.to_string(),
        }
    }

    fn malformed(&self, field: &'static str, value: &Value) -> CoreError {
        CoreError::MalformedField {
            kind: self.kind,
            field,
            record: self.raw.id.to_string(),
            value: value.to_string(),
        }
    }

    fn unrecognized(&self, field: &'static str, value: &Value) -> CoreError {
        CoreError::UnrecognizedValue {
            kind: self.kind,
            field,
            value: match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            },
        }
    }

    fn get(&self, field: &'static str) -> Option<&'r Value> {
        self.raw.fields.get(field).filter(|v| !v.is_null())
    }

    /// The declared local id. Always required.
    pub(crate) fn id(&self) -> Result<EntityId, CoreError> {
        match self.get(ID_FIELD) {
            Some(Value::String(s)) if !s.is_empty() => Ok(EntityId::from(s.as_str())),
            _ => Err(self.missing(ID_FIELD)),
        }
    }

    /// Text cell; Airtable omits empty cells, so absent reads as "".
    pub(crate) fn text(&self, field: &'static str) -> Result<String, CoreError> {
        match self.get(field) {
            None => Ok(String::new()),
            Some(Value::String(s)) => Ok(s.clone()),
            Some(other) => Err(self.malformed(field, other)),
        }
    }

    pub(crate) fn optional_text(&self, field: &'static str) -> Result<Option<String>, CoreError> {
        Ok(Some(self.text(field)?).filter(|s| !s.is_empty()))
    }

    pub(crate) fn flag(&self, field: &'static str) -> Result<bool, CoreError> {
        match self.get(field) {
            None => Ok(false),
            Some(Value::Bool(b)) => Ok(*b),
            Some(other) => Err(self.malformed(field, other)),
        }
    }

    /// Single-select cell that must be present.
    pub(crate) fn label<T: FromStr>(&self, field: &'static str) -> Result<T, CoreError> {
        self.optional_label(field)?
            .ok_or_else(|| self.missing(field))
    }

    pub(crate) fn optional_label<T: FromStr>(
        &self,
        field: &'static str,
    ) -> Result<Option<T>, CoreError> {
        match self.get(field) {
            None => Ok(None),
            Some(Value::String(s)) if s.is_empty() => Ok(None),
            Some(value @ Value::String(s)) => s
                .parse()
                .map(Some)
                .map_err(|_| self.unrecognized(field, value)),
            Some(other) => Err(self.malformed(field, other)),
        }
    }

    /// Multiple-select cell, sorted and deduplicated.
    pub(crate) fn labels<T: FromStr + Ord>(&self, field: &'static str) -> Result<Vec<T>, CoreError> {
        let mut parsed = Vec::new();
        for value in self.array(field)? {
            let Value::String(s) = value else {
                return Err(self.malformed(field, value));
            };
            parsed.push(s.parse().map_err(|_| self.unrecognized(field, value))?);
        }
        parsed.sort();
        parsed.dedup();
        Ok(parsed)
    }

    fn array(&self, field: &'static str) -> Result<&'r [Value], CoreError> {
        match self.get(field) {
            None => Ok(&[]),
            Some(Value::Array(items)) => Ok(items),
            Some(other) => Err(self.malformed(field, other)),
        }
    }

    fn remote_ids(&self, field: &'static str) -> Result<Vec<RemoteId>, CoreError> {
        self.array(field)?
            .iter()
            .map(|value| match value {
                Value::String(s) => Ok(RemoteId::from(s.as_str())),
                other => Err(self.malformed(field, other)),
            })
            .collect()
    }

    /// Single linked record. Only the first element is meaningful.
    /// A link the bridge cannot resolve is `NotFound`.
    pub(crate) fn link(
        &self,
        field: &'static str,
        bridge: &IdBridge,
    ) -> Result<Option<Link>, CoreError> {
        match self.remote_ids(field)?.into_iter().next() {
            None => Ok(None),
            Some(remote) => {
                bridge.local_id(&remote)?;
                Ok(Some(Link::Remote(remote)))
            }
        }
    }

    pub(crate) fn links(&self, field: &'static str, bridge: &IdBridge) -> Result<Vec<Link>, CoreError> {
        let mut links = Vec::new();
        for remote in self.remote_ids(field)? {
            bridge.local_id(&remote)?;
            links.push(Link::Remote(remote));
        }
        links.sort();
        links.dedup();
        Ok(links)
    }
}

// ── Outbound field helpers ───────────────────────────────────────────

#[derive(Debug)]
pub(crate) struct Writer<'w> {
    kind: EntityKind,
    local_id: &'w EntityId,
    fields: Fields,
}

impl<'w> Writer<'w> {
    pub(crate) fn new(kind: EntityKind, local_id: &'w EntityId) -> Self {
        let mut fields = Fields::new();
        fields.insert(ID_FIELD.to_owned(), Value::from(local_id.as_str()));
        Self {
            kind,
            local_id,
            fields,
        }
    }

    pub(crate) fn text(mut self, field: &str, value: &str) -> Self {
        self.fields.insert(field.to_owned(), Value::from(value));
        self
    }

    /// `None` is written as null, clearing the cell on update.
    pub(crate) fn optional_text(mut self, field: &str, value: Option<&str>) -> Self {
        self.fields
            .insert(field.to_owned(), value.map_or(Value::Null, Value::from));
        self
    }

    pub(crate) fn flag(mut self, field: &str, value: bool) -> Self {
        self.fields.insert(field.to_owned(), Value::Bool(value));
        self
    }

    pub(crate) fn label(self, field: &str, value: &impl ToString) -> Self {
        let label = value.to_string();
        self.text(field, &label)
    }

    pub(crate) fn optional_label(self, field: &str, value: Option<&impl ToString>) -> Self {
        let label = value.map(ToString::to_string);
        self.optional_text(field, label.as_deref())
    }

    pub(crate) fn labels<T: ToString>(mut self, field: &str, values: &[T]) -> Self {
        let labels = values.iter().map(|v| Value::from(v.to_string())).collect();
        self.fields.insert(field.to_owned(), Value::Array(labels));
        self
    }

    fn resolve(&self, link: &Link, relation: EntityKind) -> Result<Value, CoreError> {
        match link {
            Link::Remote(id) => Ok(Value::from(id.as_str())),
            Link::Unsynced(_) => Err(self.unresolved(relation)),
        }
    }

    fn unresolved(&self, relation: EntityKind) -> CoreError {
        CoreError::UnresolvedReference {
            kind: self.kind,
            local_id: self.local_id.to_string(),
            relation,
        }
    }

    /// Required single link, written as a one-element list.
    pub(crate) fn link(
        mut self,
        field: &str,
        link: Option<&Link>,
        relation: EntityKind,
    ) -> Result<Self, CoreError> {
        let link = link.ok_or_else(|| self.unresolved(relation))?;
        let value = self.resolve(link, relation)?;
        self.fields
            .insert(field.to_owned(), Value::Array(vec![value]));
        Ok(self)
    }

    /// Optional single link; `None` is written as an empty list.
    pub(crate) fn optional_link(
        self,
        field: &str,
        link: Option<&Link>,
        relation: EntityKind,
    ) -> Result<Self, CoreError> {
        match link {
            Some(link) => self.link(field, Some(link), relation),
            None => self.links(field, &[], relation),
        }
    }

    pub(crate) fn links(
        mut self,
        field: &str,
        links: &[Link],
        relation: EntityKind,
    ) -> Result<Self, CoreError> {
        let values = links
            .iter()
            .map(|link| self.resolve(link, relation))
            .collect::<Result<Vec<_>, _>>()?;
        self.fields.insert(field.to_owned(), Value::Array(values));
        Ok(self)
    }

    pub(crate) fn finish(self) -> Fields {
        self.fields
    }
}

/// "" and `None` are the same value remotely.
pub(crate) fn non_empty(value: Option<&String>) -> Option<String> {
    value.filter(|s| !s.is_empty()).cloned()
}
