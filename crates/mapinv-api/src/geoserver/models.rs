// GeoServer REST wire types.
//
// GeoServer's JSON is XStream-generated: collections are wrapped in an
// object keyed by the singular element name, empty collections come back
// as `""`, and attributes are prefixed with `@`.

use std::collections::BTreeMap;

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

// ── Collection helpers ──────────────────────────────────────────────

/// Deserialize an XStream collection (`{"workspace": [...]}`, a single
/// bare object, `""` or `null`) into a `Vec`.
pub(crate) fn listing<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let inner = match Value::deserialize(deserializer)? {
        Value::Object(map) => match map.into_iter().find(|(key, _)| !key.starts_with('@')) {
            Some((_, value)) => value,
            None => return Ok(Vec::new()),
        },
        Value::Null | Value::String(_) => return Ok(Vec::new()),
        other => other,
    };
    items(inner).map_err(D::Error::custom)
}

/// Deserialize either a JSON array or a single bare element into a `Vec`.
pub(crate) fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    items(Value::deserialize(deserializer)?).map_err(D::Error::custom)
}

fn items<T: DeserializeOwned>(value: Value) -> Result<Vec<T>, serde_json::Error> {
    match value {
        Value::Array(values) => values.into_iter().map(serde_json::from_value).collect(),
        Value::Null => Ok(Vec::new()),
        single => Ok(vec![serde_json::from_value(single)?]),
    }
}

fn connection_entries<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries: Vec<ConnectionEntry> = listing(deserializer)?;
    Ok(entries.into_iter().map(|e| (e.key, e.value)).collect())
}

// ── Shared shapes ───────────────────────────────────────────────────

/// `{"name": "...", "href": "..."}` as found in every listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NamedRef {
    pub name: String,
}

/// A style reference; `workspace` is absent for global styles.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StyleRef {
    pub name: String,
    #[serde(default)]
    pub workspace: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ConnectionEntry {
    #[serde(rename = "@key")]
    key: String,
    #[serde(rename = "$", default)]
    value: String,
}

// ── About ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(crate) struct VersionResponse {
    pub about: About,
}

#[derive(Debug, Deserialize)]
pub(crate) struct About {
    #[serde(deserialize_with = "one_or_many")]
    pub resource: Vec<AboutResource>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AboutResource {
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "Version", default)]
    pub version: Option<Value>,
}

// ── Workspaces & namespaces ─────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(crate) struct WorkspacesResponse {
    #[serde(deserialize_with = "listing")]
    pub workspaces: Vec<NamedRef>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NamespaceResponse {
    pub namespace: Namespace,
}

/// The namespace paired with a workspace (same prefix).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Namespace {
    pub prefix: String,
    pub uri: String,
    #[serde(default)]
    pub isolated: bool,
}

// ── Stores ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(crate) struct DataStoresResponse {
    #[serde(rename = "dataStores", deserialize_with = "listing")]
    pub data_stores: Vec<NamedRef>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DataStoreResponse {
    #[serde(rename = "dataStore")]
    pub data_store: DataStore,
}

/// A vector data store, e.g. a PostGIS connection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataStore {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type", default)]
    pub store_type: Option<String>,
    #[serde(default, deserialize_with = "connection_entries")]
    pub connection_parameters: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CoverageStoresResponse {
    #[serde(rename = "coverageStores", deserialize_with = "listing")]
    pub coverage_stores: Vec<NamedRef>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CoverageStoreResponse {
    #[serde(rename = "coverageStore")]
    pub coverage_store: CoverageStore,
}

/// A raster store, e.g. a GeoTIFF file or image mosaic.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CoverageStore {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type", default)]
    pub store_type: Option<String>,
}

// ── Styles ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(crate) struct StylesResponse {
    #[serde(deserialize_with = "listing")]
    pub styles: Vec<NamedRef>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StyleResponse {
    pub style: Style,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Style {
    pub name: String,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub language_version: Option<LanguageVersion>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LanguageVersion {
    pub version: String,
}

// ── Layers ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(crate) struct LayersResponse {
    #[serde(deserialize_with = "listing")]
    pub layers: Vec<NamedRef>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LayerResponse {
    pub layer: Layer,
}

/// A published layer. `resource.name` is qualified (`workspace:name`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layer {
    pub name: String,
    #[serde(rename = "type")]
    pub layer_type: String,
    #[serde(default)]
    pub default_style: Option<StyleRef>,
    #[serde(default, deserialize_with = "listing")]
    pub styles: Vec<StyleRef>,
    pub resource: ResourceRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResourceRef {
    #[serde(rename = "@class")]
    pub class: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FeatureTypeResponse {
    #[serde(rename = "featureType")]
    pub feature_type: Resource,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CoverageResponse {
    pub coverage: Resource,
}

/// The data behind a layer: a feature type (vector) or a coverage (raster).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub name: String,
    #[serde(default)]
    pub native_name: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    pub store: StoreRef,
    #[serde(default, deserialize_with = "listing")]
    pub attributes: Vec<Attribute>,
    #[serde(default)]
    pub service_configuration: bool,
    #[serde(default, deserialize_with = "listing")]
    pub disabled_services: Vec<String>,
}

/// Store reference from a resource; `name` is qualified (`workspace:store`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoreRef {
    #[serde(rename = "@class")]
    pub class: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Attribute {
    pub name: String,
    /// Fully qualified Java class, e.g. `org.locationtech.jts.geom.Point`.
    #[serde(default)]
    pub binding: Option<String>,
}

// ── Layer groups ────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(crate) struct LayerGroupsResponse {
    #[serde(rename = "layerGroups", deserialize_with = "listing")]
    pub layer_groups: Vec<NamedRef>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LayerGroupResponse {
    #[serde(rename = "layerGroup")]
    pub layer_group: LayerGroup,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LayerGroup {
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub workspace: Option<NamedRef>,
    #[serde(default, deserialize_with = "listing")]
    pub publishables: Vec<Published>,
    #[serde(default, deserialize_with = "listing")]
    pub styles: Vec<StyleSlot>,
}

/// A member of a layer group; `name` is qualified when the member lives
/// in a workspace.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Published {
    #[serde(rename = "@type")]
    pub kind: String,
    pub name: String,
}

/// Layer group styles line up with the publishables; an empty string
/// means "use the layer's default style".
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum StyleSlot {
    Named(StyleRef),
    Default(String),
}
