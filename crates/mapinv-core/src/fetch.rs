// ── Catalogue crawl ──
//
// Builds a `Catalogue` from one or more GeoServer instances. Every entity
// except the server gets a fresh id on each fetch; references between
// entities are resolved by label within the owning server or namespace
// as the crawl proceeds, so kinds are crawled in dependency order.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use mapinv_api::GeoServerClient;
use mapinv_api::geoserver::models::{self as gs, StyleRef, StyleSlot};

use crate::config::GeoServerSource;
use crate::error::CoreError;
use crate::model::enums::parse_local;
use crate::model::{
    EntityId, EntityKind, Layer, LayerGeometry, LayerGroup, LayerGroupRelationships,
    LayerRelationships, LayerType, Namespace, NamespaceRelationships, Repository,
    RepositoryRelationships, RepositoryType, Server, ServerType, Service, Style,
    StyleRelationships, StyleType,
};
use crate::store::Catalogue;

/// Placeholder title for entities GeoServer gives no title.
const NO_TITLE: &str = "-";

/// Package prefixes of JTS geometry bindings.
const JTS_PACKAGES: [&str; 2] = ["org.locationtech.jts.geom.", "com.vividsolutions.jts.geom."];

// ── Fetcher ──────────────────────────────────────────────────────────

/// Accumulates the entities of every crawled server.
#[derive(Debug, Default)]
pub struct Fetcher {
    catalogue: Catalogue,
    /// Global styles have no namespace to scope their label, so they are
    /// looked up per server here.
    global_styles: HashMap<(EntityId, String), EntityId>,
}

impl Fetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Crawl one configured server.
    pub async fn fetch_source(&mut self, source: &GeoServerSource) -> Result<(), CoreError> {
        let client = source.client()?;
        self.fetch_server(source, &client).await
    }

    /// Crawl one server through an existing client.
    pub async fn fetch_server(
        &mut self,
        source: &GeoServerSource,
        client: &GeoServerClient,
    ) -> Result<(), CoreError> {
        let server_id = source.id.clone();
        let version = client.version().await?;
        self.catalogue.servers.insert(Server {
            id: server_id.clone(),
            label: source.label.clone(),
            hostname: source.hostname.clone(),
            server_type: ServerType::Geoserver,
            version,
        })?;

        let workspaces = client.list_workspaces().await?;
        for workspace in &workspaces {
            self.fetch_namespace(client, &server_id, workspace).await?;
        }
        for workspace in &workspaces {
            self.fetch_repositories(client, &server_id, workspace).await?;
        }

        self.fetch_styles(client, &server_id, None).await?;
        for workspace in &workspaces {
            self.fetch_styles(client, &server_id, Some(workspace)).await?;
        }

        for qualified in client.list_layers().await? {
            self.fetch_layer(client, &server_id, &qualified).await?;
        }

        self.fetch_layer_groups(client, &server_id, None).await?;
        for workspace in &workspaces {
            self.fetch_layer_groups(client, &server_id, Some(workspace))
                .await?;
        }

        info!(
            server = %source.label,
            namespaces = self.catalogue.namespaces.len(),
            repositories = self.catalogue.repositories.len(),
            styles = self.catalogue.styles.len(),
            layers = self.catalogue.layers.len(),
            layer_groups = self.catalogue.layer_groups.len(),
            "fetched server"
        );
        Ok(())
    }

    /// The crawled catalogue, with every relationship checked.
    pub fn finish(self) -> Result<Catalogue, CoreError> {
        self.catalogue.validate()?;
        Ok(self.catalogue)
    }

    // ── Namespaces ───────────────────────────────────────────────────

    async fn fetch_namespace(
        &mut self,
        client: &GeoServerClient,
        server_id: &EntityId,
        workspace: &str,
    ) -> Result<(), CoreError> {
        let ns = client.get_namespace(workspace).await?;
        debug!(workspace, uri = %ns.uri, "namespace");
        self.catalogue.namespaces.insert(Namespace {
            id: EntityId::generate(),
            label: workspace.to_owned(),
            title: NO_TITLE.into(),
            namespace: ns.uri,
            isolated: ns.isolated,
            relationships: NamespaceRelationships {
                servers: server_id.clone(),
            },
        })
    }

    fn namespace_id(&self, server_id: &EntityId, workspace: &str) -> Result<EntityId, CoreError> {
        self.catalogue
            .namespaces
            .get_by_scoped_label(workspace, Some(server_id))
            .map(|ns| ns.id.clone())
            .ok_or_else(|| CoreError::NotFound {
                kind: EntityKind::Namespace,
                identifier: workspace.to_owned(),
            })
    }

    // ── Repositories ─────────────────────────────────────────────────

    async fn fetch_repositories(
        &mut self,
        client: &GeoServerClient,
        server_id: &EntityId,
        workspace: &str,
    ) -> Result<(), CoreError> {
        let namespace_id = self.namespace_id(server_id, workspace)?;

        for name in client.list_data_stores(workspace).await? {
            let store = client.get_data_store(workspace, &name).await?;
            let repository_type = repository_type(store.store_type.as_deref())?;
            let connection = |key: &str| {
                (repository_type == RepositoryType::Postgis)
                    .then(|| store.connection_parameters.get(key).cloned())
                    .flatten()
            };
            self.catalogue.repositories.insert(Repository {
                id: EntityId::generate(),
                label: store.name.clone(),
                title: title_or_placeholder(store.description.as_deref()),
                repository_type,
                hostname: connection("host"),
                database: connection("database"),
                schema: connection("schema"),
                relationships: RepositoryRelationships {
                    namespaces: namespace_id.clone(),
                },
            })?;
        }

        for name in client.list_coverage_stores(workspace).await? {
            let store = client.get_coverage_store(workspace, &name).await?;
            self.catalogue.repositories.insert(Repository {
                id: EntityId::generate(),
                label: store.name,
                title: title_or_placeholder(store.description.as_deref()),
                repository_type: repository_type(store.store_type.as_deref())?,
                hostname: None,
                database: None,
                schema: None,
                relationships: RepositoryRelationships {
                    namespaces: namespace_id.clone(),
                },
            })?;
        }
        Ok(())
    }

    // ── Styles ───────────────────────────────────────────────────────

    async fn fetch_styles(
        &mut self,
        client: &GeoServerClient,
        server_id: &EntityId,
        workspace: Option<&str>,
    ) -> Result<(), CoreError> {
        let namespace_id = workspace
            .map(|ws| self.namespace_id(server_id, ws))
            .transpose()?;

        for name in client.list_styles(workspace).await? {
            let style = client.get_style(workspace, &name).await?;
            let id = EntityId::generate();
            if namespace_id.is_none() {
                self.global_styles
                    .insert((server_id.clone(), style.name.clone()), id.clone());
            }
            self.catalogue.styles.insert(Style {
                id,
                label: style.name,
                title: NO_TITLE.into(),
                style_type: style_type(style.format.as_deref())?,
                relationships: StyleRelationships {
                    namespaces: namespace_id.clone(),
                },
            })?;
        }
        Ok(())
    }

    /// Resolve a style reference from a layer or layer group.
    fn style_id(&self, server_id: &EntityId, style: &StyleRef) -> Option<EntityId> {
        let (prefix, name) = split_qualified(&style.name);
        match style.workspace.as_deref().or(prefix) {
            Some(workspace) => {
                let namespace_id = self.namespace_id(server_id, workspace).ok()?;
                self.catalogue
                    .styles
                    .get_by_scoped_label(name, Some(&namespace_id))
                    .map(|s| s.id.clone())
            }
            None => self
                .global_styles
                .get(&(server_id.clone(), name.to_owned()))
                .cloned(),
        }
    }

    fn resolve_styles<'s>(
        &self,
        server_id: &EntityId,
        owner: &str,
        styles: impl IntoIterator<Item = &'s StyleRef>,
    ) -> Vec<EntityId> {
        let mut ids = Vec::new();
        for style in styles {
            match self.style_id(server_id, style) {
                Some(id) if !ids.contains(&id) => ids.push(id),
                Some(_) => {}
                None => warn!(owner, style = %style.name, "style not found, skipping"),
            }
        }
        ids
    }

    // ── Layers ───────────────────────────────────────────────────────

    async fn fetch_layer(
        &mut self,
        client: &GeoServerClient,
        server_id: &EntityId,
        qualified: &str,
    ) -> Result<(), CoreError> {
        let layer = client.get_layer(qualified).await?;
        let (layer_ws, _) = split_qualified(qualified);
        let (resource_ws, resource_name) = split_qualified(&layer.resource.name);
        let workspace = layer_ws.or(resource_ws).ok_or_else(|| CoreError::NotFound {
            kind: EntityKind::Namespace,
            identifier: format!("workspace of layer {qualified}"),
        })?;
        let namespace_id = self.namespace_id(server_id, workspace)?;

        let layer_type = parse_local::<LayerType>(&layer.layer_type.to_lowercase()).ok_or_else(
            || CoreError::UnrecognizedValue {
                kind: EntityKind::Layer,
                field: "type",
                value: layer.layer_type.clone(),
            },
        )?;
        let resource = match layer.resource.class.as_str() {
            "coverage" => client.get_coverage(workspace, resource_name).await?,
            _ => client.get_feature_type(workspace, resource_name).await?,
        };

        let (store_ws, store_name) = split_qualified(&resource.store.name);
        let store_namespace = match store_ws {
            Some(ws) => self.namespace_id(server_id, ws)?,
            None => namespace_id.clone(),
        };
        let repository = self
            .catalogue
            .repositories
            .get_by_scoped_label(store_name, Some(&store_namespace))
            .ok_or_else(|| CoreError::NotFound {
                kind: EntityKind::Repository,
                identifier: format!("{} (store of layer {qualified})", resource.store.name),
            })?;
        let table_view = (repository.repository_type == RepositoryType::Postgis)
            .then(|| resource.native_name.clone())
            .flatten();
        let repository_id = repository.id.clone();

        let styles = self.resolve_styles(
            server_id,
            qualified,
            layer.default_style.iter().chain(&layer.styles),
        );

        self.catalogue.layers.insert(Layer {
            id: EntityId::generate(),
            label: layer.name,
            title: title_or_placeholder(resource.title.as_deref()),
            layer_type,
            geometry: match layer_type {
                LayerType::Vector => geometry(&resource.attributes),
                LayerType::Raster => None,
            },
            services: services(layer_type, &resource),
            table_view,
            relationships: LayerRelationships {
                namespaces: namespace_id,
                repositories: repository_id,
                styles,
            },
        })
    }

    // ── Layer groups ─────────────────────────────────────────────────

    async fn fetch_layer_groups(
        &mut self,
        client: &GeoServerClient,
        server_id: &EntityId,
        workspace: Option<&str>,
    ) -> Result<(), CoreError> {
        let namespace_id = workspace
            .map(|ws| self.namespace_id(server_id, ws))
            .transpose()?;

        for name in client.list_layer_groups(workspace).await? {
            let group = client.get_layer_group(workspace, &name).await?;

            let mut layers = Vec::new();
            for published in group.publishables.iter().filter(|p| p.kind == "layer") {
                match self.layer_id(server_id, workspace, &published.name) {
                    Some(id) if !layers.contains(&id) => layers.push(id),
                    Some(_) => {}
                    None => warn!(group = %name, layer = %published.name, "layer not found, skipping"),
                }
            }
            let named_styles = group.styles.iter().filter_map(|slot| match slot {
                StyleSlot::Named(style) if !style.name.is_empty() => Some(style),
                _ => None,
            });
            let styles = self.resolve_styles(server_id, &name, named_styles);

            self.catalogue.layer_groups.insert(LayerGroup {
                id: EntityId::generate(),
                label: group.name,
                title: title_or_placeholder(group.title.as_deref()),
                services: vec![Service::Wms],
                relationships: LayerGroupRelationships {
                    namespaces: namespace_id.clone(),
                    layers,
                    styles,
                },
            })?;
        }
        Ok(())
    }

    fn layer_id(
        &self,
        server_id: &EntityId,
        group_workspace: Option<&str>,
        published: &str,
    ) -> Option<EntityId> {
        let (prefix, name) = split_qualified(published);
        let workspace = prefix.or(group_workspace)?;
        let namespace_id = self.namespace_id(server_id, workspace).ok()?;
        self.catalogue
            .layers
            .get_by_scoped_label(name, Some(&namespace_id))
            .map(|l| l.id.clone())
    }
}

// ── Helpers ──────────────────────────────────────────────────────────

/// Split `workspace:name`; bare names have no workspace.
fn split_qualified(name: &str) -> (Option<&str>, &str) {
    match name.split_once(':') {
        Some((ws, local)) => (Some(ws), local),
        None => (None, name),
    }
}

fn title_or_placeholder(title: Option<&str>) -> String {
    title
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(NO_TITLE)
        .to_owned()
}

fn repository_type(store_type: Option<&str>) -> Result<RepositoryType, CoreError> {
    let raw = store_type.unwrap_or_default();
    parse_local(&raw.to_lowercase()).ok_or_else(|| CoreError::UnrecognizedValue {
        kind: EntityKind::Repository,
        field: "type",
        value: raw.to_owned(),
    })
}

/// SLD in any version. A style without a format is SLD, GeoServer's
/// default.
fn style_type(format: Option<&str>) -> Result<StyleType, CoreError> {
    match format {
        None => Ok(StyleType::Sld),
        Some(f) if f.to_lowercase().starts_with("sld") => Ok(StyleType::Sld),
        Some(other) => Err(CoreError::UnrecognizedValue {
            kind: EntityKind::Style,
            field: "type",
            value: other.to_owned(),
        }),
    }
}

/// Geometry of the first JTS-bound attribute. A generic `Geometry`
/// binding has no specific type.
fn geometry(attributes: &[gs::Attribute]) -> Option<LayerGeometry> {
    let binding = attributes.iter().find_map(|a| {
        let binding = a.binding.as_deref()?;
        JTS_PACKAGES
            .iter()
            .find_map(|package| binding.strip_prefix(package))
    })?;
    match binding {
        "Point" => Some(LayerGeometry::Point),
        "LineString" => Some(LayerGeometry::Linestring),
        "Polygon" => Some(LayerGeometry::Polygon),
        "MultiPoint" => Some(LayerGeometry::MultiPoint),
        "MultiLineString" => Some(LayerGeometry::MultiLinestring),
        "MultiPolygon" => Some(LayerGeometry::MultiPolygon),
        _ => None,
    }
}

/// WMS plus the data service matching the layer type, less any service
/// the resource disables.
fn services(layer_type: LayerType, resource: &gs::Resource) -> Vec<Service> {
    let data_service = match layer_type {
        LayerType::Vector => Service::Wfs,
        LayerType::Raster => Service::Wcs,
    };
    let disabled: Vec<Service> = if resource.service_configuration {
        resource
            .disabled_services
            .iter()
            .filter_map(|s| s.to_uppercase().parse().ok())
            .collect()
    } else {
        Vec::new()
    };
    [Service::Wms, data_service]
        .into_iter()
        .filter(|s| !disabled.contains(s))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn attribute(binding: &str) -> gs::Attribute {
        serde_json::from_value(serde_json::json!({ "name": "geom", "binding": binding })).unwrap()
    }

    #[test]
    fn geometry_from_first_jts_binding() {
        let attributes = vec![
            attribute("java.lang.Integer"),
            attribute("org.locationtech.jts.geom.MultiPolygon"),
            attribute("org.locationtech.jts.geom.Point"),
        ];
        assert_eq!(geometry(&attributes), Some(LayerGeometry::MultiPolygon));
        assert_eq!(
            geometry(&[attribute("com.vividsolutions.jts.geom.LineString")]),
            Some(LayerGeometry::Linestring)
        );
        assert_eq!(geometry(&[attribute("org.locationtech.jts.geom.Geometry")]), None);
        assert_eq!(geometry(&[]), None);
    }

    #[test]
    fn store_types_use_local_vocabulary() {
        assert_eq!(repository_type(Some("PostGIS")).unwrap(), RepositoryType::Postgis);
        assert_eq!(repository_type(Some("GeoTIFF")).unwrap(), RepositoryType::Geotiff);
        assert_eq!(repository_type(Some("JP2ECW")).unwrap(), RepositoryType::Jpeg2000);
        assert_eq!(
            repository_type(Some("ImageMosaic")).unwrap(),
            RepositoryType::ImageMosaic
        );
        assert!(matches!(
            repository_type(Some("Shapefile")),
            Err(CoreError::UnrecognizedValue { .. })
        ));
    }

    #[test]
    fn style_formats() {
        assert_eq!(style_type(Some("sld")).unwrap(), StyleType::Sld);
        assert_eq!(style_type(Some("SLD_1_1_0")).unwrap(), StyleType::Sld);
        assert!(style_type(Some("css")).is_err());
    }

    #[test]
    fn qualified_names() {
        assert_eq!(split_qualified("base:coastline"), (Some("base"), "coastline"));
        assert_eq!(split_qualified("point"), (None, "point"));
    }

    #[test]
    fn titles_fall_back_to_placeholder() {
        assert_eq!(title_or_placeholder(Some("  ")), "-");
        assert_eq!(title_or_placeholder(None), "-");
        assert_eq!(title_or_placeholder(Some("Coastline")), "Coastline");
    }
}
