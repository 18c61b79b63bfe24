#![allow(clippy::unwrap_used)]
// Integration tests for the GeoServer crawl using wiremock.

use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use mapinv_core::{
    Catalogue, CoreError, EntityId, Fetcher, GeoServerSource, LayerGeometry, RepositoryType,
    Service, TlsVerification,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn source(server: &MockServer) -> GeoServerSource {
    GeoServerSource {
        id: EntityId::from("01DRS53XAG5E85MJNYTA6WPTBM"),
        label: "test".into(),
        hostname: "127.0.0.1".into(),
        port: Some(server.address().port()),
        scheme: "http".into(),
        api_path: "/geoserver/rest".into(),
        username: "admin".into(),
        password: "geoserver".to_string().into(),
        tls: TlsVerification::SystemDefaults,
        timeout: Duration::from_secs(5),
    }
}

async fn mount_json(server: &MockServer, rest_path: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/geoserver/rest/{rest_path}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// One workspace with a PostGIS store, a GeoTIFF store, a global and a
/// workspace style, a vector and a raster layer, and one layer group.
async fn mount_catalogue(server: &MockServer, data_store_type: &str) {
    mount_json(
        server,
        "about/version.json",
        json!({ "about": { "resource": [{ "@name": "GeoServer", "Version": "2.16.2" }] } }),
    )
    .await;
    mount_json(
        server,
        "workspaces.json",
        json!({ "workspaces": { "workspace": [{ "name": "base" }] } }),
    )
    .await;
    mount_json(
        server,
        "namespaces/base.json",
        json!({ "namespace": { "prefix": "base", "uri": "https://example.com/base", "isolated": false } }),
    )
    .await;

    mount_json(
        server,
        "workspaces/base/datastores.json",
        json!({ "dataStores": { "dataStore": [{ "name": "postgis" }] } }),
    )
    .await;
    mount_json(
        server,
        "workspaces/base/datastores/postgis.json",
        json!({ "dataStore": {
            "name": "postgis",
            "description": "Base PostGIS",
            "type": data_store_type,
            "connectionParameters": { "entry": [
                { "@key": "host", "$": "db.example.com" },
                { "@key": "database", "$": "gis" },
                { "@key": "schema", "$": "public" },
                { "@key": "passwd", "$": "secret" }
            ]}
        }}),
    )
    .await;
    mount_json(
        server,
        "workspaces/base/coveragestores.json",
        json!({ "coverageStores": { "coverageStore": { "name": "dem" } } }),
    )
    .await;
    mount_json(
        server,
        "workspaces/base/coveragestores/dem.json",
        json!({ "coverageStore": { "name": "dem", "type": "GeoTIFF" } }),
    )
    .await;

    mount_json(
        server,
        "styles.json",
        json!({ "styles": { "style": [{ "name": "point" }] } }),
    )
    .await;
    mount_json(
        server,
        "styles/point.json",
        json!({ "style": { "name": "point", "format": "sld" } }),
    )
    .await;
    mount_json(
        server,
        "workspaces/base/styles.json",
        json!({ "styles": { "style": [{ "name": "coastline" }] } }),
    )
    .await;
    mount_json(
        server,
        "workspaces/base/styles/coastline.json",
        json!({ "style": { "name": "coastline", "format": "sld" } }),
    )
    .await;

    mount_json(
        server,
        "layers.json",
        json!({ "layers": { "layer": [{ "name": "base:coastline" }, { "name": "base:dem" }] } }),
    )
    .await;
    mount_json(
        server,
        "layers/base:coastline.json",
        json!({ "layer": {
            "name": "coastline",
            "type": "VECTOR",
            "defaultStyle": { "name": "base:coastline", "workspace": "base" },
            "styles": { "@class": "linked-hash-set", "style": [
                { "name": "point" },
                { "name": "missing-style" }
            ]},
            "resource": { "@class": "featureType", "name": "base:coastline" }
        }}),
    )
    .await;
    mount_json(
        server,
        "workspaces/base/featuretypes/coastline.json",
        json!({ "featureType": {
            "name": "coastline",
            "nativeName": "coastline_v7",
            "title": "Coastline",
            "store": { "@class": "dataStore", "name": "base:postgis" },
            "attributes": { "attribute": [
                { "name": "gid", "binding": "java.lang.Integer" },
                { "name": "geom", "binding": "org.locationtech.jts.geom.MultiLineString" }
            ]},
            "serviceConfiguration": true,
            "disabledServices": { "string": "WFS" }
        }}),
    )
    .await;
    mount_json(
        server,
        "layers/base:dem.json",
        json!({ "layer": {
            "name": "dem",
            "type": "RASTER",
            "defaultStyle": { "name": "raster" },
            "resource": { "@class": "coverage", "name": "base:dem" }
        }}),
    )
    .await;
    mount_json(
        server,
        "workspaces/base/coverages/dem.json",
        json!({ "coverage": {
            "name": "dem",
            "nativeName": "dem",
            "title": "Elevation",
            "store": { "@class": "coverageStore", "name": "base:dem" }
        }}),
    )
    .await;

    mount_json(server, "layergroups.json", json!({ "layerGroups": "" })).await;
    mount_json(
        server,
        "workspaces/base/layergroups.json",
        json!({ "layerGroups": { "layerGroup": [{ "name": "basemap" }] } }),
    )
    .await;
    mount_json(
        server,
        "workspaces/base/layergroups/basemap.json",
        json!({ "layerGroup": {
            "name": "basemap",
            "title": "Base map",
            "workspace": { "name": "base" },
            "publishables": { "published": [
                { "@type": "layer", "name": "base:coastline" },
                { "@type": "layer", "name": "base:dem" }
            ]},
            "styles": { "style": [
                { "name": "base:coastline", "workspace": "base" },
                ""
            ]}
        }}),
    )
    .await;
}

async fn crawl(server: &MockServer) -> Result<Catalogue, CoreError> {
    let mut fetcher = Fetcher::new();
    fetcher.fetch_source(&source(server)).await?;
    fetcher.finish()
}

// ── Crawl ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_crawl_builds_linked_catalogue() {
    let server = MockServer::start().await;
    mount_catalogue(&server, "PostGIS").await;

    let catalogue = crawl(&server).await.unwrap();

    let geoserver = catalogue.servers.iter().next().unwrap();
    assert_eq!(geoserver.id, EntityId::from("01DRS53XAG5E85MJNYTA6WPTBM"));
    assert_eq!(geoserver.version, "2.16.2");

    let namespace = catalogue.namespaces.get_by_label("base").unwrap();
    assert_eq!(namespace.namespace, "https://example.com/base");
    assert_eq!(namespace.title, "-");
    assert_eq!(namespace.relationships.servers, geoserver.id);

    let postgis = catalogue.repositories.get_by_label("postgis").unwrap();
    assert_eq!(postgis.repository_type, RepositoryType::Postgis);
    assert_eq!(postgis.title, "Base PostGIS");
    assert_eq!(postgis.hostname.as_deref(), Some("db.example.com"));
    assert_eq!(postgis.schema.as_deref(), Some("public"));
    let dem_store = catalogue.repositories.get_by_label("dem").unwrap();
    assert_eq!(dem_store.repository_type, RepositoryType::Geotiff);
    assert_eq!(dem_store.hostname, None);

    let point = catalogue.styles.get_by_scoped_label("point", None).unwrap();
    let coastline_style = catalogue
        .styles
        .get_by_scoped_label("coastline", Some(&namespace.id))
        .unwrap();

    let coastline = catalogue.layers.get_by_label("coastline").unwrap();
    assert_eq!(coastline.title, "Coastline");
    assert_eq!(coastline.geometry, Some(LayerGeometry::MultiLinestring));
    assert_eq!(coastline.services, vec![Service::Wms]);
    assert_eq!(coastline.table_view.as_deref(), Some("coastline_v7"));
    assert_eq!(coastline.relationships.repositories, postgis.id);
    assert_eq!(
        coastline.relationships.styles,
        vec![coastline_style.id.clone(), point.id.clone()]
    );

    let dem = catalogue.layers.get_by_label("dem").unwrap();
    assert_eq!(dem.geometry, None);
    assert_eq!(dem.services, vec![Service::Wms, Service::Wcs]);
    assert_eq!(dem.table_view, None);
    assert!(dem.relationships.styles.is_empty());

    let basemap = catalogue.layer_groups.get_by_label("basemap").unwrap();
    assert_eq!(basemap.services, vec![Service::Wms]);
    assert_eq!(basemap.relationships.namespaces.as_ref(), Some(&namespace.id));
    assert_eq!(
        basemap.relationships.layers,
        vec![coastline.id.clone(), dem.id.clone()]
    );
    assert_eq!(basemap.relationships.styles, vec![coastline_style.id.clone()]);
}

#[tokio::test]
async fn test_crawled_catalogue_survives_data_file() {
    let server = MockServer::start().await;
    mount_catalogue(&server, "PostGIS").await;
    let catalogue = crawl(&server).await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("resources").join("data.json");
    catalogue.save(&file).unwrap();
    assert_eq!(Catalogue::load(&file).unwrap(), catalogue);
}

#[tokio::test]
async fn test_unknown_store_type_is_rejected() {
    let server = MockServer::start().await;
    mount_catalogue(&server, "Shapefile").await;

    let err = crawl(&server).await.unwrap_err();
    assert!(
        matches!(err, CoreError::UnrecognizedValue { ref value, .. } if value == "Shapefile"),
        "expected UnrecognizedValue, got: {err:?}"
    );
}

#[tokio::test]
async fn test_bad_credentials_abort_the_crawl() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = crawl(&server).await.unwrap_err();
    assert!(
        matches!(err, CoreError::AuthenticationFailed { .. }),
        "expected AuthenticationFailed, got: {err:?}"
    );
}
