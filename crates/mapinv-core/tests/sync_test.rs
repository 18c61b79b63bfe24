#![allow(clippy::unwrap_used)]
// Integration tests for `Inventory` against in-memory remote tables.

use std::collections::HashSet;

use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use mapinv_core::sync::RecordTable;
use mapinv_core::{
    Catalogue, EntityId, EntityKind, Inventory, MemoryTable, SyncOutcome, Tables,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn catalogue() -> Catalogue {
    let data = json!({
        "servers": [{
            "id": "S1", "label": "production", "hostname": "maps.example.com",
            "type": "geoserver", "version": "2.16.2"
        }],
        "namespaces": [{
            "id": "N1", "label": "foo", "title": "Foo",
            "namespace": "https://example.com/foo", "isolated": false,
            "relationships": { "servers": "S1" }
        }],
        "repositories": [{
            "id": "R1", "label": "postgis", "title": "Base PostGIS", "type": "postgis",
            "hostname": "db.example.com", "database": "gis", "schema": "public",
            "relationships": { "namespaces": "N1" }
        }],
        "styles": [
            { "id": "ST1", "label": "point", "title": "-", "type": "sld", "relationships": {} },
            {
                "id": "ST2", "label": "coastline", "title": "-", "type": "sld",
                "relationships": { "namespaces": "N1" }
            }
        ],
        "layers": [{
            "id": "L1", "label": "coastline", "title": "Coastline", "type": "vector",
            "geometry": "multi-linestring", "services": ["wms", "wfs"],
            "table_view": "coastline_v7",
            "relationships": { "namespaces": "N1", "repositories": "R1", "styles": ["ST2", "ST1"] }
        }],
        "layer-groups": [{
            "id": "LG1", "label": "basemap", "title": "Base map", "services": ["wms"],
            "relationships": { "namespaces": "N1", "layers": ["L1"], "styles": ["ST2"] }
        }]
    });
    Catalogue::from_json(&data.to_string()).unwrap()
}

fn namespace_only() -> Catalogue {
    let data = json!({
        "servers": [{
            "id": "S1", "label": "production", "hostname": "maps.example.com",
            "type": "geoserver", "version": "2.16.2"
        }],
        "namespaces": [{
            "id": "N1", "label": "foo", "title": "Foo",
            "namespace": "https://example.com/foo",
            "relationships": { "servers": "S1" }
        }]
    });
    Catalogue::from_json(&data.to_string()).unwrap()
}

fn setup(catalogue: Catalogue) -> Inventory<MemoryTable> {
    let tables = Tables::try_from_fn(|kind| {
        Ok::<_, std::convert::Infallible>(MemoryTable::new(kind.default_table()))
    })
    .unwrap();
    Inventory::new(catalogue, tables)
}

fn ids(ids: &[&str]) -> Vec<EntityId> {
    ids.iter().map(|id| EntityId::from(*id)).collect()
}

fn fields(value: Value) -> mapinv_api::Fields {
    value.as_object().cloned().unwrap()
}

// ── Example scenarios ───────────────────────────────────────────────

#[tokio::test]
async fn test_missing_namespace_is_created_with_server_link() {
    let mut inventory = setup(namespace_only());

    let status = inventory.status(EntityKind::Namespace).await.unwrap();
    assert_eq!(status.status.missing, ids(&["N1"]));
    assert!(status.status.current.is_empty());
    assert!(status.status.outdated.is_empty());
    assert!(status.status.orphaned.is_empty());

    inventory.sync(EntityKind::Server).await.unwrap();
    let report = inventory.sync(EntityKind::Namespace).await.unwrap();
    assert_eq!(report.outcome.created, 1);

    let server_id = inventory.servers().table().records()[0].id.clone();
    let records = inventory.namespaces().table().records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].fields["Name"], "foo");
    assert_eq!(records[0].fields["Title"], "Foo");
    assert_eq!(records[0].fields["Server"], json!([server_id.as_str()]));

    let status = inventory.status(EntityKind::Namespace).await.unwrap();
    assert_eq!(status.status.missing, Vec::<EntityId>::new());
    assert_eq!(status.status.current, ids(&["N1"]));
}

#[tokio::test]
async fn test_orphaned_namespace_is_removed() {
    let mut inventory = setup(namespace_only());
    inventory.sync(EntityKind::Server).await.unwrap();
    let server_id = inventory.servers().table().records()[0].id.clone();
    inventory.namespaces().table().seed(fields(json!({
        "ID": "N2", "Name": "bar", "Title": "Bar", "Server": [server_id.as_str()]
    })));

    let status = inventory.status(EntityKind::Namespace).await.unwrap();
    assert_eq!(status.status.missing, ids(&["N1"]));
    assert_eq!(status.status.orphaned, vec!["N2".to_owned()]);

    let report = inventory.sync(EntityKind::Namespace).await.unwrap();
    assert_eq!(report.outcome, SyncOutcome { created: 1, updated: 0, deleted: 1 });
    let declared: Vec<Value> = inventory
        .namespaces()
        .table()
        .records()
        .into_iter()
        .map(|r| r.fields["ID"].clone())
        .collect();
    assert_eq!(declared, vec![json!("N1")]);
}

// ── Properties ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_status_partitions_every_kind() {
    let mut inventory = setup(catalogue());
    inventory.sync(EntityKind::Server).await.unwrap();
    inventory.sync(EntityKind::Namespace).await.unwrap();
    inventory.sync(EntityKind::Style).await.unwrap();

    let report = inventory.status_all().await.unwrap();
    assert_eq!(report.kinds.len(), 6);
    for kind in &report.kinds {
        let status = &kind.status;
        let all: Vec<&EntityId> = status
            .missing
            .iter()
            .chain(&status.current)
            .chain(&status.outdated)
            .collect();
        let unique: HashSet<&EntityId> = all.iter().copied().collect();
        assert_eq!(all.len(), unique.len(), "{} lists overlap", kind.kind);
        let expected = if kind.kind == EntityKind::Style { 2 } else { 1 };
        assert_eq!(all.len(), expected, "{} lists omit ids", kind.kind);
    }
    assert_eq!(report.totals.current, 4);
    assert_eq!(report.totals.missing, 3);
}

#[tokio::test]
async fn test_sync_all_is_idempotent() {
    let mut inventory = setup(catalogue());

    let first = inventory.sync_all().await.unwrap();
    let created: usize = first.iter().map(|r| r.outcome.created).sum();
    assert_eq!(created, 7);
    assert!(first.iter().all(|r| r.after.missing == 0 && r.after.outdated == 0));

    let status = inventory.status_all().await.unwrap();
    assert!(status.is_in_sync());
    assert_eq!(status.totals.current, 7);

    let second = inventory.sync_all().await.unwrap();
    assert!(second.iter().all(|r| r.outcome == SyncOutcome::default()));
    assert_eq!(inventory.status_all().await.unwrap(), status);
}

#[tokio::test]
async fn test_duplicate_server_record_is_reported_then_removed() {
    let mut inventory = setup(catalogue());
    inventory.sync_all().await.unwrap();
    let copy = inventory.servers().table().records()[0].fields.clone();
    let duplicate = inventory.servers().table().seed(copy);

    let status = inventory.status_all().await.unwrap();
    assert!(!status.is_in_sync());
    assert_eq!(status.totals.current, 7);
    assert_eq!(status.totals.duplicates, 1);
    assert_eq!(status.kinds[0].kind, EntityKind::Server);
    assert_eq!(status.kinds[0].status.duplicates, vec![duplicate]);

    let reports = inventory.sync_all().await.unwrap();
    assert_eq!(reports[0].before.duplicates, 1);
    assert_eq!(reports[0].outcome, SyncOutcome { created: 0, updated: 0, deleted: 1 });
    assert_eq!(reports[0].after.duplicates, 0);
    assert!(inventory.status_all().await.unwrap().is_in_sync());
}

#[tokio::test]
async fn test_layer_links_resolve_to_synced_records() {
    let mut inventory = setup(catalogue());
    inventory.sync_all().await.unwrap();

    let styles = inventory.styles().bridge();
    let mut expected: Vec<String> = ["ST1", "ST2"]
        .iter()
        .map(|id| styles.remote_id(&EntityId::from(*id)).unwrap().to_string())
        .collect();
    expected.sort();

    let layer = &inventory.layers().table().records()[0];
    assert_eq!(layer.fields["Styles"], json!(expected));
    assert_eq!(layer.fields["Geometry"], "Multi-Linestring");
    assert_eq!(layer.fields["Services"], json!(["WMS", "WFS"]));

    let group = &inventory.layer_groups().table().records()[0];
    assert_eq!(group.fields["Layers"], json!([layer.id.as_str()]));
}

#[tokio::test]
async fn test_changed_title_is_outdated_then_repaired() {
    let mut inventory = setup(catalogue());
    inventory.sync_all().await.unwrap();
    let layer_id = inventory.layers().table().records()[0].id.clone();
    inventory
        .layers()
        .table()
        .set_field(&layer_id, "Title", json!("Edited remotely"));

    let status = inventory.status(EntityKind::Layer).await.unwrap();
    assert_eq!(status.status.outdated, ids(&["L1"]));

    let report = inventory.sync(EntityKind::Layer).await.unwrap();
    assert_eq!(report.outcome.updated, 1);
    assert_eq!(report.after.current, 1);
    assert_eq!(
        inventory.layers().table().get(&layer_id).unwrap()["Title"],
        "Coastline"
    );
}

#[tokio::test]
async fn test_deleted_style_record_converges() {
    let mut inventory = setup(catalogue());
    inventory.sync_all().await.unwrap();

    let style_remote = inventory
        .styles()
        .bridge()
        .remote_id(&EntityId::from("ST1"))
        .unwrap()
        .clone();
    inventory
        .styles()
        .table()
        .batch_delete(vec![style_remote])
        .await
        .unwrap();

    let report = inventory.status_all().await.unwrap();
    let styles = &report.kinds[3].status;
    assert_eq!(styles.missing, ids(&["ST1"]));
    // The layer still names the deleted style, so it can no longer be read
    // and is rewritten in place rather than duplicated.
    let layers = &report.kinds[4].status;
    assert_eq!(layers.outdated, ids(&["L1"]));
    assert!(layers.orphaned.is_empty());

    inventory.sync_all().await.unwrap();
    let report = inventory.status_all().await.unwrap();
    assert!(report.is_in_sync());
    assert_eq!(inventory.layers().table().len(), 1);
}

#[tokio::test]
async fn test_reset_all_empties_tables_dependants_first() {
    let mut inventory = setup(catalogue());
    inventory.sync_all().await.unwrap();
    inventory
        .namespaces()
        .table()
        .seed(fields(json!({ "ID": "N-stale" })));

    let reports = inventory.reset_all().await.unwrap();
    let order: Vec<EntityKind> = reports.iter().map(|r| r.kind).collect();
    assert_eq!(
        order,
        EntityKind::ALL.into_iter().rev().collect::<Vec<_>>()
    );
    let deleted: usize = reports.iter().map(|r| r.deleted).sum();
    assert_eq!(deleted, 8);

    for kind in EntityKind::ALL {
        assert_eq!(inventory.table_name(kind), kind.default_table());
    }
    assert!(inventory.servers().table().is_empty());
    assert!(inventory.namespaces().table().is_empty());
    assert!(inventory.layer_groups().table().is_empty());

    let status = inventory.status_all().await.unwrap();
    assert_eq!(status.totals.missing, 7);
}

#[tokio::test]
async fn test_unsynced_predecessor_is_fatal_for_writes() {
    let mut inventory = setup(namespace_only());
    let err = inventory.sync(EntityKind::Namespace).await.unwrap_err();
    assert!(
        matches!(
            err,
            mapinv_core::CoreError::UnresolvedReference {
                kind: EntityKind::Namespace,
                relation: EntityKind::Server,
                ..
            }
        ),
        "expected UnresolvedReference, got: {err:?}"
    );
    assert!(inventory.namespaces().table().is_empty());
}
