//! Data file command handlers: crawl GeoServer, list what was crawled.

use tabled::Tabled;

use mapinv_config::Config;
use mapinv_core::{
    Catalogue, EntityId, EntityKind, Fetcher, Layer, LayerGroup, Namespace, Repository, Server,
    Service, Style,
};

use crate::cli::{DataArgs, DataCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct ServerRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Hostname")]
    hostname: String,
    #[tabled(rename = "Type")]
    server_type: String,
    #[tabled(rename = "Version")]
    version: String,
}

#[derive(Tabled)]
struct NamespaceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "URI")]
    namespace: String,
    #[tabled(rename = "Server")]
    server: String,
}

#[derive(Tabled)]
struct RepositoryRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Type")]
    repository_type: String,
    #[tabled(rename = "Namespace")]
    namespace: String,
    #[tabled(rename = "Host")]
    host: String,
}

#[derive(Tabled)]
struct StyleRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Type")]
    style_type: String,
    #[tabled(rename = "Namespace")]
    namespace: String,
}

#[derive(Tabled)]
struct LayerRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Type")]
    layer_type: String,
    #[tabled(rename = "Geometry")]
    geometry: String,
    #[tabled(rename = "Services")]
    services: String,
    #[tabled(rename = "Namespace")]
    namespace: String,
    #[tabled(rename = "Repository")]
    repository: String,
}

#[derive(Tabled)]
struct LayerGroupRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Services")]
    services: String,
    #[tabled(rename = "Namespace")]
    namespace: String,
    #[tabled(rename = "Layers")]
    layers: usize,
}

/// Label lookups for relationship columns.
struct Labels<'c>(&'c Catalogue);

impl Labels<'_> {
    fn server(&self, id: &EntityId) -> String {
        self.0.servers.get(id).map_or_else(|| id.to_string(), |s| s.label.clone())
    }

    fn namespace(&self, id: Option<&EntityId>) -> String {
        match id {
            Some(id) => self
                .0
                .namespaces
                .get(id)
                .map_or_else(|| id.to_string(), |n| n.label.clone()),
            None => "(global)".into(),
        }
    }

    fn repository(&self, id: &EntityId) -> String {
        self.0
            .repositories
            .get(id)
            .map_or_else(|| id.to_string(), |r| r.label.clone())
    }
}

fn join_services(services: &[Service]) -> String {
    services
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: DataArgs, cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        DataCommand::Fetch => fetch(cfg, global).await,
        DataCommand::List { kind } => {
            let catalogue = util::load_catalogue(&config::data_path(global, cfg))?;
            let out = list(&catalogue, kind.into(), global)?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}

async fn fetch(cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    let sources = config::geoserver_sources(global, cfg)?;
    let path = config::data_path(global, cfg);

    let mut fetcher = Fetcher::new();
    for source in &sources {
        let spinner = util::spinner(
            format!("Fetching {} ({})", source.label, source.hostname),
            global.quiet,
        );
        let result = fetcher.fetch_source(source).await;
        spinner.finish_and_clear();
        result?;
    }
    let catalogue = fetcher.finish()?;
    catalogue.save(&path)?;

    let counts: Vec<(EntityKind, usize)> = EntityKind::ALL
        .into_iter()
        .map(|kind| (kind, catalogue.count(kind)))
        .collect();
    let summary = serde_json::json!({
        "path": path.display().to_string(),
        "counts": counts
            .iter()
            .map(|(kind, n)| (kind.plural().to_owned(), serde_json::Value::from(*n)))
            .collect::<serde_json::Map<_, _>>(),
    });
    let out = output::render_single(
        global.output,
        &summary,
        |_| {
            let summary = counts
                .iter()
                .map(|(kind, n)| format!("{n} {}", kind.title().to_lowercase()))
                .collect::<Vec<_>>()
                .join(", ");
            format!("Wrote {}: {summary}", path.display())
        },
        |_| path.display().to_string(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

fn list(catalogue: &Catalogue, kind: EntityKind, global: &GlobalOpts) -> Result<String, CliError> {
    let labels = Labels(catalogue);
    match kind {
        EntityKind::Server => {
            let items: Vec<&Server> = catalogue.servers.iter().collect();
            output::render_list(
                global.output,
                &items,
                |s| ServerRow {
                    id: s.id.to_string(),
                    label: s.label.clone(),
                    hostname: s.hostname.clone(),
                    server_type: s.server_type.to_string(),
                    version: s.version.clone(),
                },
                |s| s.id.to_string(),
            )
        }
        EntityKind::Namespace => {
            let items: Vec<&Namespace> = catalogue.namespaces.iter().collect();
            output::render_list(
                global.output,
                &items,
                |n| NamespaceRow {
                    id: n.id.to_string(),
                    label: n.label.clone(),
                    title: n.title.clone(),
                    namespace: n.namespace.clone(),
                    server: labels.server(&n.relationships.servers),
                },
                |n| n.id.to_string(),
            )
        }
        EntityKind::Repository => {
            let items: Vec<&Repository> = catalogue.repositories.iter().collect();
            output::render_list(
                global.output,
                &items,
                |r| RepositoryRow {
                    id: r.id.to_string(),
                    label: r.label.clone(),
                    title: r.title.clone(),
                    repository_type: r.repository_type.to_string(),
                    namespace: labels.namespace(Some(&r.relationships.namespaces)),
                    host: r.hostname.clone().unwrap_or_default(),
                },
                |r| r.id.to_string(),
            )
        }
        EntityKind::Style => {
            let items: Vec<&Style> = catalogue.styles.iter().collect();
            output::render_list(
                global.output,
                &items,
                |s| StyleRow {
                    id: s.id.to_string(),
                    label: s.label.clone(),
                    style_type: s.style_type.to_string(),
                    namespace: labels.namespace(s.relationships.namespaces.as_ref()),
                },
                |s| s.id.to_string(),
            )
        }
        EntityKind::Layer => {
            let items: Vec<&Layer> = catalogue.layers.iter().collect();
            output::render_list(
                global.output,
                &items,
                |l| LayerRow {
                    id: l.id.to_string(),
                    label: l.label.clone(),
                    title: l.title.clone(),
                    layer_type: l.layer_type.to_string(),
                    geometry: l.geometry.map(|g| g.to_string()).unwrap_or_default(),
                    services: join_services(&l.services),
                    namespace: labels.namespace(Some(&l.relationships.namespaces)),
                    repository: labels.repository(&l.relationships.repositories),
                },
                |l| l.id.to_string(),
            )
        }
        EntityKind::LayerGroup => {
            let items: Vec<&LayerGroup> = catalogue.layer_groups.iter().collect();
            output::render_list(
                global.output,
                &items,
                |g| LayerGroupRow {
                    id: g.id.to_string(),
                    label: g.label.clone(),
                    title: g.title.clone(),
                    services: join_services(&g.services),
                    namespace: labels.namespace(g.relationships.namespaces.as_ref()),
                    layers: g.relationships.layers.len(),
                },
                |g| g.id.to_string(),
            )
        }
    }
}
