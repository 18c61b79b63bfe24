// ── Runtime connection configuration ──
//
// These types describe how to reach Airtable and each GeoServer. They
// carry credentials and connection tuning but never touch disk; the CLI
// builds them from its config file and hands them in.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use mapinv_api::{AirtableClient, GeoServerClient, TlsMode, TransportConfig};

use crate::error::CoreError;
use crate::model::{EntityId, EntityKind};
use crate::sync::Tables;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed certs on internal servers).
    DangerAcceptInvalid,
}

impl TlsVerification {
    fn transport(&self, timeout: Duration) -> TransportConfig {
        let tls = match self {
            Self::SystemDefaults => TlsMode::System,
            Self::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            Self::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        };
        TransportConfig { tls, timeout }
    }
}

// ── Airtable ─────────────────────────────────────────────────────────

/// Airtable table name for each kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableNames {
    pub servers: String,
    pub namespaces: String,
    pub repositories: String,
    pub styles: String,
    pub layers: String,
    pub layer_groups: String,
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            servers: EntityKind::Server.default_table().into(),
            namespaces: EntityKind::Namespace.default_table().into(),
            repositories: EntityKind::Repository.default_table().into(),
            styles: EntityKind::Style.default_table().into(),
            layers: EntityKind::Layer.default_table().into(),
            layer_groups: EntityKind::LayerGroup.default_table().into(),
        }
    }
}

impl TableNames {
    pub fn get(&self, kind: EntityKind) -> &str {
        match kind {
            EntityKind::Server => &self.servers,
            EntityKind::Namespace => &self.namespaces,
            EntityKind::Repository => &self.repositories,
            EntityKind::Style => &self.styles,
            EntityKind::Layer => &self.layers,
            EntityKind::LayerGroup => &self.layer_groups,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AirtableConfig {
    /// API root, normally `https://api.airtable.com/v0/`.
    pub api_url: Url,
    /// Base id (`app…`).
    pub base_id: String,
    pub api_key: SecretString,
    pub tables: TableNames,
    /// Pause between paged or chunked requests.
    pub batch_delay: Duration,
    pub timeout: Duration,
}

impl AirtableConfig {
    pub fn client(&self) -> Result<AirtableClient, CoreError> {
        let transport = TlsVerification::SystemDefaults.transport(self.timeout);
        let client =
            AirtableClient::from_api_key(self.api_url.as_str(), &self.base_id, &self.api_key, &transport)?;
        Ok(client.with_batch_delay(self.batch_delay))
    }

    /// One table handle per kind.
    pub fn tables(&self) -> Result<Tables<mapinv_api::Table>, CoreError> {
        let client = self.client()?;
        Tables::try_from_fn(|kind| {
            client
                .table(self.tables.get(kind))
                .map_err(CoreError::from)
        })
    }
}

// ── GeoServer ────────────────────────────────────────────────────────

/// One GeoServer instance to crawl.
#[derive(Debug, Clone)]
pub struct GeoServerSource {
    /// Local id of the resulting server entity. Fixed by configuration so
    /// it is stable across fetches.
    pub id: EntityId,
    pub label: String,
    pub hostname: String,
    pub port: Option<u16>,
    /// `http` or `https`.
    pub scheme: String,
    /// REST root below the host, e.g. `/geoserver/rest`.
    pub api_path: String,
    pub username: String,
    pub password: SecretString,
    pub tls: TlsVerification,
    pub timeout: Duration,
}

impl GeoServerSource {
    pub fn rest_url(&self) -> Result<Url, CoreError> {
        let authority = match self.port {
            Some(port) => format!("{}:{port}", self.hostname),
            None => self.hostname.clone(),
        };
        let path = if self.api_path.starts_with('/') {
            self.api_path.clone()
        } else {
            format!("/{}", self.api_path)
        };
        let raw = format!("{}://{authority}{path}", self.scheme);
        Url::parse(&raw).map_err(|e| CoreError::Config {
            message: format!("invalid GeoServer URL for '{}' ({raw}): {e}", self.label),
        })
    }

    pub fn client(&self) -> Result<GeoServerClient, CoreError> {
        let transport = self.tls.transport(self.timeout);
        Ok(GeoServerClient::new(
            self.rest_url()?.as_str(),
            &self.username,
            self.password.clone(),
            &transport,
        )?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn source(port: Option<u16>, api_path: &str) -> GeoServerSource {
        GeoServerSource {
            id: EntityId::from("01DRS53XAG5E85MJNYTA6WPTBM"),
            label: "production".into(),
            hostname: "maps.example.com".into(),
            port,
            scheme: "https".into(),
            api_path: api_path.into(),
            username: "admin".into(),
            password: "geoserver".to_string().into(),
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
        }
    }

    #[test]
    fn rest_url_joins_host_port_and_path() {
        assert_eq!(
            source(Some(8443), "/geoserver/rest").rest_url().unwrap().as_str(),
            "https://maps.example.com:8443/geoserver/rest"
        );
        assert_eq!(
            source(None, "geoserver/rest").rest_url().unwrap().as_str(),
            "https://maps.example.com/geoserver/rest"
        );
    }

    #[test]
    fn default_table_names() {
        let names = TableNames::default();
        assert_eq!(names.get(EntityKind::Namespace), "Workspaces");
        assert_eq!(names.get(EntityKind::LayerGroup), "Layer Groups");
    }
}
