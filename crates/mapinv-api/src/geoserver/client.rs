// Hand-crafted async HTTP client for the GeoServer REST catalogue.
//
// Base path: {endpoint}/rest/ (configurable)
// Auth: HTTP basic

use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::models::{
    CoverageResponse, CoverageStore, CoverageStoreResponse, CoverageStoresResponse, DataStore,
    DataStoreResponse, DataStoresResponse, FeatureTypeResponse, Layer, LayerGroup,
    LayerGroupResponse, LayerGroupsResponse, LayerResponse, LayersResponse, Namespace,
    NamespaceResponse, Resource, Style, StyleResponse, StylesResponse, VersionResponse,
    WorkspacesResponse,
};
use crate::{Error, TransportConfig};

// ── Client ───────────────────────────────────────────────────────────

/// Read-only async client for one GeoServer instance.
#[derive(Debug, Clone)]
pub struct GeoServerClient {
    http: reqwest::Client,
    base_url: Url,
    username: String,
    password: SecretString,
    timeout_secs: u64,
}

impl GeoServerClient {
    /// Build from the REST endpoint (e.g. `http://host:8080/geoserver/rest`)
    /// and basic-auth credentials.
    pub fn new(
        rest_url: &str,
        username: &str,
        password: SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        let mut client = Self::with_client(http, Url::parse(rest_url)?, username, password);
        client.timeout_secs = transport.timeout.as_secs();
        Ok(client)
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        mut rest_url: Url,
        username: &str,
        password: SecretString,
    ) -> Self {
        if !rest_url.path().ends_with('/') {
            let path = format!("{}/", rest_url.path());
            rest_url.set_path(&path);
        }
        Self {
            http,
            base_url: rest_url,
            username: username.to_owned(),
            password,
            timeout_secs: TransportConfig::default().timeout.as_secs(),
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join path segments onto the base URL, percent-encoding each one.
    fn url(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    // ── HTTP ─────────────────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, Error> {
        let url = self.url(segments)?;
        debug!("GET {url}");

        let resp = self
            .http
            .get(url)
            .basic_auth(&self.username, Some(self.password.expose_secret()))
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::Timeout {
                        timeout_secs: self.timeout_secs,
                    }
                } else {
                    Error::Transport(e)
                }
            })?;
        handle_response(resp).await
    }

    // ━━ Public API ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    // ── About ────────────────────────────────────────────────────────

    /// The GeoServer version string (e.g. `"2.16.2"`).
    pub async fn version(&self) -> Result<String, Error> {
        let response: VersionResponse = self.get(&["about", "version.json"]).await?;
        let version = response
            .about
            .resource
            .into_iter()
            .find(|r| r.name == "GeoServer")
            .and_then(|r| r.version)
            .map(|v| match v {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            });
        Ok(version.unwrap_or_default())
    }

    // ── Workspaces ───────────────────────────────────────────────────

    pub async fn list_workspaces(&self) -> Result<Vec<String>, Error> {
        let response: WorkspacesResponse = self.get(&["workspaces.json"]).await?;
        Ok(response.workspaces.into_iter().map(|w| w.name).collect())
    }

    pub async fn get_namespace(&self, prefix: &str) -> Result<Namespace, Error> {
        let response: NamespaceResponse = self
            .get(&["namespaces", &format!("{prefix}.json")])
            .await?;
        Ok(response.namespace)
    }

    // ── Stores ───────────────────────────────────────────────────────

    pub async fn list_data_stores(&self, workspace: &str) -> Result<Vec<String>, Error> {
        let response: DataStoresResponse = self
            .get(&["workspaces", workspace, "datastores.json"])
            .await?;
        Ok(response.data_stores.into_iter().map(|s| s.name).collect())
    }

    pub async fn get_data_store(&self, workspace: &str, name: &str) -> Result<DataStore, Error> {
        let response: DataStoreResponse = self
            .get(&["workspaces", workspace, "datastores", &format!("{name}.json")])
            .await?;
        Ok(response.data_store)
    }

    pub async fn list_coverage_stores(&self, workspace: &str) -> Result<Vec<String>, Error> {
        let response: CoverageStoresResponse = self
            .get(&["workspaces", workspace, "coveragestores.json"])
            .await?;
        Ok(response.coverage_stores.into_iter().map(|s| s.name).collect())
    }

    pub async fn get_coverage_store(
        &self,
        workspace: &str,
        name: &str,
    ) -> Result<CoverageStore, Error> {
        let response: CoverageStoreResponse = self
            .get(&[
                "workspaces",
                workspace,
                "coveragestores",
                &format!("{name}.json"),
            ])
            .await?;
        Ok(response.coverage_store)
    }

    // ── Styles ───────────────────────────────────────────────────────

    /// Global styles when `workspace` is `None`, otherwise the styles
    /// private to that workspace.
    pub async fn list_styles(&self, workspace: Option<&str>) -> Result<Vec<String>, Error> {
        let response: StylesResponse = match workspace {
            Some(ws) => self.get(&["workspaces", ws, "styles.json"]).await?,
            None => self.get(&["styles.json"]).await?,
        };
        Ok(response.styles.into_iter().map(|s| s.name).collect())
    }

    pub async fn get_style(&self, workspace: Option<&str>, name: &str) -> Result<Style, Error> {
        let file = format!("{name}.json");
        let response: StyleResponse = match workspace {
            Some(ws) => self.get(&["workspaces", ws, "styles", &file]).await?,
            None => self.get(&["styles", &file]).await?,
        };
        Ok(response.style)
    }

    // ── Layers ───────────────────────────────────────────────────────

    /// Qualified (`workspace:name`) names of every published layer.
    pub async fn list_layers(&self) -> Result<Vec<String>, Error> {
        let response: LayersResponse = self.get(&["layers.json"]).await?;
        Ok(response.layers.into_iter().map(|l| l.name).collect())
    }

    pub async fn get_layer(&self, qualified_name: &str) -> Result<Layer, Error> {
        let response: LayerResponse = self
            .get(&["layers", &format!("{qualified_name}.json")])
            .await?;
        Ok(response.layer)
    }

    pub async fn get_feature_type(&self, workspace: &str, name: &str) -> Result<Resource, Error> {
        let response: FeatureTypeResponse = self
            .get(&["workspaces", workspace, "featuretypes", &format!("{name}.json")])
            .await?;
        Ok(response.feature_type)
    }

    pub async fn get_coverage(&self, workspace: &str, name: &str) -> Result<Resource, Error> {
        let response: CoverageResponse = self
            .get(&["workspaces", workspace, "coverages", &format!("{name}.json")])
            .await?;
        Ok(response.coverage)
    }

    // ── Layer groups ─────────────────────────────────────────────────

    pub async fn list_layer_groups(&self, workspace: Option<&str>) -> Result<Vec<String>, Error> {
        let response: LayerGroupsResponse = match workspace {
            Some(ws) => self.get(&["workspaces", ws, "layergroups.json"]).await?,
            None => self.get(&["layergroups.json"]).await?,
        };
        Ok(response.layer_groups.into_iter().map(|g| g.name).collect())
    }

    pub async fn get_layer_group(
        &self,
        workspace: Option<&str>,
        name: &str,
    ) -> Result<LayerGroup, Error> {
        let file = format!("{name}.json");
        let response: LayerGroupResponse = match workspace {
            Some(ws) => self.get(&["workspaces", ws, "layergroups", &file]).await?,
            None => self.get(&["layergroups", &file]).await?,
        };
        Ok(response.layer_group)
    }
}

// ── Response handling ───────────────────────────────────────────────

async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
    let status = resp.status();
    let body = resp.text().await?;

    if status.is_success() {
        return serde_json::from_str(&body).map_err(|e| {
            let preview = crate::body_preview(&body);
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body,
            }
        });
    }

    let message = if body.trim().is_empty() {
        status.to_string()
    } else {
        body.trim().to_owned()
    };
    if matches!(
        status,
        reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN
    ) {
        return Err(Error::Authentication { message });
    }
    Err(Error::GeoServer {
        message,
        status: status.as_u16(),
    })
}
