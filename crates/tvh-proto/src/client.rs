//! HTTP client for the tvheadend web API.

use std::time::Duration;

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::ServerConfig;
use crate::idnode::{GridPage, GridResource};
use crate::model::{
    AlternativeBroadcast, ChannelEntry, ChannelTag, ConfigName, ContentGroup, EntryList, EpgPage,
    RecordOp, RelatedEpisode, RelatedKind,
};
use crate::query::{FetchRequest, Params};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid server url {0:?}")]
    InvalidUrl(String),
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// Non-2xx answer.  `text` is the status reason phrase.
    #[error("{status} {text}")]
    Status { status: u16, text: String },
    #[error("unexpected response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ClientError {
    /// Short text for user-facing alerts.
    pub fn status_text(&self) -> String {
        match self {
            Self::Status { text, .. } => text.clone(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Clone)]
pub struct TvhClient {
    http: reqwest::Client,
    base: String,
    auth: Option<(String, String)>,
}

impl TvhClient {
    pub fn new(config: &ServerConfig) -> Result<Self> {
        let base = config.base_url.trim();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ClientError::InvalidUrl(base.to_string()));
        }
        let base = if base.ends_with('/') {
            base.to_string()
        } else {
            format!("{}/", base)
        };
        let http = reqwest::Client::builder()
            .user_agent(concat!("tvhc/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()?;
        let auth = (!config.username.is_empty())
            .then(|| (config.username.clone(), config.password.clone()));
        Ok(Self { http, base, auth })
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path.trim_start_matches('/'))
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.with_auth(self.http.get(self.url(path)))
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.with_auth(self.http.post(self.url(path)))
    }

    fn with_auth(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth {
            Some((user, pass)) => builder.basic_auth(user, Some(pass)),
            None => builder,
        }
    }

    async fn send(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                text: status.canonical_reason().unwrap_or("error").to_string(),
            });
        }
        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(path: &str, response: reqwest::Response) -> Result<T> {
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|source| ClientError::Decode {
            path: path.to_string(),
            source,
        })
    }

    async fn get_entries<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>> {
        let response = self.send(self.get(path).query(query)).await?;
        let list: EntryList<T> = Self::decode(path, response).await?;
        Ok(list.entries)
    }

    // ── EPG ──────────────────────────────────────────────────────────────────

    pub async fn fetch_epg(&self, request: &FetchRequest) -> Result<EpgPage> {
        let response = self
            .send(self.get("epg").query(&request.query_pairs()))
            .await?;
        Self::decode("epg", response).await
    }

    pub async fn alternatives(&self, event_id: u64) -> Result<Vec<AlternativeBroadcast>> {
        self.related_of(event_id, RelatedKind::Alternative).await
    }

    pub async fn related(&self, event_id: u64) -> Result<Vec<RelatedEpisode>> {
        self.related_of(event_id, RelatedKind::Related).await
    }

    async fn related_of<T: DeserializeOwned>(&self, event_id: u64, kind: RelatedKind) -> Result<Vec<T>> {
        let id = event_id.to_string();
        self.get_entries(
            "epgrelated",
            &[("op", "get"), ("id", id.as_str()), ("type", kind.as_str())],
        )
        .await
    }

    // ── DVR ──────────────────────────────────────────────────────────────────

    pub async fn record(&self, op: RecordOp, event_id: u64, config_name: &str) -> Result<()> {
        let id = event_id.to_string();
        info!(
            "[dvr] {} event={} config={:?}",
            op.as_str(),
            event_id,
            config_name
        );
        self.send(self.post("dvr").form(&[
            ("op", op.as_str()),
            ("eventId", id.as_str()),
            ("config_name", config_name),
        ]))
        .await?;
        Ok(())
    }

    /// Submit the predicate set verbatim as a standing auto-record rule.
    pub async fn create_autorec(&self, params: &Params) -> Result<()> {
        let mut form: Vec<(&str, &str)> = vec![("op", "createAutoRec")];
        form.extend(params.iter().map(|(k, v)| (*k, v.as_str())));
        info!("[dvr] createAutoRec {:?}", params);
        self.send(self.post("dvr").form(&form)).await?;
        Ok(())
    }

    // ── Catalogs ─────────────────────────────────────────────────────────────

    pub async fn content_groups(&self) -> Result<Vec<ContentGroup>> {
        self.get_entries("ecglist", &[]).await
    }

    pub async fn channels(&self) -> Result<Vec<ChannelEntry>> {
        self.get_entries("chlist", &[]).await
    }

    pub async fn channel_tags(&self) -> Result<Vec<ChannelTag>> {
        self.get_entries("channeltags", &[("op", "listTags")]).await
    }

    pub async fn config_names(&self) -> Result<Vec<ConfigName>> {
        self.get_entries("confignames", &[("op", "list")]).await
    }

    // ── idnode grids ─────────────────────────────────────────────────────────

    pub async fn grid(&self, resource: GridResource, start: usize, limit: usize) -> Result<GridPage> {
        let path = format!("{}/grid", resource.url());
        let start = start.to_string();
        let limit = limit.to_string();
        let mut query = vec![("start", start.as_str()), ("limit", limit.as_str())];
        if let Some((field, dir)) = resource.sort() {
            query.push(("sort", field));
            query.push(("dir", dir));
        }
        if resource.include_all() {
            query.push(("all", "1"));
        }
        let response = self.send(self.get(&path).query(&query)).await?;
        Self::decode(&path, response).await
    }

    pub async fn create_node(&self, resource: GridResource) -> Result<()> {
        let path = format!("{}/create", resource.url());
        debug!("[idnode] create {}", path);
        self.send(self.post(&path).form(&[("conf", "{}")])).await?;
        Ok(())
    }

    pub async fn delete_node(&self, uuid: &str) -> Result<()> {
        let uuids = serde_json::json!([uuid]).to_string();
        debug!("[idnode] delete {}", uuid);
        self.send(self.post("api/idnode/delete").form(&[("uuid", uuids.as_str())]))
            .await?;
        Ok(())
    }

    pub async fn move_node(&self, uuid: &str, up: bool) -> Result<()> {
        let path = if up {
            "api/idnode/moveup"
        } else {
            "api/idnode/movedown"
        };
        let uuids = serde_json::json!([uuid]).to_string();
        self.send(self.post(path).form(&[("uuid", uuids.as_str())]))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server(url: &str) -> ServerConfig {
        ServerConfig {
            base_url: url.to_string(),
            ..ServerConfig::default()
        }
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let c = TvhClient::new(&server("http://tv.lan:9981")).unwrap();
        assert_eq!(c.base_url(), "http://tv.lan:9981/");
        assert_eq!(c.url("epg"), "http://tv.lan:9981/epg");
        assert_eq!(c.url("/api/idnode/delete"), "http://tv.lan:9981/api/idnode/delete");
    }

    #[test]
    fn test_rejects_non_http_url() {
        assert!(matches!(
            TvhClient::new(&server("tv.lan:9981")),
            Err(ClientError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_status_text_is_reason_phrase() {
        let e = ClientError::Status {
            status: 403,
            text: "Forbidden".into(),
        };
        assert_eq!(e.status_text(), "Forbidden");
        assert_eq!(e.to_string(), "403 Forbidden");
    }
}
