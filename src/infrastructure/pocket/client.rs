// src/infrastructure/pocket/client.rs
use crate::domain::credentials::Credentials;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::pagination::{ItemPage, PageRequest, PageSource};
use crate::domain::services::tag_writer::TagWriter;
use crate::infrastructure::pocket::model::{RetrievePayload, StatsPayload};
use reqwest::StatusCode;
use tracing::{debug, instrument};

pub const DEFAULT_BASE_URL: &str = "https://getpocket.com";

/// Blocking client for the Pocket v3 API: paged reads, the stats endpoint
/// and the tag write-back action.
pub struct PocketClient {
    http: reqwest::blocking::Client,
    base_url: String,
    credentials: Credentials,
}

impl PocketClient {
    pub fn new(credentials: Credentials) -> DomainResult<Self> {
        Self::with_base_url(credentials, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(
        credentials: Credentials,
        base_url: impl Into<String>,
    ) -> DomainResult<Self> {
        let http = reqwest::blocking::Client::builder()
            .build()
            .map_err(|e| DomainError::Other(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            credentials,
        })
    }

    fn auth_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("consumer_key", self.credentials.consumer_key.clone()),
            ("access_token", self.credentials.access_token.clone()),
        ]
    }

    /// Total list size, used only to size progress output.
    #[instrument(skip(self), level = "debug")]
    pub fn stats(&self) -> DomainResult<i64> {
        let response = self
            .http
            .get(format!("{}/v3/stats", self.base_url))
            .query(&self.auth_params())
            .send()
            .map_err(|e| DomainError::RemoteService(format!("stats request failed: {}", e)))?;
        let status = response.status();
        if !status.is_success() {
            return Err(DomainError::RemoteService(format!(
                "/v3/stats returned {}",
                status
            )));
        }
        let payload: StatsPayload = response
            .json()
            .map_err(|e| DomainError::DeserializationError(format!("stats payload: {}", e)))?;
        Ok(payload.count_list)
    }
}

impl PageSource for PocketClient {
    #[instrument(skip(self), level = "debug", fields(offset = request.offset))]
    fn fetch_page(&self, request: &PageRequest) -> DomainResult<ItemPage> {
        let mut params = self.auth_params();
        params.push(("sort", "oldest".to_string()));
        params.push(("state", "all".to_string()));
        params.push(("detailType", "complete".to_string()));
        params.push(("count", request.count.to_string()));
        params.push(("offset", request.offset.to_string()));
        if let Some(since) = &request.since {
            params.push(("since", since.clone()));
        }

        let response = self
            .http
            .get(format!("{}/v3/get", self.base_url))
            .query(&params)
            .send()
            .map_err(|e| DomainError::RemoteService(format!("page request failed: {}", e)))?;
        let status = response.status();

        // 503 is the one transient status; the stream retries it with backoff
        if status == StatusCode::SERVICE_UNAVAILABLE {
            return Err(DomainError::ServiceUnavailable(format!(
                "/v3/get returned 503 at offset {}",
                request.offset
            )));
        }
        if !status.is_success() {
            return Err(DomainError::RemoteService(format!(
                "/v3/get returned {}",
                status
            )));
        }

        let payload: RetrievePayload = response
            .json()
            .map_err(|e| DomainError::DeserializationError(format!("page payload: {}", e)))?;
        let page = ItemPage {
            items: payload.items(),
            since: payload.cursor(),
        };
        debug!(items = page.items.len(), since = ?page.since, "page received");
        Ok(page)
    }
}

impl TagWriter for PocketClient {
    #[instrument(skip(self), level = "debug")]
    fn add_tag(&self, item_id: i64, tag: &str) -> DomainResult<()> {
        let actions = serde_json::json!([{
            "action": "tags_add",
            "item_id": item_id,
            "tags": tag,
        }]);
        let mut params = self.auth_params();
        params.push(("actions", actions.to_string()));

        let response = self
            .http
            .get(format!("{}/v3/send", self.base_url))
            .query(&params)
            .send()
            .map_err(|e| DomainError::RemoteService(format!("tag write failed: {}", e)))?;
        let status = response.status();
        if !status.is_success() {
            return Err(DomainError::RemoteService(format!(
                "/v3/send returned {} for item {}",
                status, item_id
            )));
        }
        Ok(())
    }
}
