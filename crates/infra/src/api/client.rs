//! HTTP client for the remote bookkeeping API.
//!
//! Thin JSON request/response wrapper over reqwest. Endpoints are namespaced
//! by resource (`invoices`, `customers`, ...) and every call carries the
//! configured timeout and, when present, a bearer token.

use std::time::Duration;

use async_trait::async_trait;
use openbooks_domain::{DraftDocument, SyncConfig};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::sync::errors::SyncError;
use crate::sync::worker::DraftForwarder;

/// Configuration for the API client.
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Base URL for the remote API (e.g. "http://localhost:3000/api")
    pub base_url: String,
    /// Timeout for API requests
    pub timeout: Duration,
    /// Optional bearer token attached to every request
    pub api_token: Option<String>,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000/api".to_string(),
            timeout: Duration::from_secs(30),
            api_token: None,
        }
    }
}

impl From<&SyncConfig> for ApiClientConfig {
    fn from(sync: &SyncConfig) -> Self {
        Self {
            base_url: sync.base_url.clone(),
            timeout: Duration::from_secs(sync.request_timeout_seconds),
            api_token: sync.api_token.clone(),
        }
    }
}

/// Remote API client.
pub struct ApiClient {
    http: reqwest::Client,
    config: ApiClientConfig,
}

#[derive(Debug, Clone, Serialize)]
struct SubmitDraftRequest<'a> {
    draft: &'a DraftDocument,
    idempotency_key: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
struct SubmitDraftResponse {
    id: String,
    #[serde(default)]
    created: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct ApiErrorBody {
    message: String,
}

impl ApiClient {
    /// Create a client with the given configuration.
    pub fn with_config(config: ApiClientConfig) -> Result<Self, SyncError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SyncError::Config(format!("failed to build http client: {e}")))?;
        Ok(Self { http, config })
    }

    /// Fetch a resource collection, e.g. `get_list("customers")`.
    #[instrument(skip(self))]
    pub async fn get_list<T: DeserializeOwned>(&self, resource: &str) -> Result<Vec<T>, SyncError> {
        self.get_json(&format!("{}/{resource}", self.config.base_url)).await
    }

    /// Fetch a single resource by id, e.g. `get_one("invoices", "inv-1")`.
    #[instrument(skip(self))]
    pub async fn get_one<T: DeserializeOwned>(
        &self,
        resource: &str,
        id: &str,
    ) -> Result<T, SyncError> {
        self.get_json(&format!("{}/{resource}/{id}", self.config.base_url)).await
    }

    /// POST a JSON body to a resource endpoint and decode the response.
    #[instrument(skip(self, body))]
    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        resource: &str,
        body: &B,
    ) -> Result<T, SyncError> {
        let url = format!("{}/{resource}", self.config.base_url);
        let mut request = self.http.post(&url).json(body);
        if let Some(token) = &self.config.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(SyncError::from)?;
        Self::decode_response(response).await
    }

    /// Submit a draft document with an idempotency key.
    ///
    /// The server deduplicates on the key, so retrying a push of the same
    /// draft revision is safe.
    #[instrument(skip(self, draft), fields(draft_id = %draft.id))]
    pub async fn submit_draft(
        &self,
        draft: &DraftDocument,
        idempotency_key: &str,
    ) -> Result<String, SyncError> {
        let body = SubmitDraftRequest { draft, idempotency_key };
        let response: SubmitDraftResponse =
            self.post_json(&format!("{}s", draft.kind.as_str()), &body).await?;

        if !response.created {
            debug!(draft_id = %draft.id, remote_id = %response.id, "idempotency key matched existing record");
        }
        Ok(response.id)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, SyncError> {
        let mut request = self.http.get(url);
        if let Some(token) = &self.config.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(SyncError::from)?;
        Self::decode_response(response).await
    }

    /// Decode a response, mapping non-2xx statuses onto sync errors with the
    /// server-reported message preserved.
    async fn decode_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, SyncError> {
        let status = response.status();
        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| SyncError::Client(format!("invalid response body: {e}")));
        }

        let message = match response.json::<ApiErrorBody>().await {
            Ok(body) => body.message,
            Err(_) => status.to_string(),
        };
        warn!(status = %status, message = %message, "api request failed");

        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => SyncError::Auth(message),
            StatusCode::TOO_MANY_REQUESTS => SyncError::RateLimit(message),
            s if s.is_server_error() => SyncError::Server(message),
            _ => SyncError::Client(message),
        })
    }
}

#[async_trait]
impl DraftForwarder for ApiClient {
    async fn forward_draft(
        &self,
        draft: &DraftDocument,
        idempotency_key: &str,
    ) -> Result<String, SyncError> {
        self.submit_draft(draft, idempotency_key).await
    }
}
