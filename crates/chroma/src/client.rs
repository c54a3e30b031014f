use callnotes_common::{CallNotesError, Result};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::types::{Collection, ErrorBody, GetRequest, GetResponse};

const DEFAULT_MAX_RETRIES: u32 = 3;

/// Chroma HTTP API (v2) client
#[derive(Debug, Clone)]
pub struct ChromaClient {
    base_url: String,
    tenant: String,
    database: String,
    client: Client,
    max_retries: u32,
}

impl ChromaClient {
    /// Create new Chroma client
    pub fn new(
        base_url: impl Into<String>,
        tenant: impl Into<String>,
        database: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CallNotesError::network(format!("Failed to create HTTP client: {}", e)))?;

        info!("Chroma client initialized: {}", base_url);
        Ok(Self {
            base_url,
            tenant: tenant.into(),
            database: database.into(),
            client,
            max_retries: DEFAULT_MAX_RETRIES,
        })
    }

    /// Create a client from the application configuration
    pub fn from_config(config: &callnotes_common::AppConfig) -> Result<Self> {
        Self::new(
            config.chroma_base_url(),
            &config.tenant,
            &config.database,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    /// Override the number of attempts for read calls (minimum 1)
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collections_url(&self) -> String {
        format!(
            "{}/api/v2/tenants/{}/databases/{}/collections",
            self.base_url, self.tenant, self.database
        )
    }

    /// Check that the server is up, returns its nanosecond clock
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    pub async fn heartbeat(&self) -> Result<u64> {
        let url = format!("{}/api/v2/heartbeat", self.base_url);
        let url = url.as_str();

        let body: HashMap<String, u64> = self
            .with_retry("heartbeat", move || self.get_json(url))
            .await?;

        body.get("nanosecond heartbeat")
            .copied()
            .ok_or_else(|| CallNotesError::serialization("Heartbeat response without timestamp"))
    }

    /// Look up a collection by name
    #[instrument(skip(self))]
    pub async fn get_collection(&self, name: &str) -> Result<Collection> {
        let url = format!("{}/{}", self.collections_url(), name);
        let url = url.as_str();

        let collection: Collection = self
            .with_retry("get_collection", move || self.get_json(url))
            .await
            .map_err(|e| match e {
                CallNotesError::NotFound(_) => {
                    CallNotesError::not_found(format!("collection '{}'", name))
                }
                other => other,
            })?;

        debug!("Resolved collection {} -> {}", collection.name, collection.id);
        Ok(collection)
    }

    /// Fetch records of a collection
    #[instrument(skip(self, request))]
    pub async fn get(&self, collection_id: &str, request: &GetRequest) -> Result<GetResponse> {
        let url = format!("{}/{}/get", self.collections_url(), collection_id);

        debug!(
            "Fetching records - Collection: {}, Limit: {:?}, Offset: {:?}",
            collection_id, request.limit, request.offset
        );

        let url = url.as_str();

        let response: GetResponse = self
            .with_retry("get", move || async move {
                let response = self
                    .client
                    .post(url)
                    .json(request)
                    .send()
                    .await
                    .map_err(transport_error)?;
                decode(response).await
            })
            .await?;

        debug!("Received {} records", response.len());
        Ok(response)
    }

    /// Number of records in a collection
    #[instrument(skip(self))]
    pub async fn count(&self, collection_id: &str) -> Result<u64> {
        let url = format!("{}/{}/count", self.collections_url(), collection_id);
        let url = url.as_str();
        self.with_retry("count", move || self.get_json(url)).await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(transport_error)?;
        decode(response).await
    }

    /// Run a read call, retrying transient failures with exponential backoff
    async fn with_retry<T, F, Fut>(&self, operation: &str, mut call: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 1;
        loop {
            match call().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    let delay = Duration::from_secs(2u64.pow(attempt - 1));
                    warn!(
                        "Chroma {} failed (attempt {}/{}): {}. Retrying in {:?}...",
                        operation, attempt, self.max_retries, e, delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

fn transport_error(e: reqwest::Error) -> CallNotesError {
    if e.is_decode() {
        CallNotesError::serialization(format!("Failed to parse response: {}", e))
    } else {
        CallNotesError::network(format!("Failed to reach Chroma: {}", e))
    }
}

/// Map non-success statuses to errors, then parse the JSON body
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();

    if status.is_success() {
        let bytes = response.bytes().await.map_err(transport_error)?;
        return serde_json::from_slice(&bytes)
            .map_err(|e| CallNotesError::serialization(format!("Failed to parse response: {}", e)));
    }

    let text = response.text().await.unwrap_or_default();
    let body = serde_json::from_str::<ErrorBody>(&text).ok();
    let message = body
        .as_ref()
        .and_then(ErrorBody::describe)
        .unwrap_or_else(|| text.trim().to_string());

    if status == StatusCode::NOT_FOUND || body.as_ref().map(ErrorBody::is_not_found).unwrap_or(false) {
        return Err(CallNotesError::not_found(message));
    }

    Err(CallNotesError::server(status.as_u16(), message))
}
