use crate::core::config::RemoteConfig;
use crate::core::{SyncError, SyncRecord};
use crate::remote::RemoteStore;
use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{debug, instrument};

pub const OVERWRITE_HEADER: &str = "x-allow-overwrite";

/// Blob store speaking plain HTTP: `GET {base_url}/{key}` and
/// `PUT {base_url}/{key}`.
pub struct HttpBlobStore {
    base_url: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl HttpBlobStore {
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self, SyncError> {
        let client = reqwest::Client::builder()
            .user_agent("birr/1.0")
            .timeout(timeout)
            .build()
            .map_err(|e| SyncError::RemoteUnavailable(e.to_string()))?;
        Ok(HttpBlobStore {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            client,
        })
    }

    pub fn from_config(config: &RemoteConfig) -> Result<Self, SyncError> {
        Self::new(&config.base_url, config.token(), config.timeout())
    }

    fn url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl RemoteStore for HttpBlobStore {
    #[instrument(name = "BlobFetch", skip(self), fields(key = %key))]
    async fn fetch_record(&self, key: &str) -> Result<Option<SyncRecord>, SyncError> {
        let url = self.url(key);
        debug!("Requesting sync record from {}", url);

        let response = self
            .authorize(self.client.get(&url))
            .send()
            .await
            .map_err(|e| SyncError::RemoteUnavailable(format!("Request error: {e} URL: {url}")))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!("No record stored under {}", key);
            return Ok(None);
        }
        if !status.is_success() {
            return Err(SyncError::RemoteUnavailable(format!(
                "HTTP error: {status} for key: {key}"
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SyncError::RemoteUnavailable(format!("Failed to read body: {e}")))?;
        if body.trim().is_empty() {
            return Ok(None);
        }
        let record = SyncRecord::from_json(&body)?;
        debug!(
            transactions = record.transactions.len(),
            "Received sync record"
        );
        Ok(Some(record))
    }

    #[instrument(name = "BlobPut", skip(self, record), fields(key = %key))]
    async fn put_record(&self, key: &str, record: &SyncRecord) -> Result<(), SyncError> {
        let url = self.url(key);
        debug!("Writing sync record to {}", url);

        let response = self
            .authorize(self.client.put(&url))
            .header(OVERWRITE_HEADER, "1")
            .json(record)
            .send()
            .await
            .map_err(|e| SyncError::RemoteUnavailable(format!("Request error: {e} URL: {url}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::RemoteUnavailable(format!(
                "HTTP error: {status} for key: {key}"
            )));
        }
        Ok(())
    }
}
