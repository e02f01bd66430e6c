use async_trait::async_trait;
use reqwest::Client;

use crate::config::StorageConfig;
use crate::error::AppError;

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Stores `data` under `key` and returns the reference to keep on the record.
    async fn put_object(&self, key: &str, content_type: &str, data: Vec<u8>) -> Result<String, AppError>;
}

/// Uploads with `PUT {base_url}/{key}`; the object URL is the stored reference.
pub struct HttpObjectStorage {
    client: Client,
    config: StorageConfig,
}

impl HttpObjectStorage {
    pub fn new(config: StorageConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::Storage(format!("Failed to build http client: {}", e)))?;
        Ok(Self { client, config })
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/{}", self.config.base_url, key.trim_start_matches('/'))
    }
}

#[async_trait]
impl ObjectStorage for HttpObjectStorage {
    async fn put_object(&self, key: &str, content_type: &str, data: Vec<u8>) -> Result<String, AppError> {
        let url = self.object_url(key);
        let size = data.len();

        let mut request = self.client
            .put(&url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(data);
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("upload of {} failed: {}", key, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Storage(format!("storage returned {} for {}: {}", status, key, body)));
        }

        tracing::info!("Uploaded {} ({} bytes)", url, size);
        Ok(url)
    }
}

/// Keeps nothing; hands back a `memory://` reference. Used when no storage
/// endpoint is configured and in tests.
pub struct NoopObjectStorage;

#[async_trait]
impl ObjectStorage for NoopObjectStorage {
    async fn put_object(&self, key: &str, _content_type: &str, _data: Vec<u8>) -> Result<String, AppError> {
        Ok(format!("memory://{}", key.trim_start_matches('/')))
    }
}
