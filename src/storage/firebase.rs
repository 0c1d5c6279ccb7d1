//! Object store client speaking the Firebase Storage REST shape.

use async_trait::async_trait;
use url::Url;

use super::{ObjectStore, StorageError, StoredObject};
use crate::config::StorageConfig;

pub struct FirebaseObjectStore {
    client: reqwest::Client,
    bucket: String,
    api_base: String,
}

impl FirebaseObjectStore {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            bucket: config.bucket.clone(),
            api_base: config.api_base.clone(),
        }
    }

    /// `{api_base}/v0/b/{bucket}/o` with the object key appended as a single
    /// encoded segment when given.
    fn object_endpoint(&self, key: Option<&str>) -> Result<Url, StorageError> {
        let mut url = Url::parse(&self.api_base)
            .map_err(|e| StorageError::InvalidLocator(e.to_string()))?;
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                StorageError::InvalidLocator(format!("cannot-be-a-base: {}", self.api_base))
            })?;
            segments.extend(["v0", "b", self.bucket.as_str(), "o"]);
            if let Some(key) = key {
                segments.push(key);
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl ObjectStore for FirebaseObjectStore {
    async fn upload(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<StoredObject, StorageError> {
        let mut url = self.object_endpoint(None)?;
        url.query_pairs_mut()
            .append_pair("uploadType", "media")
            .append_pair("name", key);

        let response = self
            .client
            .post(url)
            .header("content-type", content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| StorageError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(key, bucket = %self.bucket, "uploaded object");

        Ok(StoredObject {
            bucket: self.bucket.clone(),
            full_path: key.to_string(),
        })
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let url = self.object_endpoint(Some(key))?;

        let response = self
            .client
            .delete(url)
            .send()
            .await
            .map_err(|e| StorageError::Transport(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 404 {
            return Err(StorageError::ObjectNotFound(key.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(key, bucket = %self.bucket, "deleted object");
        Ok(())
    }
}
