pub mod firebase;
pub mod memory;

use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;
use url::Url;
use uuid::Uuid;

pub use firebase::FirebaseObjectStore;
pub use memory::MemoryObjectStore;

/// Errors from the object-store layer
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Store rejected request: {status} {body}")]
    Rejected { status: u16, body: String },

    #[error("Invalid locator: {0}")]
    InvalidLocator(String),
}

/// Handle to a stored blob: enough to build the public locator and to delete
/// the object later.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub bucket: String,
    pub full_path: String,
}

impl StoredObject {
    /// Public dereferenceable locator for the object. The full path is
    /// percent-encoded as a single path segment, so `/` becomes `%2F`.
    pub fn public_url(&self, api_base: &str) -> Result<String, StorageError> {
        let mut url =
            Url::parse(api_base).map_err(|e| StorageError::InvalidLocator(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| StorageError::InvalidLocator(format!("cannot-be-a-base: {}", api_base)))?
            .extend(["v0", "b", self.bucket.as_str(), "o"])
            .push(&self.full_path);
        url.query_pairs_mut().append_pair("alt", "media");
        Ok(url.to_string())
    }
}

/// External blob storage for person photos.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn upload(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<StoredObject, StorageError>;

    async fn delete(&self, key: &str) -> Result<(), StorageError>;
}

/// Unique storage key for an upload: millisecond timestamp and a random
/// suffix, keeping the original file name for readability.
pub fn unique_object_name(original: &str) -> String {
    format!(
        "{}-{}-{}",
        Utc::now().timestamp_millis(),
        Uuid::new_v4().simple(),
        original
    )
}
