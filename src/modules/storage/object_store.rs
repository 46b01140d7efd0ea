use async_trait::async_trait;
use thiserror::Error;

/// Errors reported by an object store backend
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// A blob already exists under the key; stores never overwrite
    #[error("The resource already exists: {0}")]
    AlreadyExists(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Backend(String),
}

/// Put/get access to named byte blobs in a single bucket.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `data` under `key`. Fails with [`StorageError::AlreadyExists`]
    /// if the key is taken.
    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str)
        -> Result<(), StorageError>;

    /// Fetch the full blob stored under `key`.
    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError>;

    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// Public retrieval URL for `key`, if the store exposes one.
    fn public_url(&self, key: &str) -> Option<String>;
}
