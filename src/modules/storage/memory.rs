//! In-process object store
//!
//! Keeps blobs in a map behind a mutex. Honours the same no-overwrite
//! policy as the S3 client.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::modules::storage::{ObjectStore, StorageError};

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub data: Vec<u8>,
    pub content_type: String,
}

pub struct MemoryObjectStore {
    objects: Mutex<HashMap<String, StoredObject>>,
    /// Base for public URLs; `None` simulates a store that exposes none
    public_base: Option<String>,
}

impl MemoryObjectStore {
    pub fn new(public_base: impl Into<String>) -> Self {
        Self {
            objects: Mutex::new(HashMap::new()),
            public_base: Some(public_base.into()),
        }
    }

    pub fn without_public_urls() -> Self {
        Self {
            objects: Mutex::new(HashMap::new()),
            public_base: None,
        }
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<String, StoredObject>>, StorageError> {
        self.objects
            .lock()
            .map_err(|_| StorageError::Backend("object store lock poisoned".to_string()))
    }

    pub fn object(&self, key: &str) -> Option<StoredObject> {
        self.lock().ok().and_then(|objects| objects.get(key).cloned())
    }

    pub fn len(&self) -> usize {
        self.lock().map(|objects| objects.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let mut objects = self.lock()?;
        if objects.contains_key(key) {
            return Err(StorageError::AlreadyExists(key.to_string()));
        }
        objects.insert(
            key.to_string(),
            StoredObject {
                data,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        self.lock()?
            .get(key)
            .map(|object| object.data.clone())
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.lock()?.remove(key);
        Ok(())
    }

    fn public_url(&self, key: &str) -> Option<String> {
        self.public_base
            .as_ref()
            .map(|base| format!("{}/{}", base.trim_end_matches('/'), urlencoding::encode(key)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_refuses_to_overwrite() {
        let store = MemoryObjectStore::new("http://store.test/uploads");

        store
            .put("1_a.txt", b"first".to_vec(), "text/plain")
            .await
            .unwrap();
        let err = store
            .put("1_a.txt", b"second".to_vec(), "text/plain")
            .await
            .unwrap_err();

        assert_eq!(err, StorageError::AlreadyExists("1_a.txt".to_string()));
        assert_eq!(store.get("1_a.txt").await.unwrap(), b"first".to_vec());
    }

    #[tokio::test]
    async fn test_get_missing_key() {
        let store = MemoryObjectStore::new("http://store.test/uploads");

        let err = store.get("nope").await.unwrap_err();

        assert_eq!(err, StorageError::NotFound("nope".to_string()));
    }

    #[test]
    fn test_public_url() {
        let store = MemoryObjectStore::new("http://store.test/uploads/");
        assert_eq!(
            store.public_url("1_a b.txt"),
            Some("http://store.test/uploads/1_a%20b.txt".to_string())
        );
        assert_eq!(MemoryObjectStore::without_public_urls().public_url("k"), None);
    }
}
