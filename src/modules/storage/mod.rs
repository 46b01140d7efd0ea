//! Storage module for uploaded blobs
//!
//! Defines the [`ObjectStore`] seam and its implementations: the
//! MinIO/S3-compatible client used in production and an in-memory store for tests.

#[cfg(test)]
mod memory;
mod minio_client;
mod object_store;

#[cfg(test)]
pub use memory::MemoryObjectStore;
pub use minio_client::MinIOClient;
pub use object_store::{ObjectStore, StorageError};
