//! Storage trait definitions.
//!
//! Resolution never calls into a backend; it only hands one out. The trait
//! exists so that uploaders can work against any backend a group assigns.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::BackendResult;

/// Object storage operations.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Store an object under `id`, replacing any existing content.
    async fn put(&self, id: &str, data: Bytes) -> BackendResult<()>;

    /// Read an object.
    ///
    /// Returns `None` if no object is stored under `id`.
    async fn get(&self, id: &str) -> BackendResult<Option<Bytes>>;

    /// Check if an object exists.
    async fn exists(&self, id: &str) -> BackendResult<bool>;

    /// Delete an object.
    ///
    /// Returns `false` if there was nothing to delete.
    async fn delete(&self, id: &str) -> BackendResult<bool>;

    /// Get the storage backend name.
    fn backend_name(&self) -> &'static str;
}

/// Shared handle to a storage backend.
pub type DynStorage = Arc<dyn StorageBackend>;
