//! In-memory storage backend.
//!
//! Objects live for as long as the backend does. Suitable for tests and
//! for the `cache` role of single-process deployments.

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;

use crate::error::BackendResult;
use crate::storage::traits::StorageBackend;

/// Memory-backed storage implementation.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    objects: DashMap<String, Bytes>,
}

impl MemoryStorage {
    /// Create an empty memory storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if no objects are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[async_trait]
impl StorageBackend for MemoryStorage {
    async fn put(&self, id: &str, data: Bytes) -> BackendResult<()> {
        self.objects.insert(id.to_string(), data);
        Ok(())
    }

    async fn get(&self, id: &str) -> BackendResult<Option<Bytes>> {
        Ok(self.objects.get(id).map(|entry| entry.value().clone()))
    }

    async fn exists(&self, id: &str) -> BackendResult<bool> {
        Ok(self.objects.contains_key(id))
    }

    async fn delete(&self, id: &str) -> BackendResult<bool> {
        Ok(self.objects.remove(id).is_some())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
