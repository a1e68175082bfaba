//! Filesystem storage backend.
//!
//! Objects are stored as plain files, one per id. An optional prefix places
//! them in a subdirectory so several roles can share one base directory.
//!
//! Directory structure:
//! ```text
//! uploads/
//! └── {prefix}/
//!     └── {id}
//! ```

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::{BackendError, BackendResult};
use crate::storage::traits::StorageBackend;

/// Filesystem-backed storage implementation.
#[derive(Debug)]
pub struct FileSystemStorage {
    /// Base directory.
    directory: PathBuf,
    /// Optional subdirectory under the base directory.
    prefix: Option<String>,
}

impl FileSystemStorage {
    /// Create a new filesystem storage instance.
    ///
    /// # Arguments
    ///
    /// * `directory` - Base directory
    /// * `prefix` - Optional subdirectory for this storage's objects
    ///
    /// # Errors
    ///
    /// Returns an error if the prefix is not a single path segment or the
    /// directory cannot be created.
    pub fn new(directory: impl Into<PathBuf>, prefix: Option<String>) -> BackendResult<Self> {
        let prefix = prefix.filter(|p| !p.trim().is_empty());
        if let Some(prefix) = &prefix {
            validate_id(prefix)?;
        }

        let storage = Self {
            directory: directory.into(),
            prefix,
        };

        let root = storage.root();
        std::fs::create_dir_all(&root).map_err(|e| {
            BackendError::FileIO(format!("Failed to create directory {}: {e}", root.display()))
        })?;

        Ok(storage)
    }

    /// Directory holding this storage's objects.
    #[must_use]
    pub fn root(&self) -> PathBuf {
        self.prefix
            .as_ref()
            .map_or_else(|| self.directory.clone(), |p| self.directory.join(p))
    }

    /// Get the base directory.
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Get the prefix, if any.
    #[must_use]
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Check that the storage directory is writable.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory is missing or not writable.
    pub async fn health_check(&self) -> BackendResult<()> {
        let root = self.root();
        if !root.exists() {
            return Err(BackendError::Unavailable);
        }

        let test_file = root.join(".health_check");
        tokio::fs::write(&test_file, b"ok")
            .await
            .map_err(|e| BackendError::FileIO(format!("Health check failed: {e}")))?;
        tokio::fs::remove_file(&test_file)
            .await
            .map_err(|e| BackendError::FileIO(format!("Health check cleanup failed: {e}")))?;

        Ok(())
    }

    fn object_path(&self, id: &str) -> BackendResult<PathBuf> {
        validate_id(id)?;
        Ok(self.root().join(id))
    }
}

#[async_trait]
impl StorageBackend for FileSystemStorage {
    async fn put(&self, id: &str, data: Bytes) -> BackendResult<()> {
        let path = self.object_path(id)?;

        // Write to a sibling and rename so readers never see a partial file.
        let tmp = self.root().join(format!(".{id}.{}.tmp", uuid::Uuid::new_v4()));
        tokio::fs::write(&tmp, &data).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }

        tracing::debug!(path = %path.display(), size = data.len(), "Stored object");
        Ok(())
    }

    async fn get(&self, id: &str) -> BackendResult<Option<Bytes>> {
        let path = self.object_path(id)?;

        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Some(Bytes::from(data))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, id: &str) -> BackendResult<bool> {
        let path = self.object_path(id)?;
        Ok(tokio::fs::try_exists(&path).await?)
    }

    async fn delete(&self, id: &str) -> BackendResult<bool> {
        let path = self.object_path(id)?;

        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn backend_name(&self) -> &'static str {
        "file"
    }
}

/// Ids map to a single file name: no separators, no dot segments.
/// Dot-prefixed names are reserved for health checks and in-flight writes.
fn validate_id(id: &str) -> BackendResult<()> {
    let invalid = id.is_empty()
        || id.starts_with('.')
        || id.contains(['/', '\\'])
        || id.contains('\0');

    if invalid {
        return Err(BackendError::InvalidKey(id.to_string()));
    }
    Ok(())
}
