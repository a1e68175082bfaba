//! Uploader bound to one storage role.

use std::sync::Arc;

use bytes::Bytes;
use tracing::debug;
use uuid::Uuid;

use crate::domain::{Role, UploadedFile};
use crate::error::{BackendError, UploadError};
use crate::service::resolver::StorageResolver;
use crate::storage::DynStorage;

/// Writes and reads objects through the backend its role resolves to.
#[derive(Debug, Clone)]
pub struct Uploader {
    resolver: Arc<StorageResolver>,
    role: Role,
}

impl Uploader {
    /// Create an uploader for `role`, sharing the uploader type's resolver.
    #[must_use]
    pub const fn new(resolver: Arc<StorageResolver>, role: Role) -> Self {
        Self { resolver, role }
    }

    /// Get the uploader's role.
    #[must_use]
    pub const fn role(&self) -> &Role {
        &self.role
    }

    /// Resolve the uploader's backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the role cannot be resolved.
    pub fn storage(&self) -> Result<DynStorage, UploadError> {
        Ok(self.resolver.resolve(&self.role)?)
    }

    /// Store `data` under a fresh id.
    ///
    /// # Errors
    ///
    /// Returns an error if the role cannot be resolved or the backend fails.
    pub async fn upload(&self, data: Bytes) -> Result<UploadedFile, UploadError> {
        let storage = self.storage()?;
        let id = Uuid::new_v4().simple().to_string();
        let size = data.len() as u64;

        storage.put(&id, data).await?;
        debug!(role = %self.role, id = %id, size, backend = storage.backend_name(), "Uploaded object");

        Ok(UploadedFile::new(id, self.role.clone(), size))
    }

    /// Copy a file held by another uploader into this uploader's storage.
    ///
    /// # Errors
    ///
    /// Returns an error if either role cannot be resolved, the source object
    /// is missing, or a backend fails.
    pub async fn promote(
        &self,
        file: &UploadedFile,
        source: &Self,
    ) -> Result<UploadedFile, UploadError> {
        let data = source.download(file).await?;
        self.upload(data).await
    }

    /// Read a file's content.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::NotFound`] if the object is missing.
    pub async fn download(&self, file: &UploadedFile) -> Result<Bytes, UploadError> {
        let storage = self.storage()?;
        storage
            .get(&file.id)
            .await?
            .ok_or_else(|| BackendError::NotFound(file.id.clone()).into())
    }

    /// Check whether a file's object exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the role cannot be resolved or the backend fails.
    pub async fn exists(&self, file: &UploadedFile) -> Result<bool, UploadError> {
        Ok(self.storage()?.exists(&file.id).await?)
    }

    /// Delete a file's object.
    ///
    /// # Errors
    ///
    /// Returns an error if the role cannot be resolved or the backend fails.
    pub async fn delete(&self, file: &UploadedFile) -> Result<bool, UploadError> {
        let deleted = self.storage()?.delete(&file.id).await?;
        debug!(role = %self.role, id = %file.id, deleted, "Deleted object");
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::GroupId;
    use crate::error::ResolveError;
    use crate::service::registry::{ConfigRegistry, StorageGroup};
    use crate::storage::MemoryStorage;

    fn role(name: &str) -> Role {
        name.parse().unwrap()
    }

    #[tokio::test]
    async fn test_upload_round_trip() {
        let cache = Arc::new(MemoryStorage::new());
        let registry = ConfigRegistry::shared();
        registry.configure(|groups| {
            groups.insert(
                GroupId::default_group(),
                StorageGroup::new().with(role("cache"), Arc::clone(&cache) as DynStorage),
            );
        });
        let resolver = Arc::new(StorageResolver::new(registry));
        let uploader = Uploader::new(resolver, role("cache"));

        let file = uploader.upload(Bytes::from_static(b"content")).await.unwrap();
        assert_eq!(file.size, 7);
        assert_eq!(file.storage, role("cache"));
        assert_eq!(cache.len(), 1);

        assert!(uploader.exists(&file).await.unwrap());
        assert_eq!(uploader.download(&file).await.unwrap(), "content");
        assert!(uploader.delete(&file).await.unwrap());
        assert!(matches!(
            uploader.download(&file).await,
            Err(UploadError::Backend(BackendError::NotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_upload_without_configuration_fails() {
        let resolver = Arc::new(StorageResolver::new(ConfigRegistry::shared()));
        let uploader = Uploader::new(resolver, role("cache"));

        let result = uploader.upload(Bytes::from_static(b"content")).await;
        assert!(matches!(
            result,
            Err(UploadError::Resolve(ResolveError::NotConfigured { .. }))
        ));
    }
}
