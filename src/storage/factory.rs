//! Storage backend factory.
//!
//! Creates backends from settings and assembles them into storage groups.

use std::sync::Arc;

use tracing::info;

use crate::config::{BackendKind, BackendSpec, Settings};
use crate::domain::{GroupId, Role};
use crate::error::{BackendError, BackendResult, SetupError};
use crate::service::{ConfigRegistry, Groups, StorageGroup};
use crate::storage::file::FileSystemStorage;
use crate::storage::memory::MemoryStorage;
use crate::storage::traits::DynStorage;

/// Create a storage backend from its declaration.
///
/// # Errors
///
/// Returns an error if the storage backend cannot be initialized.
pub async fn create_storage(spec: &BackendSpec) -> BackendResult<DynStorage> {
    match spec.backend {
        BackendKind::Memory => Ok(Arc::new(MemoryStorage::new())),
        BackendKind::File => {
            let directory = spec.directory.clone().ok_or_else(|| {
                BackendError::FileIO("file backend requires a directory".to_string())
            })?;
            let storage = FileSystemStorage::new(directory, spec.prefix.clone())?;

            // Verify storage is writable
            storage.health_check().await?;

            Ok(Arc::new(storage))
        }
    }
}

/// Create every group declared in the settings.
///
/// # Errors
///
/// Returns an error if a name is blank or a backend cannot be initialized.
pub async fn create_groups(settings: &Settings) -> Result<Groups, SetupError> {
    settings.validate()?;

    let mut groups = Groups::with_capacity(settings.groups.len());
    for (group_name, roles) in &settings.groups {
        let group_id = GroupId::new(group_name)?;
        let mut group = StorageGroup::new();

        for (role_name, spec) in roles {
            let storage = create_storage(spec).await?;
            group.insert(Role::new(role_name)?, storage);
        }

        info!(group = %group_id, roles = group.len(), "Storage group created");
        groups.insert(group_id, group);
    }

    Ok(groups)
}

/// Create a registry holding every group declared in the settings.
///
/// # Errors
///
/// Returns an error if a name is blank or a backend cannot be initialized.
pub async fn build_registry(settings: &Settings) -> Result<Arc<ConfigRegistry>, SetupError> {
    let registry = ConfigRegistry::shared();
    registry.configure_from(settings).await?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GroupSpec;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_create_memory_storage() {
        let storage = create_storage(&BackendSpec::memory()).await.unwrap();
        assert_eq!(storage.backend_name(), "memory");
    }

    #[tokio::test]
    async fn test_create_file_storage() {
        let temp_dir = TempDir::new().unwrap();
        let spec = BackendSpec::file(temp_dir.path(), Some("img"));

        let storage = create_storage(&spec).await.unwrap();
        assert_eq!(storage.backend_name(), "file");
        assert!(temp_dir.path().join("img").is_dir());
    }

    #[tokio::test]
    async fn test_create_file_storage_without_directory() {
        let spec = BackendSpec {
            backend: BackendKind::File,
            ..Default::default()
        };

        assert!(create_storage(&spec).await.is_err());
    }

    #[tokio::test]
    async fn test_build_registry() {
        let temp_dir = TempDir::new().unwrap();
        let mut images = GroupSpec::new();
        images.insert("cache".to_string(), BackendSpec::memory());
        images.insert(
            "store".to_string(),
            BackendSpec::file(temp_dir.path(), Some("img")),
        );

        let mut settings = Settings::default();
        settings.groups.insert("images".to_string(), images);
        settings.groups.insert("default".to_string(), GroupSpec::new());

        let registry = build_registry(&settings).await.unwrap();
        assert_eq!(
            registry.group_ids(),
            vec![GroupId::default_group(), "images".parse().unwrap()]
        );

        let images = registry.get("images").unwrap();
        assert_eq!(images.get("cache").unwrap().backend_name(), "memory");
        assert_eq!(images.get("store").unwrap().backend_name(), "file");
        assert!(registry.get("default").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_build_registry_rejects_invalid_settings() {
        let mut roles = GroupSpec::new();
        roles.insert(
            "store".to_string(),
            BackendSpec {
                backend: BackendKind::File,
                ..Default::default()
            },
        );
        let mut settings = Settings::default();
        settings.groups.insert("images".to_string(), roles);

        assert!(matches!(
            build_registry(&settings).await,
            Err(SetupError::Config(_))
        ));
    }
}
