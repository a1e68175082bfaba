//! Integration tests for storage group resolution.
//!
//! Two uploader types share one registry: one declares the `foo` group, the
//! other declares `bar`, which is never registered and so resolves through
//! `default`.

use std::sync::Arc;

use bytes::Bytes;
use tempfile::TempDir;

use storage_groups::config::Settings;
use storage_groups::domain::{GroupId, Role};
use storage_groups::error::{ResolveError, UploadError};
use storage_groups::service::{ConfigRegistry, StorageGroup, StorageResolver, Uploader};
use storage_groups::storage::{DynStorage, MemoryStorage, StorageBackend, build_registry};

// ============================================================================
// Test Harness
// ============================================================================

fn role(name: &str) -> Role {
    name.parse().unwrap()
}

fn group_id(name: &str) -> GroupId {
    name.parse().unwrap()
}

/// One resolver per uploader type, like a class-level declaration.
struct UploaderType {
    resolver: Arc<StorageResolver>,
}

impl UploaderType {
    fn declare(registry: &Arc<ConfigRegistry>, group: &str) -> Self {
        let resolver = StorageResolver::new(Arc::clone(registry));
        resolver.set_group(group_id(group));
        Self {
            resolver: Arc::new(resolver),
        }
    }

    fn uploader(&self, role_name: &str) -> Uploader {
        Uploader::new(Arc::clone(&self.resolver), role(role_name))
    }
}

struct Fixture {
    registry: Arc<ConfigRegistry>,
    my_uploader: UploaderType,
    other_uploader: UploaderType,
}

impl Fixture {
    fn new() -> Self {
        let registry = ConfigRegistry::shared();
        let my_uploader = UploaderType::declare(&registry, "foo");
        let other_uploader = UploaderType::declare(&registry, "bar");
        Self {
            registry,
            my_uploader,
            other_uploader,
        }
    }

    fn setup_no_storage(&self) {
        self.registry.configure(|groups| groups.clear());
    }

    fn setup_storage(&self, group: &str) -> (Arc<MemoryStorage>, Arc<MemoryStorage>) {
        self.setup_no_storage();

        let cache = Arc::new(MemoryStorage::new());
        let store = Arc::new(MemoryStorage::new());

        self.registry.configure(|groups| {
            groups.insert(
                group_id(group),
                StorageGroup::new()
                    .with(role("cache"), Arc::clone(&cache) as DynStorage)
                    .with(role("store"), Arc::clone(&store) as DynStorage),
            );
        });

        (cache, store)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_raises_storage_not_configured() {
    let fixture = Fixture::new();
    fixture.setup_no_storage();

    let result = fixture
        .my_uploader
        .uploader("cache")
        .upload(Bytes::from_static(b"content"))
        .await;

    match result {
        Err(UploadError::Resolve(err @ ResolveError::NotConfigured { .. })) => {
            let message = err.to_string();
            assert!(message.contains("'cache'"));
            assert!(message.contains("'foo'"));
        }
        other => panic!("expected NotConfigured, got {other:?}"),
    }
}

#[tokio::test]
async fn test_uses_configured_storage() {
    let fixture = Fixture::new();
    let (cache, _) = fixture.setup_storage("foo");

    let cached = fixture
        .my_uploader
        .uploader("cache")
        .upload(Bytes::from_static(b"content"))
        .await
        .unwrap();

    assert!(
        cache.exists(&cached.id).await.unwrap(),
        "Expected file to be uploaded to foo cache store"
    );
}

#[tokio::test]
async fn test_uses_configured_storage_for_promotion() {
    let fixture = Fixture::new();
    let (_, store) = fixture.setup_storage("foo");

    let cache_uploader = fixture.my_uploader.uploader("cache");
    let cached = cache_uploader
        .upload(Bytes::from_static(b"content"))
        .await
        .unwrap();

    let store_uploader = fixture.my_uploader.uploader("store");
    let stored = store_uploader.promote(&cached, &cache_uploader).await.unwrap();

    assert_eq!(stored.storage, role("store"));
    assert!(
        store.exists(&stored.id).await.unwrap(),
        "Expected file to be promoted to foo store"
    );
    assert_eq!(store.get(&stored.id).await.unwrap().unwrap(), "content");
}

#[tokio::test]
async fn test_uses_default_storage_group() {
    let fixture = Fixture::new();
    let (cache, _) = fixture.setup_storage("default");

    let cached = fixture
        .other_uploader
        .uploader("cache")
        .upload(Bytes::from_static(b"content"))
        .await
        .unwrap();

    assert!(
        cache.exists(&cached.id).await.unwrap(),
        "Expected file to be uploaded to default cache store"
    );
}

#[tokio::test]
async fn test_uploader_types_resolve_independently() {
    let fixture = Fixture::new();
    let (foo_cache, _) = fixture.setup_storage("foo");

    let default_cache: DynStorage = Arc::new(MemoryStorage::new());
    fixture.registry.configure(|groups| {
        groups.insert(
            GroupId::default_group(),
            StorageGroup::new().with(role("cache"), Arc::clone(&default_cache)),
        );
    });

    let mine = fixture.my_uploader.resolver.resolve(&role("cache")).unwrap();
    let other = fixture
        .other_uploader
        .resolver
        .resolve(&role("cache"))
        .unwrap();

    assert!(Arc::ptr_eq(&mine, &(foo_cache as DynStorage)));
    assert!(Arc::ptr_eq(&other, &default_cache));
}

#[tokio::test]
async fn test_registry_from_settings() {
    let temp_dir = TempDir::new().unwrap();
    let toml = format!(
        r#"
        [groups.images.cache]
        backend = "memory"

        [groups.images.store]
        backend = "file"
        directory = "{}"
        prefix = "img"
        "#,
        temp_dir.path().display().to_string().replace('\\', "/")
    );
    let settings = Settings::from_toml_str(&toml).unwrap();
    let registry = build_registry(&settings).await.unwrap();

    let images = UploaderType::declare(&registry, "images");
    let stored = images
        .uploader("store")
        .upload(Bytes::from_static(b"pixels"))
        .await
        .unwrap();

    assert!(temp_dir.path().join("img").join(&stored.id).is_file());
    assert_eq!(
        images.uploader("store").download(&stored).await.unwrap(),
        "pixels"
    );
}
