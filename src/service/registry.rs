//! Storage group registry.
//!
//! Holds the single source of truth for named storage groups. A registry is
//! created once, shared as `Arc<ConfigRegistry>` with every resolver, and
//! populated through [`ConfigRegistry::configure`].

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;

use crate::config::Settings;
use crate::domain::{GroupId, Role};
use crate::error::SetupError;
use crate::storage::{DynStorage, create_groups};

/// Role -> backend assignments of one group.
#[derive(Clone, Default)]
pub struct StorageGroup {
    storages: HashMap<Role, DynStorage>,
}

impl StorageGroup {
    /// Create an empty group.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign a backend to a role, builder style.
    #[must_use]
    pub fn with(mut self, role: Role, storage: DynStorage) -> Self {
        self.storages.insert(role, storage);
        self
    }

    /// Assign a backend to a role.
    ///
    /// Returns the backend previously assigned to the role, if any.
    pub fn insert(&mut self, role: Role, storage: DynStorage) -> Option<DynStorage> {
        self.storages.insert(role, storage)
    }

    /// Remove a role's backend.
    pub fn remove(&mut self, role: &str) -> Option<DynStorage> {
        self.storages.remove(role)
    }

    /// Get the backend for a role.
    #[must_use]
    pub fn get(&self, role: &str) -> Option<&DynStorage> {
        self.storages.get(role)
    }

    /// Check whether the group has a backend for a role.
    #[must_use]
    pub fn contains(&self, role: &str) -> bool {
        self.storages.contains_key(role)
    }

    /// Roles with an assigned backend.
    pub fn roles(&self) -> impl Iterator<Item = &Role> {
        self.storages.keys()
    }

    /// Number of roles in the group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.storages.len()
    }

    /// Check if the group has no roles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.storages.is_empty()
    }
}

impl fmt::Debug for StorageGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.storages
                    .iter()
                    .map(|(role, storage)| (role.as_str(), storage.backend_name())),
            )
            .finish()
    }
}

impl FromIterator<(Role, DynStorage)> for StorageGroup {
    fn from_iter<I: IntoIterator<Item = (Role, DynStorage)>>(iter: I) -> Self {
        Self {
            storages: iter.into_iter().collect(),
        }
    }
}

/// Group id -> storage group mapping.
pub type Groups = HashMap<GroupId, StorageGroup>;

/// Shared registry of named storage groups.
#[derive(Debug, Default)]
pub struct ConfigRegistry {
    groups: RwLock<Groups>,
}

impl ConfigRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty registry ready to be shared with resolvers.
    #[must_use]
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Look up a group, running `fallback` only if it is not registered.
    ///
    /// The fallback's outcome, value or error, becomes the result.
    ///
    /// # Errors
    ///
    /// Returns whatever error `fallback` returns.
    pub fn fetch<E, F>(&self, group: &GroupId, fallback: F) -> Result<StorageGroup, E>
    where
        F: FnOnce() -> Result<StorageGroup, E>,
    {
        // Release the read lock before the fallback runs; it may fetch again.
        let found = self.groups.read().get(group).cloned();
        found.map_or_else(fallback, Ok)
    }

    /// Get a registered group.
    #[must_use]
    pub fn get(&self, group: &str) -> Option<StorageGroup> {
        self.groups.read().get(group).cloned()
    }

    /// Check whether a group is registered.
    #[must_use]
    pub fn contains(&self, group: &str) -> bool {
        self.groups.read().contains_key(group)
    }

    /// Names of all registered groups, sorted.
    #[must_use]
    pub fn group_ids(&self) -> Vec<GroupId> {
        let mut ids: Vec<_> = self.groups.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Number of registered groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.read().len()
    }

    /// Check if no groups are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.read().is_empty()
    }

    /// Run `transform` with mutable access to the group mapping.
    ///
    /// Changes are visible to every later `fetch`. Resolvers keep their
    /// memoized backends until they are reset.
    pub fn apply<R>(&self, transform: impl FnOnce(&mut Groups) -> R) -> R {
        transform(&mut self.groups.write())
    }

    /// Populate the registry.
    ///
    /// ```
    /// use std::sync::Arc;
    /// use storage_groups::service::{ConfigRegistry, StorageGroup};
    /// use storage_groups::storage::MemoryStorage;
    ///
    /// let registry = ConfigRegistry::new();
    /// registry.configure(|groups| {
    ///     groups.insert(
    ///         "images".parse().unwrap(),
    ///         StorageGroup::new()
    ///             .with("cache".parse().unwrap(), Arc::new(MemoryStorage::new()))
    ///             .with("store".parse().unwrap(), Arc::new(MemoryStorage::new())),
    ///     );
    /// });
    /// assert!(registry.contains("images"));
    /// ```
    pub fn configure<R>(&self, transform: impl FnOnce(&mut Groups) -> R) -> R {
        let mut groups = self.groups.write();
        let result = transform(&mut groups);
        info!(groups = groups.len(), "Storage groups configured");
        result
    }

    /// Create the groups declared in `settings` and register them.
    ///
    /// Groups already registered under the same name are replaced; other
    /// groups are kept. Nothing is registered if any backend fails.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings are invalid or a backend cannot be
    /// initialized.
    pub async fn configure_from(&self, settings: &Settings) -> Result<(), SetupError> {
        let created = create_groups(settings).await?;
        self.configure(|groups| groups.extend(created));
        Ok(())
    }

    /// Remove every group.
    pub fn clear(&self) {
        self.apply(Groups::clear);
    }
}
