//! Role -> storage backend resolution.
//!
//! Each uploader type owns one [`StorageResolver`]. Resolution precedence:
//!
//! 1. a backend memoized by an earlier call,
//! 2. the role's entry in the uploader's declared group,
//! 3. the role's entry in the `default` group, when the declared group is
//!    not registered at all (or none was declared),
//! 4. the base resolver, when the group that was found lacks the role.
//!
//! If neither the declared group nor `default` is registered, resolution
//! fails with [`ResolveError::NotConfigured`].

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::domain::{GroupId, Role};
use crate::error::{ResolveError, ResolveResult};
use crate::service::registry::{ConfigRegistry, StorageGroup};
use crate::storage::DynStorage;

/// Inherited lookup used when a group has no backend for a role.
pub trait BaseResolver: Send + Sync {
    /// Resolve a role to a backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the role cannot be resolved.
    fn resolve(&self, role: &Role) -> ResolveResult<DynStorage>;
}

/// An uploader's own fixed storages.
impl BaseResolver for StorageGroup {
    fn resolve(&self, role: &Role) -> ResolveResult<DynStorage> {
        self.get(role.as_str())
            .cloned()
            .ok_or_else(|| ResolveError::NotRegistered(role.clone()))
    }
}

impl<F> BaseResolver for F
where
    F: Fn(&Role) -> ResolveResult<DynStorage> + Send + Sync,
{
    fn resolve(&self, role: &Role) -> ResolveResult<DynStorage> {
        self(role)
    }
}

#[derive(Default)]
struct ResolverState {
    configured_group: Option<GroupId>,
    memo: HashMap<Role, DynStorage>,
    /// Bumped on every reset or declaration.
    generation: u64,
}

/// Per-uploader resolver state.
pub struct StorageResolver {
    registry: Arc<ConfigRegistry>,
    base: Arc<dyn BaseResolver>,
    state: RwLock<ResolverState>,
}

impl StorageResolver {
    /// Create a resolver with no fixed storages to fall back on.
    #[must_use]
    pub fn new(registry: Arc<ConfigRegistry>) -> Self {
        Self::with_base(registry, Arc::new(StorageGroup::new()))
    }

    /// Create a resolver falling back on `base` for roles a group lacks.
    #[must_use]
    pub fn with_base(registry: Arc<ConfigRegistry>, base: Arc<dyn BaseResolver>) -> Self {
        Self {
            registry,
            base,
            state: RwLock::new(ResolverState::default()),
        }
    }

    /// Get the registry this resolver reads from.
    #[must_use]
    pub const fn registry(&self) -> &Arc<ConfigRegistry> {
        &self.registry
    }

    /// Forget the declared group and every memoized backend.
    pub fn setup(&self) {
        let mut state = self.state.write();
        state.configured_group = None;
        state.memo.clear();
        state.generation += 1;
    }

    /// Declare the group this uploader resolves from.
    ///
    /// Clears every memoized backend, since the group decides all roles.
    pub fn set_group(&self, group: GroupId) {
        let mut state = self.state.write();
        info!(group = %group, evicted = state.memo.len(), "Storage group declared");
        state.configured_group = Some(group);
        state.memo.clear();
        state.generation += 1;
    }

    /// Get the declared group.
    #[must_use]
    pub fn configured_group(&self) -> Option<GroupId> {
        self.state.read().configured_group.clone()
    }

    /// Groups tried, in order, when resolving a role.
    #[must_use]
    pub fn lookup_order(&self) -> Vec<GroupId> {
        lookup_order(self.state.read().configured_group.as_ref())
    }

    /// Check whether a role has a memoized backend.
    #[must_use]
    pub fn is_memoized(&self, role: &str) -> bool {
        self.state.read().memo.contains_key(role)
    }

    /// Resolve a role to its backend.
    ///
    /// A successful result is memoized; later calls return the same backend
    /// until [`set_group`](Self::set_group) or [`setup`](Self::setup) runs,
    /// even if the registry changes in between.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::NotConfigured`] if neither the declared group
    /// nor `default` is registered, or the base resolver's error if the
    /// found group has no backend for the role.
    pub fn resolve(&self, role: &Role) -> ResolveResult<DynStorage> {
        let (configured, generation) = {
            let state = self.state.read();
            if let Some(storage) = state.memo.get(role) {
                debug!(role = %role, "Storage memo hit");
                return Ok(Arc::clone(storage));
            }
            (state.configured_group.clone(), state.generation)
        };

        let storage = self.compute(role, configured.as_ref())?;

        let mut state = self.state.write();
        if state.generation != generation {
            // Reset or redeclared mid-resolution; the result may be stale.
            debug!(role = %role, "Resolver reset during resolution, not memoizing");
            return Ok(storage);
        }
        Ok(Arc::clone(state.memo.entry(role.clone()).or_insert(storage)))
    }

    fn compute(&self, role: &Role, configured: Option<&GroupId>) -> ResolveResult<DynStorage> {
        let sources = lookup_order(configured);
        let group = self.fetch_first(&sources, role, configured)?;

        if let Some(storage) = group.get(role.as_str()) {
            debug!(role = %role, backend = storage.backend_name(), "Storage resolved from group");
            return Ok(Arc::clone(storage));
        }

        debug!(role = %role, "Role missing from group, using base resolver");
        self.base.resolve(role)
    }

    /// Fetch the first registered group of `sources`, trying each lazily.
    fn fetch_first(
        &self,
        sources: &[GroupId],
        role: &Role,
        configured: Option<&GroupId>,
    ) -> ResolveResult<StorageGroup> {
        let Some((group, rest)) = sources.split_first() else {
            return Err(ResolveError::NotConfigured {
                role: role.clone(),
                group: configured.cloned(),
            });
        };

        self.registry.fetch(group, || {
            if let Some(next) = rest.first() {
                warn!(group = %group, fallback = %next, role = %role, "Storage group not registered");
            }
            self.fetch_first(rest, role, configured)
        })
    }
}

impl fmt::Debug for StorageResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        let mut memoized: Vec<_> = state.memo.keys().map(Role::as_str).collect();
        memoized.sort_unstable();

        f.debug_struct("StorageResolver")
            .field("configured_group", &state.configured_group)
            .field("memoized", &memoized)
            .finish_non_exhaustive()
    }
}

fn lookup_order(configured: Option<&GroupId>) -> Vec<GroupId> {
    match configured {
        Some(group) if !group.is_default() => vec![group.clone(), GroupId::default_group()],
        _ => vec![GroupId::default_group()],
    }
}
