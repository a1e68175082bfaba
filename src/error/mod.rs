//! Error handling module.
//!
//! Resolution has a single error of its own, [`ResolveError::NotConfigured`].
//! Everything else is either a failure reported by the base resolver, a
//! backend I/O failure, or a setup problem found while loading settings.

use config::ConfigError;

use crate::domain::{GroupId, Role};

/// Error raised while resolving a role to a storage backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// Neither the configured group nor the default group is registered.
    #[error(
        "Uploader storage not set up for '{role}' (group '{}'). \
         Make sure you setup the configurable storage:\n\n\
         registry.configure(|groups| {{\n    \
         groups.insert(\"{}\".parse()?, StorageGroup::new()\n        \
         .with(\"cache\".parse()?, Arc::new(MemoryStorage::new()))\n        \
         .with(\"store\".parse()?, Arc::new(MemoryStorage::new())));\n\
         }});",
        group_label(.group.as_ref()),
        group_label(.group.as_ref())
    )]
    NotConfigured {
        /// Role that was being resolved.
        role: Role,
        /// Group declared by the uploader, if any.
        group: Option<GroupId>,
    },

    /// The base resolver has no storage registered for the role.
    #[error("Storage '{0}' isn't registered")]
    NotRegistered(Role),

    /// Failure reported by a custom base resolver.
    #[error("Base resolver failed: {0}")]
    Base(String),
}

fn group_label(group: Option<&GroupId>) -> &str {
    group.map_or(GroupId::DEFAULT_NAME, GroupId::as_str)
}

/// Storage backend error type.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// File I/O error.
    #[error("File I/O error: {0}")]
    FileIO(String),

    /// Object not found.
    #[error("Object not found: {0}")]
    NotFound(String),

    /// Object id cannot be mapped onto the backend.
    #[error("Invalid object id: {0}")]
    InvalidKey(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Backend not available.
    #[error("Storage backend unavailable")]
    Unavailable,
}

impl From<std::io::Error> for BackendError {
    fn from(err: std::io::Error) -> Self {
        Self::FileIO(err.to_string())
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Error raised by an [`Uploader`](crate::service::Uploader).
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// Storage could not be resolved.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Storage backend failed.
    #[error("Storage error: {0}")]
    Backend(#[from] BackendError),
}

/// Blank or otherwise unusable group/role name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid identifier: {0:?}")]
pub struct InvalidIdentifier(pub String);

/// Error raised while turning settings into a populated registry.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    /// Settings could not be loaded or are invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A backend could not be created.
    #[error("Storage error: {0}")]
    Backend(#[from] BackendError),

    /// A group or role name is blank.
    #[error(transparent)]
    InvalidIdentifier(#[from] InvalidIdentifier),
}

/// Result type alias using `ResolveError`.
pub type ResolveResult<T> = std::result::Result<T, ResolveError>;

/// Result type alias using `BackendError`.
pub type BackendResult<T> = std::result::Result<T, BackendError>;
