//! Storage group configuration.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use config::ConfigError;
use serde::Deserialize;

/// Storage backend type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// In-memory storage (tests/single process).
    #[default]
    Memory,
    /// Filesystem storage.
    File,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Memory => write!(f, "memory"),
            Self::File => write!(f, "file"),
        }
    }
}

/// Backend declaration for one role of a group.
///
/// ```toml
/// [groups.images.store]
/// backend = "file"
/// directory = "uploads"
/// prefix = "img"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BackendSpec {
    /// Storage backend type.
    #[serde(default)]
    pub backend: BackendKind,

    /// Base directory (file backend only).
    #[serde(default)]
    pub directory: Option<PathBuf>,

    /// Subdirectory under `directory` (file backend only).
    #[serde(default)]
    pub prefix: Option<String>,
}

impl BackendSpec {
    /// Memory backend declaration.
    #[must_use]
    pub const fn memory() -> Self {
        Self {
            backend: BackendKind::Memory,
            directory: None,
            prefix: None,
        }
    }

    /// File backend declaration.
    #[must_use]
    pub fn file(directory: impl Into<PathBuf>, prefix: Option<&str>) -> Self {
        Self {
            backend: BackendKind::File,
            directory: Some(directory.into()),
            prefix: prefix.map(ToString::to_string),
        }
    }

    /// Validate the backend declaration.
    ///
    /// # Errors
    ///
    /// Returns an error if required fields are missing for the selected backend.
    pub fn validate(&self, group: &str, role: &str) -> Result<(), ConfigError> {
        match self.backend {
            BackendKind::Memory => Ok(()),
            BackendKind::File => {
                if self
                    .directory
                    .as_ref()
                    .is_none_or(|d| d.as_os_str().is_empty())
                {
                    return Err(ConfigError::Message(format!(
                        "groups.{group}.{role}.directory cannot be empty"
                    )));
                }
                Ok(())
            }
        }
    }
}

/// Role name -> backend declaration.
pub type GroupSpec = HashMap<String, BackendSpec>;

/// Validate all group declarations.
///
/// # Errors
///
/// Returns an error if a group or role name is blank, two names are equal
/// once trimmed, or a backend declaration is incomplete.
pub fn validate_groups(groups: &HashMap<String, GroupSpec>) -> Result<(), ConfigError> {
    let mut seen_groups = HashSet::with_capacity(groups.len());

    for (group, roles) in groups {
        if group.trim().is_empty() {
            return Err(ConfigError::Message(
                "group names cannot be blank".to_string(),
            ));
        }
        if !seen_groups.insert(group.trim()) {
            return Err(ConfigError::Message(format!(
                "group {:?} is declared more than once",
                group.trim()
            )));
        }

        let mut seen_roles = HashSet::with_capacity(roles.len());
        for (role, spec) in roles {
            if role.trim().is_empty() {
                return Err(ConfigError::Message(format!(
                    "groups.{group}: role names cannot be blank"
                )));
            }
            if !seen_roles.insert(role.trim()) {
                return Err(ConfigError::Message(format!(
                    "groups.{group}: role {:?} is declared more than once",
                    role.trim()
                )));
            }
            spec.validate(group, role)?;
        }
    }

    Ok(())
}
