//! # Storage Groups
//!
//! Lets independently defined uploaders pick their storage backends from
//! named, globally configured groups instead of hard-coding them.
//!
//! - **Registry**: group name -> role -> backend, shared by all uploaders
//! - **Resolver**: one per uploader type; declares a group and memoizes the
//!   backend resolved for each role
//! - **Fallbacks**: an unregistered group falls back to `default`; a role
//!   missing from the found group falls back to the uploader's own storages
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   resolve(role)   ┌─────────────────┐   fetch(group)   ┌────────────────┐
//! │   Uploader   │ ────────────────→ │ StorageResolver │ ───────────────→ │ ConfigRegistry │
//! └──────────────┘                   │  (memo, group)  │                  └────────────────┘
//!        │ put/get                   └─────────────────┘                          │
//!        ↓                                    │ role missing                      │ groups
//! ┌──────────────┐                            ↓                                   ↓
//! │StorageBackend│ ←──────────────────  BaseResolver          StorageGroup (role → backend)
//! └──────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use storage_groups::service::{ConfigRegistry, StorageGroup, StorageResolver};
//! use storage_groups::storage::MemoryStorage;
//!
//! let registry = ConfigRegistry::shared();
//! let resolver = StorageResolver::new(Arc::clone(&registry));
//! resolver.set_group("images".parse().unwrap());
//!
//! registry.configure(|groups| {
//!     groups.insert(
//!         "images".parse().unwrap(),
//!         StorageGroup::new().with("cache".parse().unwrap(), Arc::new(MemoryStorage::new())),
//!     );
//! });
//!
//! let cache = resolver.resolve(&"cache".parse().unwrap()).unwrap();
//! assert_eq!(cache.backend_name(), "memory");
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

pub mod config;
pub mod domain;
pub mod error;
pub mod service;
pub mod storage;

use std::sync::Arc;

use tracing::info;

use crate::config::{ObservabilityConfig, Settings};
use crate::error::SetupError;
use crate::service::ConfigRegistry;
use crate::storage::build_registry;

/// Load settings and build the shared registry.
///
/// This function:
/// 1. Loads settings from files and environment
/// 2. Initializes logging
/// 3. Creates every declared backend and registers its group
///
/// # Errors
///
/// Returns an error if:
/// - Settings cannot be loaded or are invalid
/// - A storage backend fails to initialize
pub async fn bootstrap() -> Result<Arc<ConfigRegistry>, SetupError> {
    let settings = Settings::load()?;

    init_logging(&settings.observability);

    let registry = build_registry(&settings).await?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        groups = registry.len(),
        "Storage groups ready"
    );

    Ok(registry)
}

/// Initialize logging based on configuration.
///
/// Does nothing if a global subscriber is already installed.
pub fn init_logging(config: &ObservabilityConfig) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    let _ = if config.log_format == "json" {
        subscriber.with(fmt::layer().json()).try_init()
    } else {
        subscriber.with(fmt::layer()).try_init()
    };
}
