//! Service layer module.
//!
//! Contains the storage group registry, per-uploader resolution and the
//! uploader built on top of it.

pub mod registry;
pub mod resolver;
pub mod uploader;

pub use registry::{ConfigRegistry, Groups, StorageGroup};
pub use resolver::{BaseResolver, StorageResolver};
pub use uploader::Uploader;
