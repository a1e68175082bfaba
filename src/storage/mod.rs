//! Storage layer module.
//!
//! This module provides the trait-based backend abstraction that storage
//! groups hand out, along with memory and filesystem implementations.

pub mod factory;
pub mod file;
pub mod memory;
pub mod traits;

pub use factory::{build_registry, create_groups, create_storage};
pub use file::FileSystemStorage;
pub use memory::MemoryStorage;
pub use traits::{DynStorage, StorageBackend};
