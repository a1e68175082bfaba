//! Domain models.
//!
//! Identifiers for storage groups and roles, and the record describing an
//! uploaded object.

pub mod file;
pub mod identifier;

pub use file::UploadedFile;
pub use identifier::{GroupId, Role};
