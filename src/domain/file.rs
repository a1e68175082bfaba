//! Uploaded file records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Role;
use crate::error::BackendResult;

/// Reference to an object written through an uploader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    /// Object id within the backend.
    pub id: String,

    /// Role whose backend holds the object.
    pub storage: Role,

    /// Size in bytes.
    pub size: u64,

    /// Upload timestamp.
    pub uploaded_at: DateTime<Utc>,
}

impl UploadedFile {
    /// Create a record for a freshly written object.
    #[must_use]
    pub fn new(id: String, storage: Role, size: u64) -> Self {
        Self {
            id,
            storage,
            size,
            uploaded_at: Utc::now(),
        }
    }

    /// Serialize the record to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> BackendResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a record from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the role is blank.
    pub fn from_json(json: &str) -> BackendResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
