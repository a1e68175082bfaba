//! Group and role identifiers.
//!
//! Both are opaque symbolic names. Construction trims surrounding whitespace
//! and rejects blank input, so a held identifier is always usable as a key.

use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::InvalidIdentifier;

macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(Arc<str>);

        impl $name {
            /// Create an identifier, trimming surrounding whitespace.
            ///
            /// # Errors
            ///
            /// Returns [`InvalidIdentifier`] if the name is blank.
            pub fn new(name: &str) -> Result<Self, InvalidIdentifier> {
                let trimmed = name.trim();
                if trimmed.is_empty() {
                    return Err(InvalidIdentifier(name.to_string()));
                }
                Ok(Self(Arc::from(trimmed)))
            }

            /// Get the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = InvalidIdentifier;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = InvalidIdentifier;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(&value)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = InvalidIdentifier;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0.to_string()
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

identifier! {
    /// Name of a storage group, e.g. `images` or `default`.
    GroupId
}

identifier! {
    /// Logical storage purpose within an uploader, e.g. `cache` or `store`.
    Role
}

impl GroupId {
    /// Name of the group used when an uploader declares none.
    pub const DEFAULT_NAME: &'static str = "default";

    /// The `default` group.
    #[must_use]
    pub fn default_group() -> Self {
        Self(Arc::from(Self::DEFAULT_NAME))
    }

    /// Check whether this is the `default` group.
    #[must_use]
    pub fn is_default(&self) -> bool {
        &*self.0 == Self::DEFAULT_NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trims_whitespace() {
        let group: GroupId = "  images ".parse().unwrap();
        assert_eq!(group.as_str(), "images");
        assert_eq!(group, GroupId::new("images").unwrap());
    }

    #[test]
    fn test_rejects_blank() {
        assert!(GroupId::new("").is_err());
        assert_eq!(
            Role::new("   ").unwrap_err(),
            InvalidIdentifier("   ".to_string())
        );
    }

    #[test]
    fn test_default_group() {
        assert!(GroupId::default_group().is_default());
        assert!(GroupId::new(" default").unwrap().is_default());
        assert!(!GroupId::new("images").unwrap().is_default());
    }

    #[test]
    fn test_serde() {
        let role: Role = serde_json::from_str("\" store \"").unwrap();
        assert_eq!(role.as_str(), "store");
        assert_eq!(serde_json::to_string(&role).unwrap(), "\"store\"");
        assert!(serde_json::from_str::<Role>("\"\"").is_err());
    }
}
