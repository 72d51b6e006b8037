//! Typed IDs for type-safe document references.
//!
//! Using typed IDs prevents accidentally passing a `FlatId` where an `OrganizationId` is expected.
//! IDs are strings because they double as document path segments.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Error returned when parsing a typed ID.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    /// The ID was empty.
    #[error("id must not be empty")]
    Empty,
    /// The ID contained a path separator.
    #[error("id must not contain '/': {0}")]
    ContainsSeparator(String),
}

/// Macro to generate typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps an existing identifier.
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Creates a new random ID using UUID v7 (time-ordered).
            #[must_use]
            pub fn generate() -> Self {
                Self(Uuid::now_v7().simple().to_string())
            }

            /// Returns the ID as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Returns the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Err(IdError::Empty);
                }
                if trimmed.contains('/') {
                    return Err(IdError::ContainsSeparator(trimmed.to_string()));
                }
                Ok(Self(trimmed.to_string()))
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

typed_id!(OrganizationId, "Unique identifier for a society (organization).");
typed_id!(FlatId, "Unique identifier for a flat (unit) within a society.");
typed_id!(VoucherId, "Unique identifier for a voucher document.");
typed_id!(BillId, "Unique identifier for a bill.");
typed_id!(
    TransactionId,
    "Collision-checked identifier for an uncleared balance record."
);

#[cfg(test)]
#[path = "id_tests.rs"]
mod id_tests;
