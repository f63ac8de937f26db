//! Strongly Typed Identifiers
//!
//! Newtype wrappers for the identifiers that cross crate boundaries.
//! Accounts and entitlements are addressed by identifiers minted by the
//! external procurement service (opaque strings), while the locally
//! generated account identity is a UUID. Keeping them as distinct types
//! prevents passing an entitlement id where an account id is expected.
//!
//! # Example
//!
//! ```
//! use portside_core::{ProcurementAccountId, EntitlementId};
//!
//! let account: ProcurementAccountId = "acc-1".into();
//! let entitlement: EntitlementId = "sub-1".into();
//!
//! fn requires_account(id: &ProcurementAccountId) -> String {
//!     id.to_string()
//! }
//!
//! let rendered = requires_account(&account);
//! // requires_account(&entitlement); // would not compile
//! assert_eq!(rendered, "acc-1");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Macro to define a strongly-typed external identifier backed by a string.
macro_rules! define_external_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates an id from its external string form.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

define_external_id!(
    /// Identifier the procurement service assigns to a customer account.
    ///
    /// Stable and unique on the procurement side; the local record keeps it
    /// alongside the locally generated [`InternalAccountId`].
    ProcurementAccountId
);

define_external_id!(
    /// Identifier the procurement service assigns to an entitlement
    /// (subscription).
    EntitlementId
);

/// Locally generated account identity.
///
/// Assigned exactly once, the first time a given procurement account id is
/// seen, and never changed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InternalAccountId(Uuid);

impl InternalAccountId {
    /// Mints a fresh internal account id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wraps an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Display for InternalAccountId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn external_ids_round_trip_serde() {
        let id = EntitlementId::new("sub-42");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"sub-42\"");
        let back: EntitlementId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn internal_id_is_unique_per_generate() {
        let a = InternalAccountId::generate();
        let b = InternalAccountId::generate();
        assert_ne!(a, b);
    }
}
