//! Newtype wrappers for entity identifiers.
//!
//! These prevent accidentally mixing up IDs of different entity types
//! at compile time.

use serde::{Deserialize, Serialize};

/// Prefix used for identifiers assigned locally before the server has
/// acknowledged a record.
const LOCAL_PREFIX: &str = "local-";

/// Macro to define a newtype ID wrapping a `String` inner type.
macro_rules! define_string_id {
    (
        $(#[$meta:meta])*
        $name:ident
        $({ $($extra:item)* })?
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier from the given string.
            #[inline]
            #[must_use]
            pub const fn new(value: String) -> Self {
                Self(value)
            }

            /// Returns a reference to the inner string.
            #[inline]
            #[must_use]
            pub fn as_inner(&self) -> &str {
                &self.0
            }

            /// Consumes the wrapper and returns the inner string.
            #[inline]
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }

            $($($extra)*)?
        }

        impl core::fmt::Display for $name {
            #[inline]
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<String> for $name {
            #[inline]
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            #[inline]
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }
    };
}

define_string_id! {
    /// Unique identifier for a user (Firebase UID).
    UserId
}

define_string_id! {
    /// Unique identifier for a transaction (Firestore document id, or a
    /// `local-` id for records the server has not acknowledged yet).
    TransactionId {
        /// Generates a fresh local identifier for an optimistic insert.
        #[inline]
        #[must_use]
        pub fn local() -> Self {
            Self(format!("{LOCAL_PREFIX}{}", uuid::Uuid::new_v4()))
        }

        /// Returns `true` if this id was assigned locally rather than by the
        /// server.
        #[inline]
        #[must_use]
        pub fn is_local(&self) -> bool {
            self.0.starts_with(LOCAL_PREFIX)
        }
    }
}
