//! Type-safe identifier wrappers around [`Uuid`].
//!
//! The two identities in the delivery protocol are strongly typed so an
//! agent id can never be used where a capability token is expected. Both
//! use UUID v4: agent ids arrive from the session layer and carry no
//! ordering requirement, and capability tokens must be unguessable since
//! the token alone addresses an agent's long-poll endpoint.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new random identifier (UUID v4).
            pub fn random() -> Self {
                Self(Uuid::new_v4())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl core::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for a connected client session (avatar).
    ///
    /// Stable for the lifetime of the session; supplied by the session
    /// layer, never minted by this workspace outside of tests.
    AgentId
}

define_id! {
    /// Unguessable capability token addressing one agent's long-poll
    /// endpoint.
    ///
    /// Bound 1:1 to an agent at a point in time and reused across
    /// re-registrations so the client keeps polling the same URL.
    CapabilityId
}
