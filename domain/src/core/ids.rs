//! Identifier value objects.
//!
//! All identifiers are opaque platform snowflakes carried as `u64`. They
//! serialize as bare integers so persisted state stays language-neutral.
//!
//! - [`UserId`] - a requester, voter or moderator
//! - [`RequestId`] - a role request; equal to the id of its hosting thread
//! - [`MessageId`] - the rendered voting prompt

use serde::{Deserialize, Serialize};

/// Seconds since the Unix epoch.
pub type Timestamp = i64;

macro_rules! snowflake_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            /// Returns the raw numeric id.
            pub const fn get(&self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse().map(Self)
            }
        }
    };
}

snowflake_id!(
    /// Identifier of a platform user.
    UserId
);

snowflake_id!(
    /// Identifier of a role request.
    ///
    /// A request is hosted in its own conversation thread, and the request id
    /// is the thread id.
    RequestId
);

snowflake_id!(
    /// Identifier of the rendered voting prompt message.
    MessageId
);
