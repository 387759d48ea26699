//! Platform identifier value types.
//!
//! Chat platforms hand out numeric snowflake ids that overflow the integer
//! range of some JSON consumers, so ids are carried as strings. Persisted
//! files written by older deployments may still hold plain numbers, which is
//! why deserialization accepts both forms.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::Error;

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(u64),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(s) => s.trim().to_string(),
            RawId::Number(n) => n.to_string(),
        }
    }
}

macro_rules! platform_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Parse a user-supplied id, rejecting anything that is not a
            /// non-empty run of ASCII digits.
            pub fn parse(input: &str) -> crate::Result<Self> {
                let trimmed = input.trim();
                if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(Error::invalid_id($kind, input));
                }
                Ok(Self(trimmed.to_string()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Numeric form, for platform SDKs that take integer ids.
            pub fn as_u64(&self) -> Option<u64> {
                self.0.parse().ok()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id.to_string())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                RawId::deserialize(deserializer).map(|raw| Self(raw.into()))
            }
        }
    };
}

platform_id!(
    /// A platform role that can be granted to a member.
    RoleId,
    "role"
);

platform_id!(
    /// A text channel messages can be posted to.
    ChannelId,
    "channel"
);

platform_id!(
    /// The user invoking a command.
    ActorId,
    "actor"
);
