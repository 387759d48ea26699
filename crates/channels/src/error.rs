use std::error::Error as StdError;

use keyward_common::{ActorId, ChannelId, RoleId};

/// Crate-wide result type for platform operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Typed platform errors shared by every adapter.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The role does not exist on the platform (deleted, or a typo when the
    /// license was created).
    #[error("role {role_id} does not exist")]
    RoleNotFound { role_id: RoleId },

    #[error("channel {channel_id} is not available")]
    ChannelUnavailable { channel_id: ChannelId },

    /// The actor is not a member of the place the command ran in.
    #[error("member {actor_id} not found")]
    MemberNotFound { actor_id: ActorId },

    /// Wrapped source error from the platform SDK.
    #[error("platform operation failed: {context}: {source}")]
    External {
        context: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

impl Error {
    #[must_use]
    pub fn role_not_found(role_id: &RoleId) -> Self {
        Self::RoleNotFound {
            role_id: role_id.clone(),
        }
    }

    #[must_use]
    pub fn channel_unavailable(channel_id: &ChannelId) -> Self {
        Self::ChannelUnavailable {
            channel_id: channel_id.clone(),
        }
    }

    #[must_use]
    pub fn member_not_found(actor_id: &ActorId) -> Self {
        Self::MemberNotFound {
            actor_id: actor_id.clone(),
        }
    }

    #[must_use]
    pub fn external(
        context: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::External {
            context: context.into(),
            source: Box::new(source),
        }
    }
}
