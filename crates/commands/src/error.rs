use crate::{
    command::AdminAction,
    reply::{Outcome, Reply},
};

/// Every way a command can fail. Each variant renders to a user-facing reply
/// via [`CommandError::into_reply`]; none of them is fatal.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("You do not have permission to {action}.")]
    Unauthorized { action: AdminAction },

    #[error("You must delete at least one message.")]
    InvalidAmount,

    #[error("{message}")]
    InvalidInput { message: String },

    #[error("License key {key} already exists.")]
    AlreadyExists { key: String },

    #[error("License key {key} does not exist.")]
    NotFound { key: String },

    #[error("License key {key} has already been redeemed.")]
    AlreadyRedeemed { key: String },

    #[error("License key {key} does not exist.")]
    UnknownKey { key: String },

    #[error("The change could not be saved, nothing was modified.")]
    Storage(#[source] keyward_config::Error),

    #[error("Command failed: {0}")]
    Platform(#[from] keyward_channels::Error),
}

impl CommandError {
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn outcome(&self) -> Outcome {
        match self {
            Self::Unauthorized { .. } => Outcome::Unauthorized,
            Self::InvalidAmount => Outcome::InvalidAmount,
            Self::InvalidInput { .. } => Outcome::InvalidInput,
            Self::AlreadyExists { .. } => Outcome::AlreadyExists,
            Self::NotFound { .. } => Outcome::NotFound,
            Self::AlreadyRedeemed { .. } => Outcome::AlreadyRedeemed,
            Self::UnknownKey { .. } => Outcome::UnknownKey,
            Self::Storage(_) | Self::Platform(_) => Outcome::Failed,
        }
    }

    pub fn into_reply(self) -> Reply {
        let reply = Reply::text(self.outcome(), self.to_string());
        match self {
            Self::InvalidAmount | Self::InvalidInput { .. } => reply.ephemeral(),
            _ => reply,
        }
    }
}

impl From<keyward_licenses::Error> for CommandError {
    fn from(err: keyward_licenses::Error) -> Self {
        use keyward_licenses::Error as E;
        match err {
            E::AlreadyExists { key } => Self::AlreadyExists { key },
            E::NotFound { key } => Self::NotFound { key },
            E::AlreadyRedeemed { key } => Self::AlreadyRedeemed { key },
            E::UnknownKey { key } => Self::UnknownKey { key },
            E::Storage(source) => Self::Storage(source),
        }
    }
}
