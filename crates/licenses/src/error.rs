/// Crate-wide result type for license operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Outcomes a caller must report back to the user, plus storage faults.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("license key {key} already exists")]
    AlreadyExists { key: String },

    #[error("license key {key} does not exist")]
    NotFound { key: String },

    #[error("license key {key} has already been redeemed")]
    AlreadyRedeemed { key: String },

    #[error("license key {key} is unknown")]
    UnknownKey { key: String },

    /// The change could not be written; in-memory state was left untouched.
    #[error(transparent)]
    Storage(#[from] keyward_config::Error),
}

impl Error {
    #[must_use]
    pub fn already_exists(key: impl Into<String>) -> Self {
        Self::AlreadyExists { key: key.into() }
    }

    #[must_use]
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    #[must_use]
    pub fn already_redeemed(key: impl Into<String>) -> Self {
        Self::AlreadyRedeemed { key: key.into() }
    }

    #[must_use]
    pub fn unknown_key(key: impl Into<String>) -> Self {
        Self::UnknownKey { key: key.into() }
    }
}
