use thiserror::Error;

/// Errors from parsing platform identifiers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A platform identifier was empty or not a snowflake-like value.
    #[error("invalid {kind} id: {value:?}")]
    InvalidId { kind: &'static str, value: String },
}

impl Error {
    #[must_use]
    pub fn invalid_id(kind: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidId {
            kind,
            value: value.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_id_display() {
        let err = Error::invalid_id("role", "abc");
        assert_eq!(err.to_string(), "invalid role id: \"abc\"");
    }
}
