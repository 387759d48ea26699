/// What happened, for adapters and tests that need more than the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Unauthorized,
    InvalidAmount,
    InvalidInput,
    AlreadyExists,
    NotFound,
    AlreadyRedeemed,
    UnknownKey,
    /// The key was consumed but its role does not exist.
    RoleNotFound,
    Failed,
}

/// The single user-visible answer to a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Rendered as a rich embed when set.
    pub title: Option<String>,
    pub content: String,
    /// Only visible to the invoking user, where the platform supports it.
    pub ephemeral: bool,
    pub outcome: Outcome,
}

impl Reply {
    pub fn text(outcome: Outcome, content: impl Into<String>) -> Self {
        Self {
            title: None,
            content: content.into(),
            ephemeral: false,
            outcome,
        }
    }

    pub fn embed(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            content: content.into(),
            ephemeral: false,
            outcome: Outcome::Success,
        }
    }

    #[must_use]
    pub fn ephemeral(mut self) -> Self {
        self.ephemeral = true;
        self
    }

    pub fn is_success(&self) -> bool {
        self.outcome == Outcome::Success
    }
}
