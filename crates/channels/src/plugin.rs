use std::collections::HashSet;

use {
    async_trait::async_trait,
    keyward_common::{ActorId, ChannelId, RoleId},
};

use crate::Result;

/// A short formatted message: title, body and an optional footer line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub body: String,
    pub footer: Option<String>,
}

/// Everything the bot needs from a chat platform.
///
/// One value is scoped to a single community (a Discord guild); ids are only
/// meaningful within it.
#[async_trait]
pub trait Platform: Send + Sync {
    /// Platform identifier (e.g. "discord").
    fn id(&self) -> &str;

    /// Roles currently held by `actor`.
    async fn actor_roles(&self, actor: &ActorId) -> Result<HashSet<RoleId>>;

    async fn role_exists(&self, role: &RoleId) -> Result<bool>;

    /// Give `role` to `actor`. Fails with [`crate::Error::RoleNotFound`] if
    /// the role is gone.
    async fn grant_role(&self, actor: &ActorId, role: &RoleId) -> Result<()>;

    async fn send_notice(&self, channel: &ChannelId, notice: &Notice) -> Result<()>;

    /// Delete up to `limit` of the most recent messages in `channel` and
    /// return how many were deleted.
    async fn purge_messages(&self, channel: &ChannelId, limit: u64) -> Result<u64>;
}
