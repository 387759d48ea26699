use std::{collections::HashSet, sync::Arc};

use {
    async_trait::async_trait,
    keyward_channels::{Error, Notice, Platform, Result},
    keyward_common::{ActorId, ChannelId, RoleId},
    serenity::all::{
        self as dc, Colour, CreateEmbed, CreateEmbedFooter, CreateMessage, GetMessages, GuildId,
        Http, MessageId, Timestamp, UserId,
    },
    tracing::{debug, warn},
};

/// Discord's cap on messages fetched or bulk-deleted per request.
const MESSAGE_BATCH: u64 = 100;

/// 14 days, less a minute of slack for clock skew.
const BULK_DELETE_MAX_AGE_SECS: i64 = 14 * 24 * 60 * 60 - 60;

/// [`Platform`] for one Discord guild.
pub struct DiscordGuild {
    http: Arc<Http>,
    guild_id: GuildId,
    /// Roles of the invoking member as delivered with the interaction, so
    /// permission checks don't need an extra API call.
    invoker: Option<(UserId, HashSet<RoleId>)>,
}

impl DiscordGuild {
    pub fn new(http: Arc<Http>, guild_id: GuildId) -> Self {
        Self {
            http,
            guild_id,
            invoker: None,
        }
    }

    #[must_use]
    pub fn with_invoker(mut self, user_id: UserId, roles: &[dc::RoleId]) -> Self {
        let roles = roles.iter().map(|r| RoleId::from(r.get())).collect();
        self.invoker = Some((user_id, roles));
        self
    }

    fn http(&self) -> &Http {
        &self.http
    }
}

fn user_id(actor: &ActorId) -> Result<UserId> {
    actor
        .as_u64()
        .filter(|id| *id != 0)
        .map(UserId::new)
        .ok_or_else(|| Error::member_not_found(actor))
}

fn role_id(role: &RoleId) -> Option<dc::RoleId> {
    role.as_u64().filter(|id| *id != 0).map(dc::RoleId::new)
}

fn channel_id(channel: &ChannelId) -> Result<dc::ChannelId> {
    channel
        .as_u64()
        .filter(|id| *id != 0)
        .map(dc::ChannelId::new)
        .ok_or_else(|| Error::channel_unavailable(channel))
}

/// Whether a message created at `created_at` can still go through bulk
/// delete, which Discord refuses for messages older than 14 days.
fn bulk_deletable(created_at: i64, now: i64) -> bool {
    now.saturating_sub(created_at) < BULK_DELETE_MAX_AGE_SECS
}

/// Stop a purge on `err`. Messages already gone still count.
fn partial_purge(channel: &ChannelId, deleted: u64, err: Error) -> Result<u64> {
    if deleted == 0 {
        return Err(err);
    }
    warn!(channel_id = %channel, deleted, error = %err, "purge stopped early");
    Ok(deleted)
}

/// Render a notice as an embed.
pub fn embed(notice: &Notice) -> CreateEmbed {
    let embed = CreateEmbed::new()
        .title(&notice.title)
        .description(&notice.body)
        .colour(Colour::BLUE);
    match &notice.footer {
        Some(footer) => embed.footer(CreateEmbedFooter::new(footer)),
        None => embed,
    }
}

#[async_trait]
impl Platform for DiscordGuild {
    fn id(&self) -> &str {
        "discord"
    }

    async fn actor_roles(&self, actor: &ActorId) -> Result<HashSet<RoleId>> {
        let user = user_id(actor)?;
        if let Some((invoker, roles)) = &self.invoker
            && *invoker == user
        {
            return Ok(roles.clone());
        }

        let member = self
            .guild_id
            .member(self.http(), user)
            .await
            .map_err(|e| Error::external("fetch guild member", e))?;
        Ok(member.roles.iter().map(|r| RoleId::from(r.get())).collect())
    }

    async fn role_exists(&self, role: &RoleId) -> Result<bool> {
        let Some(id) = role_id(role) else {
            return Ok(false);
        };
        let roles = self
            .guild_id
            .roles(self.http())
            .await
            .map_err(|e| Error::external("list guild roles", e))?;
        Ok(roles.contains_key(&id))
    }

    async fn grant_role(&self, actor: &ActorId, role: &RoleId) -> Result<()> {
        let user = user_id(actor)?;
        let id = role_id(role).ok_or_else(|| Error::role_not_found(role))?;
        self.http()
            .add_member_role(self.guild_id, user, id, Some("license key redeemed"))
            .await
            .map_err(|e| Error::external("add member role", e))
    }

    async fn send_notice(&self, channel: &ChannelId, notice: &Notice) -> Result<()> {
        let id = channel_id(channel)?;
        id.send_message(self.http(), CreateMessage::new().embed(embed(notice)))
            .await
            .map_err(|e| Error::external("send notice", e))?;
        Ok(())
    }

    async fn purge_messages(&self, channel: &ChannelId, limit: u64) -> Result<u64> {
        let id = channel_id(channel)?;
        let mut deleted = 0u64;

        while deleted < limit {
            let batch = (limit - deleted).min(MESSAGE_BATCH);
            let messages = match id
                .messages(self.http(), GetMessages::new().limit(batch as u8))
                .await
            {
                Ok(messages) => messages,
                Err(e) => {
                    return partial_purge(channel, deleted, Error::external("fetch messages", e));
                },
            };
            if messages.is_empty() {
                break;
            }

            let now = Timestamp::now().unix_timestamp();
            let mut recent: Vec<MessageId> = Vec::new();
            let mut singles: Vec<MessageId> = Vec::new();
            for message in &messages {
                if bulk_deletable(message.timestamp.unix_timestamp(), now) {
                    recent.push(message.id);
                } else {
                    singles.push(message.id);
                }
            }

            if recent.len() >= 2 {
                let count = recent.len() as u64;
                if let Err(e) = id.delete_messages(self.http(), recent).await {
                    return partial_purge(channel, deleted, Error::external("bulk delete", e));
                }
                deleted += count;
            } else {
                singles.extend(recent);
            }

            for message_id in singles {
                if let Err(e) = id.delete_message(self.http(), message_id).await {
                    return partial_purge(channel, deleted, Error::external("delete message", e));
                }
                deleted += 1;
            }

            let fetched = messages.len() as u64;
            debug!(channel_id = %channel, batch = fetched, deleted, "purged message batch");
            if fetched < batch {
                break;
            }
        }

        Ok(deleted)
    }
}
