use std::sync::Arc;

use {
    keyward_channels::{AuditLog, Platform, gating},
    keyward_common::{ChannelId, RoleId},
    keyward_config::BotSettings,
    keyward_licenses::LicenseRegistry,
    tracing::{debug, error, info, warn},
};

use crate::{
    command::{Actor, AdminAction, Command, Invocation},
    error::CommandError,
    reply::{Outcome, Reply},
};

type CommandResult = Result<Reply, CommandError>;

/// Runs bot commands against the shared settings and license registry.
///
/// Cheap to share: adapters hold one behind an `Arc` and call
/// [`CommandHandlers::dispatch`] from as many tasks as they like.
pub struct CommandHandlers {
    settings: Arc<BotSettings>,
    registry: Arc<LicenseRegistry>,
    audit: AuditLog,
}

impl CommandHandlers {
    pub fn new(settings: Arc<BotSettings>, registry: Arc<LicenseRegistry>) -> Self {
        let audit = AuditLog::new(Arc::clone(&settings));
        Self {
            settings,
            registry,
            audit,
        }
    }

    pub fn settings(&self) -> &BotSettings {
        &self.settings
    }

    pub fn registry(&self) -> &LicenseRegistry {
        &self.registry
    }

    /// Re-read `admins.json` and the license tables from disk, for operators
    /// who edit the files by hand while the bot runs.
    pub async fn reload(&self) {
        let admin_role = self.settings.reload_admin_role().await;
        self.registry.reload().await;
        info!(admin_role = ?admin_role, "tables reloaded");
    }

    /// Run one command and produce its reply.
    pub async fn dispatch(
        &self,
        platform: &dyn Platform,
        invocation: &Invocation,
        command: Command,
    ) -> Reply {
        let name = command.name();
        debug!(
            command = name,
            actor = %invocation.actor.id,
            channel_id = %invocation.channel,
            "dispatching command"
        );

        let result = match command {
            Command::Clear { amount } => self.clear(platform, invocation, amount).await,
            Command::SetupLogChannel { channel } => {
                self.setup_log_channel(platform, &invocation.actor, channel)
                    .await
            },
            Command::AddLicense { key, role_id } => {
                self.add_license(platform, &invocation.actor, &key, &role_id)
                    .await
            },
            Command::RemoveLicense { key } => {
                self.remove_license(platform, &invocation.actor, &key)
                    .await
            },
            Command::Redeem { key } => self.redeem(platform, &invocation.actor, &key).await,
        };

        match result {
            Ok(reply) => reply,
            Err(e) => {
                match &e {
                    CommandError::Storage(source) => {
                        error!(command = name, error = %source, "command failed to persist");
                    },
                    CommandError::Platform(source) => {
                        warn!(command = name, error = %source, "platform call failed");
                    },
                    _ => {
                        debug!(command = name, reason = %e, "command rejected");
                    },
                }
                e.into_reply()
            },
        }
    }

    /// Check that `actor` holds the admin role. Adapters call this ahead of
    /// [`CommandHandlers::dispatch`] when they must know the outcome before
    /// acknowledging the command.
    pub async fn authorize(
        &self,
        platform: &dyn Platform,
        actor: &Actor,
        action: AdminAction,
    ) -> Result<(), CommandError> {
        let Some(admin_role) = self.settings.admin_role().await else {
            warn!(actor = %actor.id, %action, "admin role not configured, denying");
            return Err(CommandError::Unauthorized { action });
        };

        let roles = platform.actor_roles(&actor.id).await?;
        if gating::is_authorized(&roles, Some(&admin_role)) {
            Ok(())
        } else {
            warn!(actor = %actor.id, actor_name = %actor.name, %action, "permission denied");
            Err(CommandError::Unauthorized { action })
        }
    }

    async fn clear(
        &self,
        platform: &dyn Platform,
        invocation: &Invocation,
        amount: i64,
    ) -> CommandResult {
        self.authorize(platform, &invocation.actor, AdminAction::ClearChat)
            .await?;
        if amount < 1 {
            return Err(CommandError::InvalidAmount);
        }

        let extra = u64::from(invocation.command_message);
        let deleted = platform
            .purge_messages(&invocation.channel, amount.unsigned_abs() + extra)
            .await?;
        let deleted = deleted.saturating_sub(extra);

        self.audit
            .record(
                platform,
                "Messages Cleared",
                format!("Deleted {deleted} messages in <#{}>.", invocation.channel),
                &invocation.actor.name,
            )
            .await;
        Ok(Reply::text(Outcome::Success, format!("Deleted {deleted} messages.")).ephemeral())
    }

    async fn setup_log_channel(
        &self,
        platform: &dyn Platform,
        actor: &Actor,
        channel: ChannelId,
    ) -> CommandResult {
        if !self.settings.log_channel_setup_is_open() {
            self.authorize(platform, actor, AdminAction::SetLogChannel)
                .await?;
        }

        self.settings
            .set_log_channel(channel.clone())
            .await
            .map_err(CommandError::Storage)?;

        let message = format!("Log channel set to <#{channel}>.");
        self.audit
            .record(platform, "Log Channel Set", message.clone(), &actor.name)
            .await;
        Ok(Reply::text(Outcome::Success, message))
    }

    async fn add_license(
        &self,
        platform: &dyn Platform,
        actor: &Actor,
        key: &str,
        role_id: &str,
    ) -> CommandResult {
        self.authorize(platform, actor, AdminAction::AddLicense)
            .await?;
        if key.is_empty() {
            return Err(CommandError::invalid_input("License key must not be empty."));
        }
        let role_id = RoleId::parse(role_id).map_err(|_| {
            CommandError::invalid_input(format!("{role_id:?} is not a valid role ID."))
        })?;

        let license = self.registry.add(key, role_id).await?;

        let message = format!(
            "License key {} added with role ID {}.",
            license.key, license.role_id
        );
        self.audit
            .record(platform, "License Added", message.clone(), &actor.name)
            .await;
        Ok(Reply::text(Outcome::Success, message))
    }

    async fn remove_license(
        &self,
        platform: &dyn Platform,
        actor: &Actor,
        key: &str,
    ) -> CommandResult {
        self.authorize(platform, actor, AdminAction::RemoveLicense)
            .await?;

        let license = self.registry.remove(key).await?;

        let message = format!("License key {} removed.", license.key);
        self.audit
            .record(platform, "License Removed", message.clone(), &actor.name)
            .await;
        Ok(Reply::text(Outcome::Success, message))
    }

    /// Consume the key first, then try to grant its role. A missing role
    /// does not give the key back.
    async fn redeem(&self, platform: &dyn Platform, actor: &Actor, key: &str) -> CommandResult {
        let redemption = self.registry.redeem(key, &actor.id).await?;
        let role_id = &redemption.role_id;

        let granted = match platform.role_exists(role_id).await {
            Ok(true) => platform.grant_role(&actor.id, role_id).await,
            Ok(false) => Err(keyward_channels::Error::role_not_found(role_id)),
            Err(e) => Err(e),
        };

        match granted {
            Ok(()) => {
                self.audit
                    .record(
                        platform,
                        "License Redeemed",
                        format!("License key {key} redeemed. Role ID {role_id} assigned."),
                        &actor.name,
                    )
                    .await;
                Ok(Reply::embed(
                    "License Redeemed!",
                    format!(
                        "You have successfully redeemed the license key **{key}** and been given the role: <@&{role_id}>."
                    ),
                ))
            },
            Err(keyward_channels::Error::RoleNotFound { .. }) => {
                warn!(key, role_id = %role_id, "redeemed key points at a missing role");
                self.audit
                    .record(
                        platform,
                        "License Redeemed",
                        format!(
                            "License key {key} redeemed. Role ID {role_id} does not exist, no role assigned."
                        ),
                        &actor.name,
                    )
                    .await;
                Ok(Reply::text(
                    Outcome::RoleNotFound,
                    format!(
                        "License key {key} redeemed, but the role with ID {role_id} does not exist."
                    ),
                ))
            },
            Err(e) => {
                warn!(key, role_id = %role_id, error = %e, "role grant failed after redemption");
                self.audit
                    .record(
                        platform,
                        "License Redeemed",
                        format!(
                            "License key {key} redeemed. Assigning role ID {role_id} failed: {e}"
                        ),
                        &actor.name,
                    )
                    .await;
                Ok(Reply::text(
                    Outcome::Failed,
                    format!(
                        "License key {key} redeemed, but the role with ID {role_id} could not be assigned. Please contact an administrator."
                    ),
                ))
            },
        }
    }
}
