//! Runtime bot settings shared by every command handler.

use {
    keyward_common::{ChannelId, RoleId},
    tokio::sync::RwLock,
    tracing::info,
};

use crate::{ConfigStore, PermissionsConfig, Result};

/// Admin role and audit channel, loaded once at startup.
///
/// Updates persist to the data directory while the write lock is held, so a
/// reader never sees a value that is not also on disk.
#[derive(Debug)]
pub struct BotSettings {
    store: ConfigStore,
    admin_role: RwLock<Option<RoleId>>,
    log_channel: RwLock<Option<ChannelId>>,
    open_log_channel_setup: bool,
}

impl BotSettings {
    pub fn load(store: ConfigStore, permissions: &PermissionsConfig) -> Self {
        let admin_role = store.load_admin_role();
        let log_channel = store.load_log_channel();
        info!(
            admin_role = ?admin_role,
            log_channel = ?log_channel,
            "settings loaded"
        );
        Self {
            store,
            admin_role: RwLock::new(admin_role),
            log_channel: RwLock::new(log_channel),
            open_log_channel_setup: permissions.open_log_channel_setup,
        }
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    pub async fn admin_role(&self) -> Option<RoleId> {
        self.admin_role.read().await.clone()
    }

    /// Re-read `admins.json` and return the new admin role.
    pub async fn reload_admin_role(&self) -> Option<RoleId> {
        let mut guard = self.admin_role.write().await;
        *guard = self.store.load_admin_role();
        info!(admin_role = ?*guard, "admin role reloaded");
        guard.clone()
    }

    pub async fn log_channel(&self) -> Option<ChannelId> {
        self.log_channel.read().await.clone()
    }

    pub async fn set_log_channel(&self, channel: ChannelId) -> Result<()> {
        let mut guard = self.log_channel.write().await;
        self.store.save_log_channel(Some(&channel))?;
        info!(channel_id = %channel, "log channel updated");
        *guard = Some(channel);
        Ok(())
    }

    /// Whether `setup_log_channel` skips the admin check.
    pub fn log_channel_setup_is_open(&self) -> bool {
        self.open_log_channel_setup
    }
}
