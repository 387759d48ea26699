//! In-memory platform and harness shared by the command integration tests.

#![allow(clippy::unwrap_used, clippy::expect_used, dead_code)]

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
};

use {
    async_trait::async_trait,
    keyward_channels::{Error, Notice, Platform, Result},
    keyward_commands::{Actor, Command, CommandHandlers, Invocation, Reply},
    keyward_common::{ActorId, ChannelId, RoleId},
    keyward_config::{BotSettings, ConfigStore, PermissionsConfig},
    keyward_licenses::LicenseRegistry,
};

pub const ADMIN_ROLE: &str = "5";
pub const ADMIN: &str = "100";
pub const MEMBER: &str = "200";
pub const COMMAND_CHANNEL: &str = "10";

/// A single guild: members with roles, existing roles, channel histories.
#[derive(Default)]
pub struct MockPlatform {
    pub member_roles: Mutex<HashMap<ActorId, HashSet<RoleId>>>,
    pub roles: Mutex<HashSet<RoleId>>,
    pub notices: Mutex<Vec<(ChannelId, Notice)>>,
    pub messages: Mutex<HashMap<ChannelId, u64>>,
    pub missing_channels: Mutex<HashSet<ChannelId>>,
    /// `grant_role` fails the way Discord does for a role above the bot's.
    pub deny_grants: bool,
}

impl MockPlatform {
    pub fn with_role(self, role: &str) -> Self {
        self.roles.lock().unwrap().insert(RoleId::new(role));
        self
    }

    pub fn with_member(self, actor: &str, roles: &[&str]) -> Self {
        self.member_roles.lock().unwrap().insert(
            ActorId::new(actor),
            roles.iter().copied().map(RoleId::new).collect(),
        );
        self
    }

    pub fn with_messages(self, channel: &str, count: u64) -> Self {
        self.messages
            .lock()
            .unwrap()
            .insert(ChannelId::new(channel), count);
        self
    }

    pub fn without_channel(self, channel: &str) -> Self {
        self.missing_channels
            .lock()
            .unwrap()
            .insert(ChannelId::new(channel));
        self
    }

    pub fn denying_grants(mut self) -> Self {
        self.deny_grants = true;
        self
    }

    pub fn has_role(&self, actor: &str, role: &str) -> bool {
        self.member_roles
            .lock()
            .unwrap()
            .get(&ActorId::new(actor))
            .is_some_and(|roles| roles.contains(&RoleId::new(role)))
    }

    pub fn notice_titles(&self) -> Vec<String> {
        self.notices
            .lock()
            .unwrap()
            .iter()
            .map(|(_, n)| n.title.clone())
            .collect()
    }
}

#[async_trait]
impl Platform for MockPlatform {
    fn id(&self) -> &str {
        "mock"
    }

    async fn actor_roles(&self, actor: &ActorId) -> Result<HashSet<RoleId>> {
        Ok(self
            .member_roles
            .lock()
            .unwrap()
            .get(actor)
            .cloned()
            .unwrap_or_default())
    }

    async fn role_exists(&self, role: &RoleId) -> Result<bool> {
        Ok(self.roles.lock().unwrap().contains(role))
    }

    async fn grant_role(&self, actor: &ActorId, role: &RoleId) -> Result<()> {
        if self.deny_grants {
            return Err(Error::external(
                "add member role",
                std::io::Error::other("403 Forbidden: Missing Permissions"),
            ));
        }
        if !self.roles.lock().unwrap().contains(role) {
            return Err(Error::role_not_found(role));
        }
        self.member_roles
            .lock()
            .unwrap()
            .entry(actor.clone())
            .or_default()
            .insert(role.clone());
        Ok(())
    }

    async fn send_notice(&self, channel: &ChannelId, notice: &Notice) -> Result<()> {
        if self.missing_channels.lock().unwrap().contains(channel) {
            return Err(Error::channel_unavailable(channel));
        }
        self.notices
            .lock()
            .unwrap()
            .push((channel.clone(), notice.clone()));
        Ok(())
    }

    async fn purge_messages(&self, channel: &ChannelId, limit: u64) -> Result<u64> {
        let mut messages = self.messages.lock().unwrap();
        let available = messages.entry(channel.clone()).or_default();
        let deleted = limit.min(*available);
        *available -= deleted;
        Ok(deleted)
    }
}

/// Handlers over a temporary data directory.
pub struct Harness {
    pub dir: tempfile::TempDir,
    pub handlers: CommandHandlers,
}

impl Harness {
    /// Fresh data directory with `admins.json` naming [`ADMIN_ROLE`].
    pub fn new() -> Self {
        Self::build(true, PermissionsConfig::default(), |_| {})
    }

    /// Fresh data directory without `admins.json`.
    pub fn without_admins() -> Self {
        Self::build(false, PermissionsConfig::default(), |_| {})
    }

    pub fn build(
        with_admins: bool,
        permissions: PermissionsConfig,
        seed: impl FnOnce(&std::path::Path),
    ) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("data");
        std::fs::create_dir_all(&data).unwrap();
        if with_admins {
            std::fs::write(
                data.join("admins.json"),
                format!("{{\"admin_role_id\": {ADMIN_ROLE}}}"),
            )
            .unwrap();
        }
        seed(&data);

        let store = ConfigStore::new(&data);
        let settings = Arc::new(BotSettings::load(store.clone(), &permissions));
        let registry = Arc::new(LicenseRegistry::load(store));
        let handlers = CommandHandlers::new(settings, registry);
        Self { dir, handlers }
    }

    /// The data directory the handlers read and write.
    pub fn data_dir(&self) -> std::path::PathBuf {
        self.dir.path().join("data")
    }

    /// Replace the data directory with a plain file so every write fails,
    /// whatever the user's privileges.
    pub fn break_storage(&self) {
        std::fs::remove_dir_all(self.data_dir()).unwrap();
        std::fs::write(self.data_dir(), b"").unwrap();
    }

    /// Undo [`Harness::break_storage`]. The next write recreates the directory.
    pub fn restore_storage(&self) {
        std::fs::remove_file(self.data_dir()).unwrap();
    }

    pub async fn run(&self, platform: &MockPlatform, actor: &str, command: Command) -> Reply {
        let invocation = Invocation {
            actor: Actor {
                id: ActorId::new(actor),
                name: format!("user-{actor}"),
            },
            channel: ChannelId::new(COMMAND_CHANNEL),
            command_message: false,
        };
        self.handlers.dispatch(platform, &invocation, command).await
    }

    pub fn read_json(&self, name: &str) -> serde_json::Value {
        let raw = std::fs::read_to_string(self.data_dir().join(name)).unwrap();
        serde_json::from_str(&raw).unwrap()
    }
}

pub fn add(key: &str, role_id: &str) -> Command {
    Command::AddLicense {
        key: key.into(),
        role_id: role_id.into(),
    }
}

pub fn remove(key: &str) -> Command {
    Command::RemoveLicense { key: key.into() }
}

pub fn redeem(key: &str) -> Command {
    Command::Redeem { key: key.into() }
}
