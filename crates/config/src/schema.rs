/// Bot configuration schema (data directory, Discord connection, permissions).
use std::path::PathBuf;

use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
};

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywardConfig {
    /// Directory holding the JSON tables. Relative paths resolve against the
    /// working directory.
    pub data_dir: PathBuf,
    pub discord: DiscordConfig,
    pub permissions: PermissionsConfig,
}

impl Default for KeywardConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("config"),
            discord: DiscordConfig::default(),
            permissions: PermissionsConfig::default(),
        }
    }
}

/// Discord bot connection settings.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscordConfig {
    /// Bot token from the Discord developer portal.
    #[serde(serialize_with = "serialize_secret")]
    pub token: Secret<String>,

    /// Register slash commands on this guild only. Guild commands show up
    /// immediately; global commands can take up to an hour to propagate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<u64>,
}

impl DiscordConfig {
    pub fn has_token(&self) -> bool {
        !self.token.expose_secret().trim().is_empty()
    }
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            token: Secret::new(String::new()),
            guild_id: None,
        }
    }
}

impl std::fmt::Debug for DiscordConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordConfig")
            .field("token", &"[REDACTED]")
            .field("guild_id", &self.guild_id)
            .finish()
    }
}

fn serialize_secret<S: serde::Serializer>(
    secret: &Secret<String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

/// Command permission overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PermissionsConfig {
    /// Let anyone run `setup_log_channel`. Off by default: every other
    /// command that changes bot state requires the admin role.
    pub open_log_channel_setup: bool,
}
