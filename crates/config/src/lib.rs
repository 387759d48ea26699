//! Configuration loading and the JSON-backed tables the bot persists.
//!
//! Bot config: `keyward.toml`, `keyward.yaml`, or `keyward.json`,
//! searched in `./` then `~/.config/keyward/`.
//!
//! Runtime tables (`admins.json`, `log_channel.json`, `licenses.json`,
//! `used_keys.json`) live in the data directory, `./config` by default.

pub mod error;
pub mod loader;
pub mod schema;
pub mod settings;
pub mod store;

pub use {
    error::{Error, Result},
    loader::{apply_env_overrides, config_dir, discover_and_load, load_config},
    schema::{DiscordConfig, KeywardConfig, PermissionsConfig},
    settings::BotSettings,
    store::{
        AdminsFile, ConfigStore, LicenseEntry, LicensesTable, LogChannelFile, UsedKeysTable,
    },
};
