//! JSON-backed tables in the data directory.
//!
//! Each table is one `<name>.json` file. Reads never fail the caller: a
//! missing or unreadable file yields the table's empty value. Writes go to a
//! temp file in the same directory which is then renamed over the target, so
//! readers only ever see a complete file.

use std::{
    io::Write,
    path::{Path, PathBuf},
};

use {
    keyward_common::{ChannelId, RoleId},
    serde::{Deserialize, Serialize, de::DeserializeOwned},
    tracing::{debug, error, warn},
};

use crate::{Error, Result};

pub const ADMINS: &str = "admins";
pub const LOG_CHANNEL: &str = "log_channel";
pub const LICENSES: &str = "licenses";
pub const USED_KEYS: &str = "used_keys";

/// `admins.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminsFile {
    pub admin_role_id: RoleId,
}

/// `log_channel.json`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogChannelFile {
    #[serde(default)]
    pub channel_id: Option<ChannelId>,
}

/// One row of `licenses.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseEntry {
    pub key: String,
    pub role_id: RoleId,
}

/// `licenses.json`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicensesTable {
    #[serde(default)]
    pub keys: Vec<LicenseEntry>,
}

/// `used_keys.json`. Set semantics; order is not significant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsedKeysTable {
    #[serde(default)]
    pub keys: Vec<String>,
}

enum ReadFailure {
    Missing,
    Unreadable(String),
}

/// File-based store for the bot's tables.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    dir: PathBuf,
}

impl ConfigStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing table `name`.
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }

    fn read<T: DeserializeOwned>(&self, name: &str) -> std::result::Result<T, ReadFailure> {
        let path = self.path(name);
        let data = match std::fs::read_to_string(&path) {
            Ok(d) => d,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ReadFailure::Missing);
            },
            Err(e) => return Err(ReadFailure::Unreadable(e.to_string())),
        };
        serde_json::from_str(&data).map_err(|e| ReadFailure::Unreadable(e.to_string()))
    }

    /// Load table `name`, falling back to its empty value.
    pub fn load_table<T: DeserializeOwned + Default>(&self, name: &str) -> T {
        match self.read(name) {
            Ok(table) => {
                debug!(table = name, "loaded table");
                table
            },
            Err(ReadFailure::Missing) => {
                warn!(
                    table = name,
                    path = %self.path(name).display(),
                    "table file not found, returning empty data"
                );
                T::default()
            },
            Err(ReadFailure::Unreadable(reason)) => {
                error!(
                    table = name,
                    path = %self.path(name).display(),
                    error = %reason,
                    "table file unreadable, treating as empty"
                );
                T::default()
            },
        }
    }

    /// Replace table `name` on disk.
    pub fn save_table<T: Serialize>(&self, name: &str, table: &T) -> Result<()> {
        let path = self.path(name);
        std::fs::create_dir_all(&self.dir).map_err(|e| Error::write(&self.dir, e))?;

        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        table.serialize(&mut ser)?;
        buf.push(b'\n');

        let mut tmp =
            tempfile::NamedTempFile::new_in(&self.dir).map_err(|e| Error::write(&path, e))?;
        tmp.write_all(&buf).map_err(|e| Error::write(&path, e))?;
        tmp.as_file()
            .sync_all()
            .map_err(|e| Error::write(&path, e))?;
        tmp.persist(&path)
            .map_err(|e| Error::write(&path, e.error))?;

        debug!(table = name, bytes = buf.len(), "saved table");
        Ok(())
    }

    /// Read the admin role from `admins.json`.
    ///
    /// The file is required for admin commands to work at all; when it is
    /// missing or malformed no one is admin, and the condition is logged at
    /// error level rather than aborting startup.
    pub fn load_admin_role(&self) -> Option<RoleId> {
        match self.read::<AdminsFile>(ADMINS) {
            Ok(file) => Some(file.admin_role_id),
            Err(ReadFailure::Missing) => {
                error!(
                    path = %self.path(ADMINS).display(),
                    "admins file not found; create it with {{\"admin_role_id\": ...}} to enable admin commands"
                );
                None
            },
            Err(ReadFailure::Unreadable(reason)) => {
                error!(
                    path = %self.path(ADMINS).display(),
                    error = %reason,
                    "admins file unreadable; admin commands are disabled"
                );
                None
            },
        }
    }

    pub fn load_log_channel(&self) -> Option<ChannelId> {
        self.load_table::<LogChannelFile>(LOG_CHANNEL).channel_id
    }

    pub fn save_log_channel(&self, channel: Option<&ChannelId>) -> Result<()> {
        self.save_table(LOG_CHANNEL, &LogChannelFile {
            channel_id: channel.cloned(),
        })
    }
}
