use std::path::{Path, PathBuf};

use {
    secrecy::Secret,
    tracing::{debug, warn},
};

use crate::schema::KeywardConfig;

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &[
    "keyward.toml",
    "keyward.yaml",
    "keyward.yml",
    "keyward.json",
];

/// Environment variable that overrides `discord.token`.
pub const TOKEN_ENV: &str = "KEYWARD_DISCORD_TOKEN";

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> anyhow::Result<KeywardConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    parse_config(&raw, path)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./keyward.{toml,yaml,yml,json}` (project-local)
/// 2. `~/.config/keyward/keyward.{toml,yaml,yml,json}` (user-global)
///
/// Returns `KeywardConfig::default()` if no config file is found or the one
/// found does not parse.
pub fn discover_and_load() -> KeywardConfig {
    if let Some(path) = find_config_file() {
        debug!(path = %path.display(), "loading config");
        match load_config(&path) {
            Ok(cfg) => return cfg,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            },
        }
    } else {
        debug!("no config file found, using defaults");
    }
    KeywardConfig::default()
}

/// Apply environment overrides on top of a loaded config.
pub fn apply_env_overrides(config: &mut KeywardConfig) {
    apply_env_overrides_with(config, |name| std::env::var(name).ok());
}

fn apply_env_overrides_with(config: &mut KeywardConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(token) = lookup(TOKEN_ENV).filter(|t| !t.trim().is_empty()) {
        debug!(var = TOKEN_ENV, "discord token taken from environment");
        config.discord.token = Secret::new(token);
    }
}

fn find_config_file() -> Option<PathBuf> {
    for name in CONFIG_FILENAMES {
        let p = PathBuf::from(name);
        if p.exists() {
            return Some(p);
        }
    }

    let config_dir = config_dir()?;
    CONFIG_FILENAMES
        .iter()
        .map(|name| config_dir.join(name))
        .find(|p| p.exists())
}

/// Returns the user-global config directory (`~/.config/keyward/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "keyward").map(|d| d.config_dir().to_path_buf())
}

fn parse_config(raw: &str, path: &Path) -> anyhow::Result<KeywardConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        _ => anyhow::bail!("unsupported config format: .{ext}"),
    }
}
