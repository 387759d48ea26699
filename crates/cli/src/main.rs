mod license_commands;

use std::{path::PathBuf, sync::Arc};

use {
    clap::{Parser, Subcommand},
    keyward_commands::CommandHandlers,
    keyward_config::{BotSettings, ConfigStore, KeywardConfig},
    keyward_licenses::LicenseRegistry,
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(name = "keyward", about = "License-key redemption bot for Discord")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Config file (overrides discovery of keyward.toml).
    #[arg(long, global = true, env = "KEYWARD_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding the JSON tables (overrides config value).
    #[arg(long, global = true, env = "KEYWARD_DATA_DIR")]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect to Discord and serve commands (default when no subcommand is provided).
    Run,
    /// License key management.
    Licenses {
        #[command(subcommand)]
        action: license_commands::LicenseAction,
    },
    /// Show what the bot will load from the data directory.
    Check,
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<KeywardConfig> {
    let mut config = match &cli.config {
        Some(path) => keyward_config::load_config(path)?,
        None => keyward_config::discover_and_load(),
    };
    keyward_config::apply_env_overrides(&mut config);
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    Ok(config)
}

async fn check(config: &KeywardConfig, store: ConfigStore) -> anyhow::Result<()> {
    let settings = BotSettings::load(store.clone(), &config.permissions);
    let registry = LicenseRegistry::load(store.clone());
    let licenses = registry.list().await;

    println!("Data directory: {}", store.dir().display());
    match settings.admin_role().await {
        Some(role) => println!("Admin role:     {role}"),
        None => println!("Admin role:     not configured (admin commands disabled)"),
    }
    match settings.log_channel().await {
        Some(channel) => println!("Log channel:    {channel}"),
        None => println!("Log channel:    not configured (console only)"),
    }
    println!("Licenses:       {}", licenses.len());
    println!("Redeemed keys:  {}", registry.redeemed_count().await);
    println!(
        "Discord token:  {}",
        if config.discord.has_token() {
            "configured"
        } else {
            "missing"
        }
    );
    if config.permissions.open_log_channel_setup {
        println!("Note: setup_log_channel is open to every member.");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "keyward starting");

    let config = load_config(&cli)?;
    let store = ConfigStore::new(&config.data_dir);

    match cli.command {
        None | Some(Commands::Run) => {
            let settings = Arc::new(BotSettings::load(store.clone(), &config.permissions));
            let registry = Arc::new(LicenseRegistry::load(store));
            let handlers = Arc::new(CommandHandlers::new(settings, registry));
            keyward_discord::run(&config.discord, handlers).await
        },
        Some(Commands::Licenses { action }) => {
            let registry = LicenseRegistry::load(store);
            license_commands::handle_licenses(action, &registry).await
        },
        Some(Commands::Check) => check(&config, store).await,
    }
}
