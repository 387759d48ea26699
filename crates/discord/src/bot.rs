use std::sync::Arc;

use {
    secrecy::ExposeSecret,
    serenity::Client,
    tracing::{info, warn},
};

use {keyward_commands::CommandHandlers, keyward_config::DiscordConfig};

use crate::handler::DiscordHandler;

/// Reload the tables from disk each time the process receives SIGHUP.
#[cfg(unix)]
fn reload_on_hangup(handlers: Arc<CommandHandlers>) {
    use tokio::signal::unix::{SignalKind, signal};

    let mut hangup = match signal(SignalKind::hangup()) {
        Ok(hangup) => hangup,
        Err(e) => {
            warn!(error = %e, "failed to listen for SIGHUP, table reload disabled");
            return;
        },
    };
    tokio::spawn(async move {
        while hangup.recv().await.is_some() {
            info!("SIGHUP received, reloading tables");
            handlers.reload().await;
        }
    });
}

/// Connect to Discord and process interactions until the gateway closes or
/// the process receives Ctrl-C.
pub async fn run(config: &DiscordConfig, handlers: Arc<CommandHandlers>) -> anyhow::Result<()> {
    if !config.has_token() {
        anyhow::bail!(
            "no discord token configured; set [discord] token in keyward.toml or {}",
            keyward_config::loader::TOKEN_ENV
        );
    }

    #[cfg(unix)]
    reload_on_hangup(Arc::clone(&handlers));

    let handler = DiscordHandler {
        guild_id: config.guild_id,
        handlers,
    };
    let mut client = Client::builder(config.token.expose_secret(), DiscordHandler::intents())
        .event_handler(handler)
        .await?;

    let shard_manager = Arc::clone(&client.shard_manager);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("shutdown requested, closing discord connection");
                shard_manager.shutdown_all().await;
            },
            Err(e) => warn!(error = %e, "failed to listen for ctrl-c"),
        }
    });

    info!("connecting to discord");
    client.start().await?;
    Ok(())
}
