//! Discord event handler for serenity.
//!
//! Registers slash commands once the gateway is ready and routes command
//! interactions to the shared [`CommandHandlers`].

use std::sync::Arc;

use {
    serenity::{
        all::{
            Colour, Command as SlashCommand, CommandInteraction, Context, CreateEmbed,
            CreateInteractionResponse, CreateInteractionResponseMessage, EditInteractionResponse,
            EventHandler, GatewayIntents, GuildId, Interaction, Ready,
        },
        async_trait,
    },
    tracing::{debug, info, warn},
};

use {
    keyward_commands::{Actor, AdminAction, Command, CommandHandlers, Invocation, Outcome, Reply},
    keyward_common::{ActorId, ChannelId},
};

use crate::{commands, platform::DiscordGuild};

/// Handler for Discord gateway events.
pub struct DiscordHandler {
    /// Register commands on this guild instead of globally.
    pub guild_id: Option<u64>,
    pub handlers: Arc<CommandHandlers>,
}

impl DiscordHandler {
    /// Gateway intents the bot needs. Interactions carry the invoking
    /// member's roles, so no privileged intents are required.
    pub fn intents() -> GatewayIntents {
        GatewayIntents::GUILDS
    }

    async fn register_commands(&self, ctx: &Context) {
        let definitions = commands::definitions();
        let result = match self.guild_id.filter(|id| *id != 0) {
            Some(id) => GuildId::new(id).set_commands(&ctx.http, definitions).await,
            None => SlashCommand::set_global_commands(&ctx.http, definitions).await,
        };
        match result {
            Ok(registered) => info!(
                count = registered.len(),
                guild_id = ?self.guild_id,
                "slash commands registered"
            ),
            Err(e) => warn!(error = %e, "failed to register slash commands"),
        }
    }

    async fn handle_command(&self, ctx: &Context, interaction: &CommandInteraction) {
        let name = interaction.data.name.as_str();
        let Some(guild_id) = interaction.guild_id else {
            let reply = Reply::text(Outcome::InvalidInput, "This command can only be used in a server.")
                .ephemeral();
            respond(ctx, interaction, &reply).await;
            return;
        };

        let options = commands::collect_options(&interaction.data);
        let command = match commands::parse(name, &options) {
            Ok(command) => command,
            Err(e) => {
                warn!(command = name, error = %e, "could not parse slash command");
                let reply = Reply::text(Outcome::InvalidInput, e.to_string()).ephemeral();
                respond(ctx, interaction, &reply).await;
                return;
            },
        };

        let mut platform = DiscordGuild::new(Arc::clone(&ctx.http), guild_id);
        if let Some(member) = &interaction.member {
            platform = platform.with_invoker(interaction.user.id, &member.roles);
        }

        let invocation = Invocation {
            actor: Actor {
                id: ActorId::from(interaction.user.id.get()),
                name: interaction.user.name.clone(),
            },
            channel: ChannelId::from(interaction.channel_id.get()),
            command_message: false,
        };

        // Purging can take longer than the interaction acknowledgement window,
        // so `clear` is deferred privately. Denials are answered before that,
        // in the open.
        let deferred = matches!(command, Command::Clear { .. });
        if deferred {
            if let Err(denied) = self
                .handlers
                .authorize(&platform, &invocation.actor, AdminAction::ClearChat)
                .await
            {
                debug!(command = name, reason = %denied, "clear denied before defer");
                respond(ctx, interaction, &denied.into_reply()).await;
                return;
            }
            if let Err(e) = interaction.defer_ephemeral(&ctx.http).await {
                warn!(command = name, error = %e, "failed to defer interaction");
            }
        }

        let reply = self
            .handlers
            .dispatch(&platform, &invocation, command)
            .await;
        debug!(command = name, outcome = ?reply.outcome, "command finished");

        if deferred {
            let edit = match &reply.title {
                Some(_) => EditInteractionResponse::new().embed(reply_embed(&reply)),
                None => EditInteractionResponse::new().content(&reply.content),
            };
            if let Err(e) = interaction.edit_response(&ctx.http, edit).await {
                warn!(command = name, error = %e, "failed to send command response");
            }
        } else {
            respond(ctx, interaction, &reply).await;
        }
    }
}

fn reply_embed(reply: &Reply) -> CreateEmbed {
    let colour = if reply.is_success() {
        Colour::DARK_GREEN
    } else {
        Colour::RED
    };
    CreateEmbed::new()
        .title(reply.title.as_deref().unwrap_or_default())
        .description(&reply.content)
        .colour(colour)
}

async fn respond(ctx: &Context, interaction: &CommandInteraction, reply: &Reply) {
    let mut message = CreateInteractionResponseMessage::new().ephemeral(reply.ephemeral);
    message = match &reply.title {
        Some(_) => message.embed(reply_embed(reply)),
        None => message.content(&reply.content),
    };
    if let Err(e) = interaction
        .create_response(&ctx.http, CreateInteractionResponse::Message(message))
        .await
    {
        warn!(
            command = %interaction.data.name,
            error = %e,
            "failed to send command response"
        );
    }
}

#[async_trait]
impl EventHandler for DiscordHandler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!(
            bot_name = %ready.user.name,
            guilds = ready.guilds.len(),
            "logged in to discord"
        );
        self.register_commands(&ctx).await;
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        if let Interaction::Command(command) = interaction {
            self.handle_command(&ctx, &command).await;
        }
    }
}
