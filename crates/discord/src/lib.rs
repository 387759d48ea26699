//! Discord adapter.
//!
//! Registers the bot's slash commands, turns interactions into
//! [`keyward_commands::Command`]s and implements
//! [`keyward_channels::Platform`] on top of the serenity HTTP client.

pub mod bot;
pub mod commands;
pub mod handler;
pub mod platform;

pub use {bot::run, handler::DiscordHandler, platform::DiscordGuild};
