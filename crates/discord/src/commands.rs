//! Slash command definitions and option parsing.

use std::collections::HashMap;

use {
    keyward_commands::Command,
    keyward_common::ChannelId,
    serenity::all::{
        ChannelType, CommandData, CommandDataOptionValue, CommandOptionType, CreateCommand,
        CreateCommandOption,
    },
};

/// Option value, detached from serenity's types so parsing is testable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    Text(String),
    Integer(i64),
    Channel(u64),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unknown command /{0}")]
    UnknownCommand(String),

    #[error("missing or invalid option `{0}`")]
    Option(&'static str),
}

/// The slash commands the bot registers.
pub fn definitions() -> Vec<CreateCommand> {
    vec![
        CreateCommand::new("clear")
            .description("Clear a specified number of messages.")
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::Integer,
                    "amount",
                    "Number of messages to delete",
                )
                .required(true),
            ),
        CreateCommand::new("setup_log_channel")
            .description("Set the log channel for the bot.")
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::Channel,
                    "channel",
                    "Channel that receives audit entries",
                )
                .channel_types(vec![ChannelType::Text])
                .required(true),
            ),
        CreateCommand::new("add_license")
            .description("Add a new license key with a role ID.")
            .add_option(
                CreateCommandOption::new(CommandOptionType::String, "key", "License key")
                    .required(true),
            )
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::String,
                    "role_id",
                    "Role granted on redemption",
                )
                .required(true),
            ),
        CreateCommand::new("remove_license")
            .description("Remove an existing license key.")
            .add_option(
                CreateCommandOption::new(CommandOptionType::String, "key", "License key")
                    .required(true),
            ),
        CreateCommand::new("redeem")
            .description("Redeem a valid license key.")
            .add_option(
                CreateCommandOption::new(CommandOptionType::String, "key", "License key")
                    .required(true),
            ),
    ]
}

/// Flatten serenity's option list into name → value.
pub fn collect_options(data: &CommandData) -> HashMap<String, OptionValue> {
    data.options
        .iter()
        .filter_map(|opt| {
            let value = match &opt.value {
                CommandDataOptionValue::String(s) => OptionValue::Text(s.clone()),
                CommandDataOptionValue::Integer(i) => OptionValue::Integer(*i),
                CommandDataOptionValue::Channel(id) => OptionValue::Channel(id.get()),
                _ => return None,
            };
            Some((opt.name.clone(), value))
        })
        .collect()
}

pub fn parse(name: &str, options: &HashMap<String, OptionValue>) -> Result<Command, ParseError> {
    let text = |key: &'static str| match options.get(key) {
        Some(OptionValue::Text(s)) => Ok(s.clone()),
        _ => Err(ParseError::Option(key)),
    };

    match name {
        "clear" => match options.get("amount") {
            Some(OptionValue::Integer(amount)) => Ok(Command::Clear { amount: *amount }),
            _ => Err(ParseError::Option("amount")),
        },
        "setup_log_channel" => match options.get("channel") {
            Some(OptionValue::Channel(id)) => Ok(Command::SetupLogChannel {
                channel: ChannelId::from(*id),
            }),
            _ => Err(ParseError::Option("channel")),
        },
        "add_license" => Ok(Command::AddLicense {
            key: text("key")?,
            role_id: text("role_id")?,
        }),
        "remove_license" => Ok(Command::RemoveLicense { key: text("key")? }),
        "redeem" => Ok(Command::Redeem { key: text("key")? }),
        other => Err(ParseError::UnknownCommand(other.to_string())),
    }
}
