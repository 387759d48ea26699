use std::fmt;

use keyward_common::{ActorId, ChannelId};

/// Who ran a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: ActorId,
    /// Display name, used in audit entries.
    pub name: String,
}

/// Context of one command invocation.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub actor: Actor,
    /// Channel the command was used in.
    pub channel: ChannelId,
    /// The command itself was posted as a regular channel message (prefix
    /// commands). `clear` deletes that message too. Slash commands leave no
    /// message behind.
    pub command_message: bool,
}

/// The bot's command surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Clear { amount: i64 },
    SetupLogChannel { channel: ChannelId },
    AddLicense { key: String, role_id: String },
    RemoveLicense { key: String },
    Redeem { key: String },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Clear { .. } => "clear",
            Self::SetupLogChannel { .. } => "setup_log_channel",
            Self::AddLicense { .. } => "add_license",
            Self::RemoveLicense { .. } => "remove_license",
            Self::Redeem { .. } => "redeem",
        }
    }
}

/// Admin-only capabilities, named the way the denial reply phrases them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminAction {
    ClearChat,
    SetLogChannel,
    AddLicense,
    RemoveLicense,
}

impl fmt::Display for AdminAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClearChat => write!(f, "clear the chat"),
            Self::SetLogChannel => write!(f, "set the log channel"),
            Self::AddLicense => write!(f, "add a license"),
            Self::RemoveLicense => write!(f, "remove a license"),
        }
    }
}
