//! Platform id types and their parse error, shared across all keyward crates.

pub mod error;
pub mod types;

pub use {
    error::{Error, Result},
    types::{ActorId, ChannelId, RoleId},
};
