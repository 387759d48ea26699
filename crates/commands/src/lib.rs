//! Command handlers: turn a platform-neutral command invocation into
//! registry and settings calls, and always answer with exactly one [`Reply`].

pub mod command;
pub mod error;
pub mod handlers;
pub mod reply;

pub use {
    command::{Actor, AdminAction, Command, Invocation},
    error::CommandError,
    handlers::CommandHandlers,
    reply::{Outcome, Reply},
};
