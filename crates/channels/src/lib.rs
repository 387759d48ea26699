//! The chat-platform boundary.
//!
//! Platform adapters (Discord, tests) implement [`Platform`]; the rest of the
//! bot only sees role, channel and actor ids. Also home to the admin
//! permission gate and the audit log, which sit directly on that boundary.

pub mod audit;
pub mod error;
pub mod gating;
pub mod plugin;

pub use {
    audit::{ActionRecord, AuditLog},
    error::{Error, Result},
    plugin::{Notice, Platform},
};
