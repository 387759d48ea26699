//! License keys and their single-use redemption.
//!
//! A license key maps to a platform role. Redeeming a key consumes it for
//! good: the used-key set only ever grows, and survives removal and re-adding
//! of the same key string.

pub mod error;
pub mod registry;

pub use {
    error::{Error, Result},
    registry::{License, LicenseRegistry, Redemption},
};
