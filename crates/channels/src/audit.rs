//! Best-effort audit trail for privileged actions.
//!
//! Every record goes to the tracing stream. When a log channel is configured
//! the record is also posted there; a failed post is logged and dropped.

use std::sync::Arc;

use {
    keyward_config::BotSettings,
    tracing::{info, warn},
};

use crate::plugin::{Notice, Platform};

/// One audited action. Not persisted beyond the log sinks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRecord {
    pub action_type: String,
    pub details: String,
    pub actor_name: String,
    /// Unix seconds.
    pub recorded_at: i64,
}

impl ActionRecord {
    pub fn new(
        action_type: impl Into<String>,
        details: impl Into<String>,
        actor_name: impl Into<String>,
    ) -> Self {
        let secs = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        let recorded_at = unix_seconds(secs);
        Self {
            action_type: action_type.into(),
            details: details.into(),
            actor_name: actor_name.into(),
            recorded_at,
        }
    }

    /// Single-line form used for console output.
    pub fn line(&self) -> String {
        format!(
            "{} | {} | Action performed by: {}",
            self.action_type, self.details, self.actor_name
        )
    }

    pub fn notice(&self) -> Notice {
        Notice {
            title: format!("Log: {}", self.action_type),
            body: self.details.clone(),
            footer: Some(format!("Action performed by: {}", self.actor_name)),
        }
    }
}

/// Clamp epoch seconds into the signed range.
fn unix_seconds(secs: u64) -> i64 {
    i64::try_from(secs).unwrap_or(i64::MAX)
}

pub struct AuditLog {
    settings: Arc<BotSettings>,
}

impl AuditLog {
    pub fn new(settings: Arc<BotSettings>) -> Self {
        Self { settings }
    }

    /// Record an action. Never fails.
    pub async fn record(
        &self,
        platform: &dyn Platform,
        action_type: &str,
        details: impl Into<String>,
        actor_name: &str,
    ) -> ActionRecord {
        let record = ActionRecord::new(action_type, details, actor_name);
        info!(
            action_type = %record.action_type,
            details = %record.details,
            actor = %record.actor_name,
            "{}",
            record.line()
        );

        if let Some(channel) = self.settings.log_channel().await
            && let Err(e) = platform.send_notice(&channel, &record.notice()).await
        {
            warn!(
                platform = platform.id(),
                channel_id = %channel,
                action_type = %record.action_type,
                error = %e,
                "failed to post audit entry to log channel"
            );
        }

        record
    }
}
