//! Offline license administration.
//!
//! Operates directly on the data directory. Only run it while the bot is
//! stopped, or follow up with a bot restart: a running bot keeps its own
//! in-memory copy of the tables.

use {clap::Subcommand, keyward_common::RoleId, keyward_licenses::LicenseRegistry, tracing::info};

#[derive(Subcommand)]
pub enum LicenseAction {
    /// List all license keys and whether they were redeemed.
    List,
    /// Add a license key bound to a role.
    Add {
        /// License key (case-sensitive).
        key: String,
        /// Numeric id of the role granted on redemption.
        role_id: String,
    },
    /// Remove a license key. Its redemption record is kept.
    Remove {
        /// License key (case-sensitive).
        key: String,
    },
}

pub async fn handle_licenses(
    action: LicenseAction,
    registry: &LicenseRegistry,
) -> anyhow::Result<()> {
    match action {
        LicenseAction::List => {
            let licenses = registry.list().await;
            if licenses.is_empty() {
                println!("No license keys.");
            }
            for license in &licenses {
                let state = if registry.is_redeemed(&license.key).await {
                    "redeemed"
                } else {
                    "available"
                };
                println!("  {}  role {}  [{state}]", license.key, license.role_id);
            }
        },
        LicenseAction::Add { key, role_id } => {
            let role_id = RoleId::parse(&role_id)?;
            let license = registry.add(&key, role_id).await?;
            info!(key = %license.key, role_id = %license.role_id, "license added from cli");
            println!(
                "License key {} added with role ID {}.",
                license.key, license.role_id
            );
        },
        LicenseAction::Remove { key } => {
            let license = registry.remove(&key).await?;
            info!(key = %license.key, "license removed from cli");
            println!("License key {} removed.", license.key);
        },
    }
    Ok(())
}
