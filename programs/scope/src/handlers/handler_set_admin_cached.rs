use solana_pubkey::Pubkey;
use tracing::info;

use crate::{AdminCap, Configuration, ScopeResult};

/// First step of an admin rotation: record the future admin.
pub fn process(
    cap: &AdminCap,
    configuration: &mut Configuration,
    new_admin: Pubkey,
    feed_name: &str,
) -> ScopeResult<()> {
    configuration.check_cap(cap)?;

    info!(
        "setting admin_cached to {} feed_name {}",
        new_admin, feed_name
    );

    configuration.admin_cached = new_admin;

    Ok(())
}
