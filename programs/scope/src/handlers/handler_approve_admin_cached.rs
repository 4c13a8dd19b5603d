use solana_pubkey::Pubkey;
use tracing::{info, warn};

use crate::{states::configuration::Configuration, ScopeError, ScopeResult};

/// Second step of an admin rotation: the cached admin signs to take over the feed.
pub fn process(
    admin_cached: &Pubkey,
    configuration: &mut Configuration,
    feed_name: &str,
) -> ScopeResult<()> {
    if *admin_cached == Pubkey::default() || *admin_cached != configuration.admin_cached {
        warn!("Signer {admin_cached} is not the cached admin of feed {feed_name}");
        return Err(ScopeError::Unauthorized);
    }

    info!(
        "old admin {} new admin {}, feed_name {}",
        configuration.admin, configuration.admin_cached, feed_name
    );

    configuration.admin = configuration.admin_cached;

    Ok(())
}
