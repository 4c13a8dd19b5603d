use solana_pubkey::Pubkey;
use tracing::info;

use crate::{
    feed::ScopeFeed,
    utils::pdas::{feed_account_pubkey, seeds},
    Configuration, OracleMappings, OraclePrices, OracleTwaps, ScopeError, ScopeResult,
    TokenMetadatas,
};

/// Create an empty feed administered by `admin`.
///
/// Every registry starts zeroed: no mapping, no price, no TWAP sample and no metadata.
pub fn process(admin: Pubkey, feed_name: &str) -> ScopeResult<ScopeFeed> {
    if admin == Pubkey::default() {
        return Err(ScopeError::Unauthorized);
    }

    let oracle_mappings_pbk = feed_account_pubkey(seeds::ORACLE_MAPPINGS, feed_name);
    let oracle_prices_pbk = feed_account_pubkey(seeds::ORACLE_PRICES, feed_name);
    let oracle_twaps_pbk = feed_account_pubkey(seeds::ORACLE_TWAPS, feed_name);
    let tokens_metadata_pbk = feed_account_pubkey(seeds::TOKEN_METADATAS, feed_name);

    // Initialize oracle mapping account
    let oracle_mappings = bytemuck::zeroed_box::<OracleMappings>();

    // Initialize oracle price account
    let mut oracle_prices = bytemuck::zeroed_box::<OraclePrices>();
    oracle_prices.oracle_mappings = oracle_mappings_pbk;

    // Initialize oracle twap account
    let mut oracle_twaps = bytemuck::zeroed_box::<OracleTwaps>();
    oracle_twaps.oracle_prices = oracle_prices_pbk;
    oracle_twaps.oracle_mappings = oracle_mappings_pbk;

    let tokens_metadata = bytemuck::zeroed_box::<TokenMetadatas>();

    // Initialize configuration account
    let configuration = Configuration::new(
        admin,
        oracle_mappings_pbk,
        oracle_prices_pbk,
        tokens_metadata_pbk,
        oracle_twaps_pbk,
    );

    info!("Initialized feed {feed_name} with admin {admin}");

    Ok(ScopeFeed {
        feed_name: feed_name.to_owned(),
        configuration,
        oracle_mappings,
        oracle_prices,
        oracle_twaps,
        tokens_metadata,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registries_reference_each_other() {
        let admin = Pubkey::new_unique();
        let feed = process(admin, "hubble").unwrap();
        assert_eq!(feed.configuration.admin, admin);
        assert_eq!(
            feed.configuration.oracle_prices,
            feed_account_pubkey(seeds::ORACLE_PRICES, "hubble")
        );
        assert_eq!(
            feed.oracle_prices.oracle_mappings,
            feed.configuration.oracle_mappings
        );
        assert_eq!(
            feed.oracle_twaps.oracle_prices,
            feed.configuration.oracle_prices
        );
        assert_eq!(feed.configuration.admin_cached, Pubkey::default());
        assert!(!feed.oracle_mappings.is_entry_used(0));
    }

    #[test]
    fn default_admin_is_rejected() {
        assert!(matches!(
            process(Pubkey::default(), "hubble"),
            Err(ScopeError::Unauthorized)
        ));
    }
}
