use solana_pubkey::Pubkey;
use tracing::{info, warn};

use crate::{
    oracles::{validate_oracle_account, OracleType},
    AccountInfo, AdminCap, Configuration, MappingOptions, OracleMappings, ScopeError, ScopeResult,
};

/// Map `token` to an upstream price account.
///
/// The admin is trusted to provide a trustable account, only basic sanity checks are done based
/// on the oracle type. Without account (or with the default key) the mapping is removed.
pub fn process(
    cap: &AdminCap,
    configuration: &Configuration,
    oracle_mappings: &mut OracleMappings,
    token: usize,
    price_type: OracleType,
    price_info: Option<&AccountInfo>,
    options: MappingOptions,
) -> ScopeResult<()> {
    configuration.check_cap(cap)?;

    info!(
        "UpdateOracleMapping, token: {}, price_type: {}, twap_enabled: {}, twap_window: {:?}, ref_price: {:?}",
        token, price_type, options.twap_enabled, options.twap_window, options.ref_price
    );

    match price_info {
        Some(price_info_acc) if *price_info_acc.key != Pubkey::default() => {
            check_twap_account(configuration, price_type, price_info_acc.key)?;
            validate_oracle_account(price_type, price_info_acc)?;
            // Every check succeeded, replace current with new
            oracle_mappings.set_entry_mapping(token, *price_info_acc.key, price_type, options)
        }
        _ => oracle_mappings.reset_entry(token),
    }
}

/// Map `token` to an upstream account known only by its key.
///
/// The account layout is not checked here, a wrong account is rejected by the first refresh.
pub fn process_unchecked(
    cap: &AdminCap,
    configuration: &Configuration,
    oracle_mappings: &mut OracleMappings,
    token: usize,
    price_type: OracleType,
    price_account: Pubkey,
    options: MappingOptions,
) -> ScopeResult<()> {
    configuration.check_cap(cap)?;

    info!(
        "UpdateOracleMapping (unchecked), token: {}, price_type: {}, account: {}",
        token, price_type, price_account
    );
    if price_account == Pubkey::default() {
        oracle_mappings.reset_entry(token)
    } else {
        check_twap_account(configuration, price_type, &price_account)?;
        oracle_mappings.set_entry_mapping(token, price_account, price_type, options)
    }
}

/// A TWAP token reads the twaps registry of its own feed.
fn check_twap_account(
    configuration: &Configuration,
    price_type: OracleType,
    price_account: &Pubkey,
) -> ScopeResult<()> {
    if price_type.is_twap() && *price_account != configuration.oracle_twaps {
        warn!(
            "Twap token must be mapped to the feed twaps {}, got {}",
            configuration.oracle_twaps, price_account
        );
        return Err(ScopeError::UnexpectedAccount);
    }
    Ok(())
}
