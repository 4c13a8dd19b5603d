//! Time weighted average prices built from the refreshed prices of a token.

use tracing::{debug, warn};

use crate::{
    DatedPrice, OracleMappings, OracleTwaps, ScopeError, ScopeResult, TwapUpdate,
};

/// Samples a source needs before its TWAP is published in another token
pub const MIN_TWAP_OBSERVATIONS: usize = 2;

/// Push a freshly written price in the TWAP buffer of `entry_id`.
pub fn update_twap(
    oracle_twaps: &mut OracleTwaps,
    entry_id: usize,
    price: &DatedPrice,
    window: u8,
) -> ScopeResult<TwapUpdate> {
    let twap = oracle_twaps.get_twap_mut(entry_id)?;

    let update = twap.update(
        price.price,
        price.unix_timestamp,
        price.last_updated_slot,
        window,
    )?;
    match update {
        TwapUpdate::Duplicate => debug!(
            "Twap of tk {entry_id} already has a sample at {}, skipped",
            price.unix_timestamp
        ),
        TwapUpdate::Reset => debug!("Twap of tk {entry_id} restarted with window {window}"),
        TwapUpdate::Added => {}
    }
    Ok(update)
}

pub fn reset_twap(oracle_twaps: &mut OracleTwaps, entry_id: usize) -> ScopeResult<()> {
    oracle_twaps.reset_entry(entry_id)
}

/// Current TWAP of `entry_id`, dated with its latest sample.
pub fn get_price(
    oracle_mappings: &OracleMappings,
    oracle_twaps: &OracleTwaps,
    entry_id: usize,
) -> ScopeResult<DatedPrice> {
    if entry_id >= crate::MAX_ENTRIES {
        return Err(ScopeError::SlotOutOfRange);
    }
    if !oracle_mappings.is_twap_enabled(entry_id) {
        warn!("Twap is not enabled for tk {entry_id}");
        return Err(ScopeError::TwapNotEnabled);
    }

    let mut twap = oracle_twaps.get_twap(entry_id)?.twap()?;
    twap.index = u16::try_from(entry_id)?;
    Ok(twap)
}

/// Price of a [`crate::OracleType::ScopeTwap`] token: the TWAP of its source token.
pub fn get_twap_of_source(
    oracle_mappings: &OracleMappings,
    oracle_twaps: &OracleTwaps,
    entry_id: usize,
) -> ScopeResult<DatedPrice> {
    let source = oracle_mappings
        .get_twap_source(entry_id)
        .map(usize::from)
        .filter(|source| *source != entry_id)
        .ok_or(ScopeError::InvalidTwapSource)?;

    if !oracle_mappings.is_twap_enabled(source) {
        warn!("Twap of tk {entry_id} reads tk {source} which has no twap");
        return Err(ScopeError::TwapNotEnabled);
    }
    let num_obs = oracle_twaps.get_twap(source)?.len();
    if num_obs < MIN_TWAP_OBSERVATIONS {
        warn!("Twap of tk {source} has {num_obs} samples, tk {entry_id} needs {MIN_TWAP_OBSERVATIONS}");
        return Err(ScopeError::TwapNotEnoughSamplesInPeriod);
    }

    let mut twap = get_price(oracle_mappings, oracle_twaps, source)?;
    twap.index = u16::try_from(entry_id)?;
    Ok(twap)
}
