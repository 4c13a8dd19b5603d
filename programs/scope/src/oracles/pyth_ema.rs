//! Toolings to retrieve pyth ema prices and validate them
//!
//! The ema price lives in the same account as the aggregate price, see [`super::pyth`] for
//! the account checks. The ema confidence is checked with the same [`ORACLE_CONFIDENCE_FACTOR`].

use tracing::warn;

use super::pyth::{load_price_account, log_publish_age, validate_valid_price, PRICE_STATUS_TRADING};
use crate::{
    utils::consts::ORACLE_CONFIDENCE_FACTOR, AccountInfo, Clock, DatedPrice, DecodeError,
    ScopeResult,
};

pub fn get_price(price_info: &AccountInfo, clock: &Clock) -> ScopeResult<DatedPrice> {
    let price_account = load_price_account(price_info)?;

    if price_account.agg.status != PRICE_STATUS_TRADING {
        warn!(
            "Pyth price account {} is not trading, its EMA is not updated",
            price_info.key
        );
        return Err(DecodeError::StaleOrInvalid.into());
    }

    let ema_conf = u64::try_from(price_account.ema_conf.val).map_err(|_| {
        warn!("Pyth EMA confidence is negative in {}", price_info.key);
        DecodeError::StaleOrInvalid
    })?;

    let ema_price = validate_valid_price(
        price_account.ema_price.val,
        ema_conf,
        price_account.expo,
        ORACLE_CONFIDENCE_FACTOR,
    )
    .map_err(|e| {
        warn!(
            "EMA price validity check failed on pyth account {}",
            price_info.key
        );
        e
    })?;

    log_publish_age(price_info, price_account.agg.pub_slot, clock);

    Ok(DatedPrice::new(
        ema_price,
        price_account.agg.pub_slot,
        u64::try_from(price_account.timestamp).unwrap_or(0),
    ))
}
