//! Toolings to retrieve pyth prices and validate them
//!
//! Validation partially follows [pyth best practices](https://docs.pyth.network/consumers/best-practices)
//!
//! 1. Some checks in [`validate_pyth_price_info`] are performed on the pyth price account upon registration in
//!    the oracle mapping. However some information present only in the associated pyth product account are
//!    expected to be checked by the admin to ensure the product has the expected quality prior the mapping
//!    update.
//! 2. Upon usage the current price state is checked in [`validate_valid_price`]
//! 3. The confidence interval is also checked in this same function with [`ORACLE_CONFIDENCE_FACTOR`]

use bytemuck::{Pod, Zeroable};
use tracing::{debug, warn};

use crate::{
    utils::{consts::ORACLE_CONFIDENCE_FACTOR, read_pod_at},
    AccountInfo, Clock, DatedPrice, DecodeError, Price, ScopeResult,
};

pub const MAGIC: u32 = 0xa1b2c3d4;
pub const VERSION_2: u32 = 2;
pub const ACCOUNT_TYPE_PRICE: u32 = 3;
pub const PRICE_TYPE_PRICE: u32 = 1;
pub const PRICE_STATUS_TRADING: u32 = 1;

/// Upstream publish slot older than this is reported in logs only
const STALENESS_SLOT_THRESHOLD: u64 = (10 * 60 * 1000) / 400; // 10 minutes

#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct Ema {
    pub val: i64,
    pub numer: i64,
    pub denom: i64,
}

#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct PriceInfo {
    pub price: i64,
    pub conf: u64,
    pub status: u32,
    pub corp_act: u32,
    pub pub_slot: u64,
}

/// Fixed header of a pyth v2 price account, the publisher components that follow are not read.
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct SolanaPriceAccount {
    pub magic: u32,
    pub ver: u32,
    pub atype: u32,
    pub size: u32,
    pub ptype: u32,
    pub expo: i32,
    pub num: u32,
    pub num_qt: u32,
    pub last_slot: u64,
    pub valid_slot: u64,
    pub ema_price: Ema,
    pub ema_conf: Ema,
    pub timestamp: i64,
    pub min_pub: u8,
    pub drv2: u8,
    pub drv3: u16,
    pub drv4: u32,
    pub prod: [u8; 32],
    pub next: [u8; 32],
    pub prev_slot: u64,
    pub prev_price: i64,
    pub prev_conf: u64,
    pub prev_timestamp: i64,
    pub agg: PriceInfo,
}

pub fn load_price_account(price_info: &AccountInfo) -> Result<SolanaPriceAccount, DecodeError> {
    let price_account: SolanaPriceAccount = read_pod_at(price_info, 0)?;
    if price_account.magic != MAGIC
        || price_account.ver != VERSION_2
        || price_account.atype != ACCOUNT_TYPE_PRICE
    {
        warn!(
            "Pyth price account {} provided is not a valid Pyth v2 price account",
            price_info.key
        );
        return Err(DecodeError::MalformedLayout);
    }
    Ok(price_account)
}

pub fn get_price(price_info: &AccountInfo, clock: &Clock) -> ScopeResult<DatedPrice> {
    let price_account = load_price_account(price_info)?;

    if price_account.agg.status != PRICE_STATUS_TRADING {
        warn!(
            "Pyth price account {} is not trading (status {})",
            price_info.key, price_account.agg.status
        );
        return Err(DecodeError::StaleOrInvalid.into());
    }

    let price = validate_valid_price(
        price_account.agg.price,
        price_account.agg.conf,
        price_account.expo,
        ORACLE_CONFIDENCE_FACTOR,
    )
    .map_err(|e| {
        warn!(
            "Price validity check failed on pyth account {}",
            price_info.key
        );
        e
    })?;

    log_publish_age(price_info, price_account.agg.pub_slot, clock);

    Ok(DatedPrice::new(
        price,
        price_account.agg.pub_slot,
        u64::try_from(price_account.timestamp).unwrap_or(0),
    ))
}

pub(super) fn log_publish_age(price_info: &AccountInfo, pub_slot: u64, clock: &Clock) {
    let oldest_accepted_slot = clock.slot.saturating_sub(STALENESS_SLOT_THRESHOLD);
    if pub_slot < oldest_accepted_slot {
        debug!(
            "Pyth account {} was last published at slot {pub_slot}, current slot {}",
            price_info.key, clock.slot
        );
    }
}

/// Turn a pyth mantissa, confidence and exponent into a [`Price`].
pub fn validate_valid_price(
    price: i64,
    conf: u64,
    expo: i32,
    oracle_confidence_factor: u64,
) -> Result<Price, DecodeError> {
    if expo > 0 {
        warn!("Pyth price has a positive exponent: {expo}");
        return Err(DecodeError::StaleOrInvalid);
    }
    let exp = u64::from(expo.unsigned_abs());
    let value = u64::try_from(price).map_err(|_| {
        warn!("Pyth price is negative: {price}");
        DecodeError::StaleOrInvalid
    })?;

    if cfg!(feature = "skip_price_validation") {
        return Ok(Price { value, exp });
    }
    if value == 0 {
        warn!("Pyth price is 0");
        return Err(DecodeError::StaleOrInvalid);
    }
    let conf_50x = conf
        .checked_mul(oracle_confidence_factor)
        .ok_or(DecodeError::StaleOrInvalid)?;
    if conf_50x > value {
        warn!("Pyth price has a confidence interval too large: {conf}");
        return Err(DecodeError::StaleOrInvalid);
    }

    Ok(Price { value, exp })
}

pub fn validate_pyth_price_info(pyth_price_info: &AccountInfo) -> ScopeResult<()> {
    if cfg!(feature = "skip_price_validation") {
        return Ok(());
    }
    let pyth_price = load_price_account(pyth_price_info)?;
    if pyth_price.ptype != PRICE_TYPE_PRICE {
        warn!("Pyth price account provided has invalid price type");
        return Err(DecodeError::MalformedLayout.into());
    }
    if pyth_price.agg.status != PRICE_STATUS_TRADING {
        warn!("Pyth price account provided is not active");
        return Err(DecodeError::StaleOrInvalid.into());
    }
    Ok(())
}
