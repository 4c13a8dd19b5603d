//! Switchboard v1 aggregators.
//!
//! The aggregator exposes the result of its last completed round with the number of oracles
//! that answered and the spread of their answers. All responses of a round share the scale
//! of the result.
//!
//! Deployed v1 aggregators store a protobuf message after the type byte. This module reads a
//! fixed 64 bytes little endian rendition of the same round (see [`AggregatorState`]) and does
//! not decode protobuf accounts.

use std::cmp::min;

use bytemuck::{Pod, Zeroable};
use tracing::warn;

use crate::{utils::read_pod_at, AccountInfo, DatedPrice, DecodeError, Price, ScopeResult};

pub const TYPE_AGGREGATOR: u8 = 1;
const MIN_NUM_SUCCESS: u32 = 3;
const MIN_CONFIDENCE_PERCENTAGE: i128 = 2;
const CONFIDENCE_FACTOR: i128 = 100 / MIN_CONFIDENCE_PERCENTAGE;

static_assertions::const_assert_eq!(64, std::mem::size_of::<AggregatorState>());
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct AggregatorState {
    /// first byte is the account type
    pub account_type: [u8; 8],
    pub min_confirmations: u32,
    pub num_success: u32,
    pub round_open_slot: u64,
    pub round_open_timestamp: i64,
    pub result_mantissa: i64,
    pub result_scale: u32,
    pub _reserved: u32,
    pub min_response_mantissa: i64,
    pub max_response_mantissa: i64,
}

pub fn load_aggregator(switchboard_feed_info: &AccountInfo) -> Result<AggregatorState, DecodeError> {
    let aggregator: AggregatorState = read_pod_at(switchboard_feed_info, 0)?;
    if aggregator.account_type[0] != TYPE_AGGREGATOR {
        warn!(
            "Switchboard v1 account {} is not of type aggregator",
            switchboard_feed_info.key
        );
        return Err(DecodeError::MalformedLayout);
    }
    Ok(aggregator)
}

pub fn get_price(switchboard_feed_info: &AccountInfo) -> ScopeResult<DatedPrice> {
    let aggregator = load_aggregator(switchboard_feed_info)?;

    let value = u64::try_from(aggregator.result_mantissa).map_err(|_| {
        warn!(
            "Switchboard v1 feed {} has a negative result",
            switchboard_feed_info.key
        );
        DecodeError::StaleOrInvalid
    })?;
    let price = Price {
        value,
        exp: aggregator.result_scale.into(),
    };

    if !cfg!(feature = "skip_price_validation") {
        validate_min_success(&aggregator)?;
        validate_confidence(
            aggregator.result_mantissa,
            aggregator.max_response_mantissa,
            aggregator.min_response_mantissa,
        )
        .map_err(|e| {
            warn!(
                "Validation of confidence interval for switchboard v1 feed {} failed",
                switchboard_feed_info.key
            );
            e
        })?;
    }

    Ok(DatedPrice::new(
        price,
        aggregator.round_open_slot,
        u64::try_from(aggregator.round_open_timestamp).unwrap_or(0),
    ))
}

pub fn validate_aggregator(switchboard_feed_info: &AccountInfo) -> ScopeResult<()> {
    load_aggregator(switchboard_feed_info)?;
    Ok(())
}

fn validate_min_success(aggregator: &AggregatorState) -> Result<(), DecodeError> {
    let min_num_success_for_oracle = min(aggregator.min_confirmations, MIN_NUM_SUCCESS);
    if aggregator.num_success < min_num_success_for_oracle {
        warn!(
            "Switchboard v1 round has {} successes, {} required",
            aggregator.num_success, min_num_success_for_oracle
        );
        return Err(DecodeError::RoundIncomplete);
    }
    Ok(())
}

fn validate_confidence(price: i64, max_response: i64, min_response: i64) -> Result<(), DecodeError> {
    // st_dev_estimate = (max_response - min_response) / 4
    // valid if st_dev_estimate < CONFIDENCE_PERCENTAGE * price / 100
    let spread = i128::from(max_response) - i128::from(min_response);
    if spread < 0 || spread * CONFIDENCE_FACTOR >= 4 * i128::from(price) {
        return Err(DecodeError::StaleOrInvalid);
    }
    Ok(())
}
