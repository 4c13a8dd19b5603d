use tracing::warn;

pub use self::switchboard::*;
use crate::{
    utils::{anchor_discriminator, zero_copy_deserialize},
    AccountInfo, DatedPrice, DecodeError, Price, ScopeError, ScopeResult,
};

const MAX_EXPONENT: u32 = 10;

const MIN_CONFIDENCE_PERCENTAGE: u64 = 2u64;
const CONFIDENCE_FACTOR: u64 = 100 / MIN_CONFIDENCE_PERCENTAGE;

pub fn get_price(switchboard_feed_info: &AccountInfo) -> ScopeResult<DatedPrice> {
    let feed = AggregatorAccountData::load(switchboard_feed_info)?;

    let price_switchboard_desc = feed.get_result().map_err(|e| {
        warn!(
            "Switchboard v2 get result from feed {} failed",
            switchboard_feed_info.key
        );
        e
    })?;

    let price: Price = price_switchboard_desc.try_into()?;

    if !cfg!(feature = "skip_price_validation") {
        let std_deviation = feed.latest_confirmed_round.std_deviation;
        let (stdev_mantissa, stdev_scale) = (std_deviation.mantissa, std_deviation.scale);
        if validate_confidence(
            price_switchboard_desc.mantissa,
            price_switchboard_desc.scale,
            stdev_mantissa,
            stdev_scale,
        )
        .is_err()
        {
            warn!(
                "Validation of confidence interval for switchboard v2 feed {} failed. Price: {}, stdev_mantissa: {}, stdev_scale: {}",
                switchboard_feed_info.key,
                price,
                stdev_mantissa,
                stdev_scale
            );
            return Err(DecodeError::StaleOrInvalid.into());
        }
    };

    let round = feed.latest_confirmed_round;
    let (last_updated_slot, round_open_timestamp) =
        (round.round_open_slot, round.round_open_timestamp);

    Ok(DatedPrice::new(
        price,
        last_updated_slot,
        u64::try_from(round_open_timestamp).unwrap_or(0),
    ))
}

pub fn validate_aggregator(switchboard_feed_info: &AccountInfo) -> ScopeResult<()> {
    AggregatorAccountData::load(switchboard_feed_info)?;
    Ok(())
}

fn validate_confidence(
    price_mantissa: i128,
    price_scale: u32,
    stdev_mantissa: i128,
    stdev_scale: u32,
) -> ScopeResult<()> {
    // Step 1: bring the stdev to the same scale as the price.
    let scale_diff = price_scale.abs_diff(stdev_scale);
    let scaling_factor = 10_i128
        .checked_pow(scale_diff)
        .ok_or(ScopeError::MathOverflow)?;

    // Step 2: multiply the stdev by the CONFIDENCE_FACTOR and apply scaling factor.
    let stdev_x_confidence_factor = stdev_mantissa
        .checked_mul(CONFIDENCE_FACTOR.into())
        .ok_or(ScopeError::MathOverflow)?;
    let stdev_x_confidence_factor_scaled = if price_scale >= stdev_scale {
        stdev_x_confidence_factor.checked_mul(scaling_factor)
    } else {
        stdev_x_confidence_factor.checked_div(scaling_factor)
    }
    .ok_or(ScopeError::MathOverflow)?;

    if stdev_x_confidence_factor_scaled >= price_mantissa {
        Err(DecodeError::StaleOrInvalid.into())
    } else {
        Ok(())
    }
}

impl TryFrom<SwitchboardDecimal> for Price {
    type Error = ScopeError;

    fn try_from(sb_decimal: SwitchboardDecimal) -> Result<Self, Self::Error> {
        let (mantissa, scale) = (sb_decimal.mantissa, sb_decimal.scale);
        if mantissa < 0 {
            warn!("Switchboard v2 oracle price feed is negative");
            return Err(DecodeError::StaleOrInvalid.into());
        }
        let (exp, value) = if scale > MAX_EXPONENT {
            // exp is capped. Remove the extra digits from the mantissa.
            let factor = 10_i128
                .checked_pow(scale - MAX_EXPONENT)
                .ok_or(ScopeError::MathOverflow)?;
            // Loss of precision here is expected.
            (MAX_EXPONENT, mantissa / factor)
        } else {
            (scale, mantissa)
        };
        let value: u64 = value.try_into().map_err(|_| ScopeError::IntegerOverflow)?;
        Ok(Price {
            value,
            exp: exp.into(),
        })
    }
}

mod switchboard {
    use bytemuck::{Pod, Zeroable};

    use super::*;

    #[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
    #[repr(C, packed)]
    pub struct SwitchboardDecimal {
        pub mantissa: i128,
        pub scale: u32,
    }

    impl SwitchboardDecimal {
        pub fn new(mantissa: i128, scale: u32) -> SwitchboardDecimal {
            Self { mantissa, scale }
        }
    }

    #[derive(Clone, Copy, Pod, Zeroable)]
    #[repr(C, packed)]
    pub struct AggregatorAccountData {
        pub name: [u8; 32],
        pub metadata: [u8; 128],
        pub author_wallet: [u8; 32],
        pub queue_pubkey: [u8; 32],
        pub oracle_request_batch_size: u32,
        pub min_oracle_results: u32,
        pub min_job_results: u32,
        pub min_update_delay_seconds: u32,
        pub start_after: i64,
        pub variance_threshold: SwitchboardDecimal,
        pub force_report_period: i64,
        pub expiration: i64,
        pub consecutive_failure_count: u64,
        pub next_allowed_update_time: i64,
        pub is_locked: u8,
        pub _schedule: [u8; 32],
        pub latest_confirmed_round: AggregatorRound,
        pub current_round: AggregatorRound,
        pub job_pubkeys_data: [[u8; 32]; 16],
        pub job_hashes: [[u8; 32]; 16],
        pub job_pubkeys_size: u32,
        pub jobs_checksum: [u8; 32],
        pub authority: [u8; 32],
        pub _ebuf: [u8; 224],
    }

    impl AggregatorAccountData {
        pub fn discriminator() -> [u8; 8] {
            anchor_discriminator("AggregatorAccountData")
        }

        pub fn load(switchboard_feed: &AccountInfo) -> Result<Self, DecodeError> {
            zero_copy_deserialize(switchboard_feed, &Self::discriminator())
        }

        pub fn get_result(&self) -> Result<SwitchboardDecimal, DecodeError> {
            // Copy to avoid references to a packed struct
            let latest_confirmed_round_success = self.latest_confirmed_round.num_success;
            let min_oracle_results = self.min_oracle_results;
            if min_oracle_results > latest_confirmed_round_success {
                warn!("Switchboard price is invalid: min_oracle_results: {min_oracle_results} > latest_confirmed_round.num_success: {latest_confirmed_round_success}");
                Err(DecodeError::RoundIncomplete)
            } else {
                Ok(self.latest_confirmed_round.result)
            }
        }
    }

    #[derive(Clone, Copy, Pod, Zeroable)]
    #[repr(C, packed)]
    pub struct AggregatorRound {
        // Number of successful responses received from nodes.
        pub num_success: u32,
        pub num_error: u32,
        pub is_closed: u8,
        pub round_open_slot: u64,
        pub round_open_timestamp: i64,
        // Median of all successful round responses.
        pub result: SwitchboardDecimal,
        pub std_deviation: SwitchboardDecimal,
        pub min_response: SwitchboardDecimal,
        pub max_response: SwitchboardDecimal,
        pub oracle_pubkeys_data: [[u8; 32]; 16],
        pub medians_data: [SwitchboardDecimal; 16],
        pub current_payout: [i64; 16],
        pub medians_fulfilled: [u8; 16],
        pub errors_fulfilled: [u8; 16],
    }
}
