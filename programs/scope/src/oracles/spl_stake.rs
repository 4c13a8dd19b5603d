use tracing::warn;

use self::spl_stake_pool::StakePool;
use crate::{
    utils::{consts::SECONDS_PER_HOUR, math::ratio_to_price},
    AccountInfo, Clock, DatedPrice, DecodeError, ScopeResult,
};

const DECIMALS: u32 = 15u32;

// Gives the price of 1 staked SOL in SOL
pub fn get_price(
    stake_pool_account_info: &AccountInfo,
    current_clock: &Clock,
) -> ScopeResult<DatedPrice> {
    let stake_pool = StakePool::load(stake_pool_account_info).map_err(|e| {
        warn!(
            "Provided pubkey {} is not a SPL Stake account",
            stake_pool_account_info.key
        );
        e
    })?;

    if !cfg!(feature = "skip_price_validation") && !stake_pool.is_fresh(current_clock) {
        // The pool is refreshed a bit after each epoch start, one hour of delay is tolerated.
        warn!(
            "SPL Stake account {} has not been refreshed in current epoch (last update epoch {}, current {})",
            stake_pool_account_info.key, stake_pool.last_update_epoch, current_clock.epoch
        );
        return Err(DecodeError::StaleOrInvalid.into());
    }

    let price = ratio_to_price(
        stake_pool.total_lamports.into(),
        stake_pool.pool_token_supply.into(),
        DECIMALS,
    )?;

    Ok(DatedPrice::new(
        price,
        current_clock.slot,
        current_clock.unix_timestamp_u64(),
    ))
}

pub fn validate_stake_pool(stake_pool_account_info: &AccountInfo) -> ScopeResult<()> {
    StakePool::load(stake_pool_account_info)?;
    Ok(())
}

mod spl_stake_pool {
    use super::*;
    use crate::utils::read_pod_at;

    /// Account type tag of an initialized stake pool
    pub const ACCOUNT_TYPE_STAKE_POOL: u8 = 1;

    // Borsh layout: account_type, 3 authorities, withdraw bump seed, 5 pubkeys then the totals
    const TOTAL_LAMPORTS_OFFSET: usize = 1 + 3 * 32 + 1 + 5 * 32;
    const POOL_TOKEN_SUPPLY_OFFSET: usize = TOTAL_LAMPORTS_OFFSET + 8;
    const LAST_UPDATE_EPOCH_OFFSET: usize = POOL_TOKEN_SUPPLY_OFFSET + 8;

    /// Totals of a stake pool
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct StakePool {
        /// Total stake under management.
        /// Not accurate if `last_update_epoch` does not match the current epoch
        pub total_lamports: u64,
        /// Total supply of pool tokens
        pub pool_token_supply: u64,
        /// Last epoch the `total_lamports` field was updated
        pub last_update_epoch: u64,
    }

    impl StakePool {
        pub fn load(account: &AccountInfo) -> Result<Self, DecodeError> {
            let account_type: u8 = read_pod_at(account, 0)?;
            if account_type != ACCOUNT_TYPE_STAKE_POOL {
                return Err(DecodeError::MalformedLayout);
            }
            Ok(Self {
                total_lamports: read_pod_at(account, TOTAL_LAMPORTS_OFFSET)?,
                pool_token_supply: read_pod_at(account, POOL_TOKEN_SUPPLY_OFFSET)?,
                last_update_epoch: read_pod_at(account, LAST_UPDATE_EPOCH_OFFSET)?,
            })
        }

        pub fn is_fresh(&self, clock: &Clock) -> bool {
            let seconds_since_epoch_started = clock
                .unix_timestamp
                .saturating_sub(clock.epoch_start_timestamp);
            let next_epoch = self.last_update_epoch.saturating_add(1);
            !((next_epoch == clock.epoch && seconds_since_epoch_started >= SECONDS_PER_HOUR)
                || next_epoch < clock.epoch)
        }
    }

    #[cfg(test)]
    pub(super) fn pool_data(total_lamports: u64, supply: u64, last_update_epoch: u64) -> Vec<u8> {
        let mut data = vec![0_u8; 611];
        data[0] = ACCOUNT_TYPE_STAKE_POOL;
        data[TOTAL_LAMPORTS_OFFSET..][..8].copy_from_slice(&total_lamports.to_le_bytes());
        data[POOL_TOKEN_SUPPLY_OFFSET..][..8].copy_from_slice(&supply.to_le_bytes());
        data[LAST_UPDATE_EPOCH_OFFSET..][..8].copy_from_slice(&last_update_epoch.to_le_bytes());
        data
    }
}
