use tracing::warn;

use self::msol_stake_pool::State;
use crate::{
    utils::math::ratio_to_price, AccountInfo, Clock, DatedPrice, ScopeResult,
};

const DECIMALS: u32 = 15u32;

// Gives the price of 1 staked SOL in SOL
pub fn get_price(
    msol_pool_account_info: &AccountInfo,
    current_clock: &Clock,
) -> ScopeResult<DatedPrice> {
    let stake_pool = State::load(msol_pool_account_info).map_err(|e| {
        warn!(
            "Provided pubkey {} is not a valid MSOL Stake account",
            msol_pool_account_info.key
        );
        e
    })?;

    let price = ratio_to_price(
        stake_pool.total_virtual_staked_lamports()?.into(),
        stake_pool.msol_supply.into(),
        DECIMALS,
    )
    .map_err(|e| {
        warn!("Error while calculating the scaled rate: {:?}", e);
        e
    })?;

    Ok(DatedPrice::new(
        price,
        current_clock.slot,
        current_clock.unix_timestamp_u64(),
    ))
}

pub fn validate_state(msol_pool_account_info: &AccountInfo) -> ScopeResult<()> {
    State::load(msol_pool_account_info)?;
    Ok(())
}

mod msol_stake_pool {
    use super::*;
    use crate::{
        utils::{anchor_discriminator, read_pod_at},
        DecodeError, ScopeError,
    };

    // Offsets in the borsh serialized state, discriminator included
    pub(super) const DELAYED_UNSTAKE_COOLING_DOWN_OFFSET: usize = 8 + 218;
    pub(super) const TOTAL_ACTIVE_BALANCE_OFFSET: usize = 8 + 368;
    pub(super) const AVAILABLE_RESERVE_BALANCE_OFFSET: usize = 8 + 488;
    pub(super) const MSOL_SUPPLY_OFFSET: usize = 8 + 496;
    pub(super) const CIRCULATING_TICKET_BALANCE_OFFSET: usize = 8 + 520;
    pub(super) const EMERGENCY_COOLING_DOWN_OFFSET: usize = 8 + 560;

    /// Balances of the marinade state used to value mSOL
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct State {
        pub delayed_unstake_cooling_down: u64,
        /// sum of all active lamports staked
        pub total_active_balance: u64,
        /// reserve_pda.lamports() - rent_exempt_for_token_acc
        pub available_reserve_balance: u64,
        pub msol_supply: u64,
        /// total lamports amount of generated and not claimed yet tickets
        pub circulating_ticket_balance: u64,
        pub emergency_cooling_down: u64,
    }

    impl State {
        pub fn discriminator() -> [u8; 8] {
            anchor_discriminator("State")
        }

        pub fn load(account: &AccountInfo) -> Result<Self, DecodeError> {
            let discriminator: [u8; 8] = read_pod_at(account, 0)?;
            if discriminator != Self::discriminator() {
                return Err(DecodeError::MalformedLayout);
            }
            Ok(Self {
                delayed_unstake_cooling_down: read_pod_at(
                    account,
                    DELAYED_UNSTAKE_COOLING_DOWN_OFFSET,
                )?,
                total_active_balance: read_pod_at(account, TOTAL_ACTIVE_BALANCE_OFFSET)?,
                available_reserve_balance: read_pod_at(account, AVAILABLE_RESERVE_BALANCE_OFFSET)?,
                msol_supply: read_pod_at(account, MSOL_SUPPLY_OFFSET)?,
                circulating_ticket_balance: read_pod_at(
                    account,
                    CIRCULATING_TICKET_BALANCE_OFFSET,
                )?,
                emergency_cooling_down: read_pod_at(account, EMERGENCY_COOLING_DOWN_OFFSET)?,
            })
        }

        pub fn total_cooling_down(&self) -> ScopeResult<u64> {
            self.delayed_unstake_cooling_down
                .checked_add(self.emergency_cooling_down)
                .ok_or(ScopeError::MathOverflow)
        }

        /// total_active_balance + total_cooling_down + available_reserve_balance
        pub fn total_lamports_under_control(&self) -> ScopeResult<u64> {
            self.total_active_balance
                .checked_add(self.total_cooling_down()?)
                .and_then(|total| total.checked_add(self.available_reserve_balance))
                .ok_or(ScopeError::MathOverflow)
        }

        pub fn total_virtual_staked_lamports(&self) -> ScopeResult<u64> {
            // if we get slashed it may be negative but we must use 0 instead
            Ok(self
                .total_lamports_under_control()?
                .saturating_sub(self.circulating_ticket_balance))
        }
    }
}
