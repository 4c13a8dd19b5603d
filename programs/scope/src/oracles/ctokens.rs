use tracing::warn;

use self::solend::Reserve;
use crate::{
    utils::math::ratio_to_price, AccountInfo, Clock, DatedPrice, DecodeError, ScopeError,
    ScopeResult,
};

const DECIMALS: u32 = 15u32;

// Gives the price of 1 cToken in the collateral token
pub fn get_price(solend_reserve_account: &AccountInfo, clock: &Clock) -> ScopeResult<DatedPrice> {
    let reserve = Reserve::unpack(solend_reserve_account.data).map_err(|e| {
        warn!(
            "Error unpacking CToken account {}",
            solend_reserve_account.key
        );
        e
    })?;

    let price = scaled_rate(&reserve).map_err(|e| {
        warn!(
            "Error getting scaled rate for CToken account {}: {e:?}",
            solend_reserve_account.key
        );
        e
    })?;

    Ok(DatedPrice::new(
        price,
        reserve.last_update_slot,
        clock.unix_timestamp_u64(),
    ))
}

pub fn validate_reserve(solend_reserve_account: &AccountInfo) -> ScopeResult<()> {
    Reserve::unpack(solend_reserve_account.data)?;
    Ok(())
}

/// Amount of liquidity one collateral token can be redeemed for
fn scaled_rate(reserve: &Reserve) -> ScopeResult<crate::Price> {
    let total_liquidity_wads = reserve.total_liquidity_wads()?;
    let collateral_supply_wads = u128::from(reserve.collateral_mint_total_supply)
        .checked_mul(solend::WAD)
        .ok_or(ScopeError::MathOverflow)?;
    ratio_to_price(total_liquidity_wads, collateral_supply_wads, DECIMALS)
}

pub mod solend {
    use arrayref::{array_ref, array_refs};
    use solana_pubkey::Pubkey;

    use super::*;

    pub const WAD: u128 = 1_000_000_000_000_000_000;

    /// Accounts are created with data zeroed out, so uninitialized state instances
    /// will have the version set to 0.
    pub const UNINITIALIZED_VERSION: u8 = 0;

    pub const RESERVE_LEN: usize = 619; // 1 + 8 + 1 + 32 + 32 + 1 + 32 + 32 + 32 + 8 + 16 + 16 + 16 + 32 + 8 + 352

    /// Subset of the lending market reserve state needed to price its collateral token
    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct Reserve {
        pub version: u8,
        /// Last slot when supply and rates updated
        pub last_update_slot: u64,
        pub lending_market: Pubkey,
        pub liquidity_mint_pubkey: Pubkey,
        pub liquidity_mint_decimals: u8,
        pub liquidity_available_amount: u64,
        pub liquidity_borrowed_amount_wads: u128,
        pub liquidity_cumulative_borrow_rate_wads: u128,
        pub collateral_mint_pubkey: Pubkey,
        pub collateral_mint_total_supply: u64,
    }

    impl Reserve {
        pub fn unpack(input: &[u8]) -> Result<Self, DecodeError> {
            let input = input.get(..RESERVE_LEN).ok_or(DecodeError::MalformedLayout)?;
            let input = array_ref![input, 0, RESERVE_LEN];
            #[allow(clippy::ptr_offset_with_cast)]
            let (
                version,
                last_update_slot,
                _last_update_stale,
                lending_market,
                liquidity_mint_pubkey,
                liquidity_mint_decimals,
                _liquidity_supply_pubkey,
                _liquidity_pyth_oracle_pubkey,
                _liquidity_switchboard_oracle_pubkey,
                liquidity_available_amount,
                liquidity_borrowed_amount_wads,
                liquidity_cumulative_borrow_rate_wads,
                _liquidity_market_price,
                collateral_mint_pubkey,
                collateral_mint_total_supply,
                _rest,
            ) = array_refs![input, 1, 8, 1, 32, 32, 1, 32, 32, 32, 8, 16, 16, 16, 32, 8, 352];

            let version = u8::from_le_bytes(*version);
            if version == UNINITIALIZED_VERSION {
                warn!("Solend reserve is not initialized");
                return Err(DecodeError::MalformedLayout);
            }

            Ok(Self {
                version,
                last_update_slot: u64::from_le_bytes(*last_update_slot),
                lending_market: Pubkey::new_from_array(*lending_market),
                liquidity_mint_pubkey: Pubkey::new_from_array(*liquidity_mint_pubkey),
                liquidity_mint_decimals: u8::from_le_bytes(*liquidity_mint_decimals),
                liquidity_available_amount: u64::from_le_bytes(*liquidity_available_amount),
                liquidity_borrowed_amount_wads: u128::from_le_bytes(
                    *liquidity_borrowed_amount_wads,
                ),
                liquidity_cumulative_borrow_rate_wads: u128::from_le_bytes(
                    *liquidity_cumulative_borrow_rate_wads,
                ),
                collateral_mint_pubkey: Pubkey::new_from_array(*collateral_mint_pubkey),
                collateral_mint_total_supply: u64::from_le_bytes(*collateral_mint_total_supply),
            })
        }

        /// Available plus borrowed liquidity, scaled by [`WAD`]
        pub fn total_liquidity_wads(&self) -> ScopeResult<u128> {
            u128::from(self.liquidity_available_amount)
                .checked_mul(WAD)
                .and_then(|available| available.checked_add(self.liquidity_borrowed_amount_wads))
                .ok_or(ScopeError::MathOverflow)
        }
    }
}

#[cfg(test)]
mod tests {
    use solana_pubkey::Pubkey;

    use super::*;
    use crate::Price;

    fn reserve_data(available: u64, borrowed_wads: u128, supply: u64) -> Vec<u8> {
        let mut data = vec![0_u8; solend::RESERVE_LEN];
        data[0] = 1;
        data[171..179].copy_from_slice(&available.to_le_bytes());
        data[179..195].copy_from_slice(&borrowed_wads.to_le_bytes());
        data[259..267].copy_from_slice(&supply.to_le_bytes());
        data
    }

    #[test]
    fn two_liquidity_per_collateral() {
        let key = Pubkey::new_unique();
        let data = reserve_data(100, 0, 50);
        let price = get_price(&AccountInfo::new(&key, &data), &Clock::default()).unwrap();
        assert_eq!(price.price, Price { value: 200_000_000, exp: 8 });
        assert_eq!(price.price.exp, 15);
    }

    #[test]
    fn borrowed_liquidity_counts() {
        let key = Pubkey::new_unique();
        let data = reserve_data(50, 50 * solend::WAD + solend::WAD / 2, 100);
        let price = get_price(&AccountInfo::new(&key, &data), &Clock::default()).unwrap();
        assert_eq!(price.price, Price { value: 1005, exp: 3 });
    }

    #[test]
    fn empty_or_garbled_reserve() {
        let key = Pubkey::new_unique();
        let data = reserve_data(100, 0, 0);
        assert_eq!(
            get_price(&AccountInfo::new(&key, &data), &Clock::default()),
            Err(ScopeError::Decode(DecodeError::DivideByZero))
        );
        let mut data = reserve_data(100, 0, 50);
        data[0] = 0;
        assert_eq!(
            get_price(&AccountInfo::new(&key, &data), &Clock::default()),
            Err(ScopeError::Decode(DecodeError::MalformedLayout))
        );
        assert_eq!(
            get_price(&AccountInfo::new(&key, &data[..100]), &Clock::default()),
            Err(ScopeError::Decode(DecodeError::MalformedLayout))
        );
    }
}
