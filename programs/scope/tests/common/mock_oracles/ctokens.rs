use scope::{oracles::ctokens::solend::RESERVE_LEN, Clock, Price};

use super::as_ratio;

// Offsets in the packed reserve
const LAST_UPDATE_SLOT: usize = 1;
const LIQUIDITY_AVAILABLE_AMOUNT: usize = 171;
const LIQUIDITY_BORROWED_AMOUNT_WADS: usize = 179;
const COLLATERAL_MINT_TOTAL_SUPPLY: usize = 259;

pub fn get_account_data_for_price(price: &Price, clock: &Clock) -> Vec<u8> {
    let (liquidity, collateral) = as_ratio(price);
    get_account_data(liquidity, 0, collateral, clock)
}

/// A reserve with `available` liquidity tokens plus `borrowed_wads` lent, backing `supply` cTokens
pub fn get_account_data(available: u64, borrowed_wads: u128, supply: u64, clock: &Clock) -> Vec<u8> {
    let mut data = vec![0_u8; RESERVE_LEN];
    data[0] = 1;
    data[LAST_UPDATE_SLOT..][..8].copy_from_slice(&clock.slot.to_le_bytes());
    data[LIQUIDITY_AVAILABLE_AMOUNT..][..8].copy_from_slice(&available.to_le_bytes());
    data[LIQUIDITY_BORROWED_AMOUNT_WADS..][..16].copy_from_slice(&borrowed_wads.to_le_bytes());
    data[COLLATERAL_MINT_TOTAL_SUPPLY..][..8].copy_from_slice(&supply.to_le_bytes());
    data
}
