use scope::{Clock, Price};

use super::as_ratio;

const STAKE_POOL_SIZE: usize = 611;
const TOTAL_LAMPORTS: usize = 258;
const POOL_TOKEN_SUPPLY: usize = 266;
const LAST_UPDATE_EPOCH: usize = 274;

pub fn get_account_data_for_price(price: &Price, clock: &Clock) -> Vec<u8> {
    let (total_lamports, pool_token_supply) = as_ratio(price);
    get_account_data(total_lamports, pool_token_supply, clock.epoch)
}

pub fn get_account_data(total_lamports: u64, pool_token_supply: u64, last_update_epoch: u64) -> Vec<u8> {
    let mut data = vec![0_u8; STAKE_POOL_SIZE];
    // account type: stake pool
    data[0] = 1;
    data[TOTAL_LAMPORTS..][..8].copy_from_slice(&total_lamports.to_le_bytes());
    data[POOL_TOKEN_SUPPLY..][..8].copy_from_slice(&pool_token_supply.to_le_bytes());
    data[LAST_UPDATE_EPOCH..][..8].copy_from_slice(&last_update_epoch.to_le_bytes());
    data
}
