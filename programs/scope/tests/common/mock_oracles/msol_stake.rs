use scope::{utils::anchor_discriminator, Price};

use super::as_ratio;

const STATE_SIZE: usize = 8 + 568;
const TOTAL_ACTIVE_BALANCE: usize = 8 + 368;
const MSOL_SUPPLY: usize = 8 + 496;

pub fn get_account_data_for_price(price: &Price) -> Vec<u8> {
    let (staked_lamports, msol_supply) = as_ratio(price);
    get_account_data(staked_lamports, msol_supply)
}

pub fn get_account_data(staked_lamports: u64, msol_supply: u64) -> Vec<u8> {
    let mut data = vec![0_u8; STATE_SIZE];
    data[..8].copy_from_slice(&anchor_discriminator("State"));
    data[TOTAL_ACTIVE_BALANCE..][..8].copy_from_slice(&staked_lamports.to_le_bytes());
    data[MSOL_SUPPLY..][..8].copy_from_slice(&msol_supply.to_le_bytes());
    data
}
