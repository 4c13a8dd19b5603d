use bytemuck::Zeroable;
use scope::{oracles::ktokens::WhirlpoolStrategy, Price};

use super::as_ratio;

pub fn get_account_data_for_price(price: &Price) -> Vec<u8> {
    let (holdings, shares_issued) = as_ratio(price);
    get_account_data(WhirlpoolStrategy {
        status: 1,
        shares_mint_decimals: 6,
        token_a_mint_decimals: 6,
        shares_issued,
        token_a_invested: holdings,
        token_a_uninvested: 0,
        ..Zeroable::zeroed()
    })
}

pub fn get_account_data(strategy: WhirlpoolStrategy) -> Vec<u8> {
    let mut data = WhirlpoolStrategy::discriminator().to_vec();
    data.extend_from_slice(bytemuck::bytes_of(&strategy));
    // positions and rewards bookkeeping, not read
    data.extend_from_slice(&[0_u8; 512]);
    data
}
