use scope::{
    oracles::yitoken::{MINT_LEN, TOKEN_ACCOUNT_LEN},
    Price, Pubkey,
};

use super::as_ratio;

/// Vault token account holding the underlying tokens and the Yi mint, in this order.
pub fn get_accounts_data_for_price(price: &Price) -> (Vec<u8>, Vec<u8>) {
    let (amount, supply) = as_ratio(price);
    let vault_authority = Pubkey::new_unique();
    let underlying_mint = Pubkey::new_unique();
    (
        token_account_data(&underlying_mint, &vault_authority, amount),
        mint_data(&vault_authority, supply),
    )
}

pub fn token_account_data(mint: &Pubkey, owner: &Pubkey, amount: u64) -> Vec<u8> {
    let mut data = vec![0_u8; TOKEN_ACCOUNT_LEN];
    data[..32].copy_from_slice(mint.as_ref());
    data[32..64].copy_from_slice(owner.as_ref());
    data[64..72].copy_from_slice(&amount.to_le_bytes());
    // initialized
    data[108] = 1;
    data
}

pub fn mint_data(authority: &Pubkey, supply: u64) -> Vec<u8> {
    let mut data = vec![0_u8; MINT_LEN];
    data[..4].copy_from_slice(&1_u32.to_le_bytes());
    data[4..36].copy_from_slice(authority.as_ref());
    data[36..44].copy_from_slice(&supply.to_le_bytes());
    data[44] = 8;
    data[45] = 1;
    data
}
