//! Yi vault share tokens.
//!
//! The vault holds its underlying tokens in an SPL token account owned by the mint authority of
//! the share (Yi) mint. The price of a share is the underlying amount divided by the share supply.
//! The balance is read again on every refresh.

use arrayref::{array_ref, array_refs};
use solana_pubkey::Pubkey;
use tracing::warn;

use crate::{
    utils::math::ratio_to_price, AccountInfo, Clock, DatedPrice, DecodeError, ScopeError,
    ScopeResult,
};

const DECIMALS: u32 = 8u32;

pub const TOKEN_ACCOUNT_LEN: usize = 165;
pub const MINT_LEN: usize = 82;

/// Fields of an SPL token account relevant to pricing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenAccount {
    pub mint: Pubkey,
    pub owner: Pubkey,
    pub amount: u64,
}

impl TokenAccount {
    pub fn unpack(data: &[u8]) -> Result<Self, DecodeError> {
        let data = data
            .get(..TOKEN_ACCOUNT_LEN)
            .ok_or(DecodeError::MalformedLayout)?;
        let input = array_ref![data, 0, TOKEN_ACCOUNT_LEN];
        #[allow(clippy::ptr_offset_with_cast)]
        let (mint, owner, amount, _delegate, state, _rest) = array_refs![input, 32, 32, 8, 36, 1, 56];
        // 0 is uninitialized, 2 is frozen
        if state[0] != 1 {
            return Err(DecodeError::MalformedLayout);
        }
        Ok(Self {
            mint: Pubkey::new_from_array(*mint),
            owner: Pubkey::new_from_array(*owner),
            amount: u64::from_le_bytes(*amount),
        })
    }
}

/// Fields of an SPL mint relevant to pricing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mint {
    pub mint_authority: Option<Pubkey>,
    pub supply: u64,
    pub decimals: u8,
}

impl Mint {
    pub fn unpack(data: &[u8]) -> Result<Self, DecodeError> {
        let data = data.get(..MINT_LEN).ok_or(DecodeError::MalformedLayout)?;
        let input = array_ref![data, 0, MINT_LEN];
        #[allow(clippy::ptr_offset_with_cast)]
        let (authority_tag, authority, supply, decimals, is_initialized, _freeze_authority) =
            array_refs![input, 4, 32, 8, 1, 1, 36];
        if is_initialized[0] != 1 {
            return Err(DecodeError::MalformedLayout);
        }
        let mint_authority = match u32::from_le_bytes(*authority_tag) {
            0 => None,
            1 => Some(Pubkey::new_from_array(*authority)),
            _ => return Err(DecodeError::MalformedLayout),
        };
        Ok(Self {
            mint_authority,
            supply: u64::from_le_bytes(*supply),
            decimals: decimals[0],
        })
    }
}

/// Gives the price of 1 Yi share in the underlying token
pub fn get_price(
    underlying_token_account: &AccountInfo,
    yi_mint_account: &AccountInfo,
    clock: &Clock,
) -> ScopeResult<DatedPrice> {
    let underlying = TokenAccount::unpack(underlying_token_account.data).map_err(|e| {
        warn!(
            "Yi underlying account {} is not a valid token account",
            underlying_token_account.key
        );
        e
    })?;
    let yi_mint = Mint::unpack(yi_mint_account.data).map_err(|e| {
        warn!("Yi mint {} is not a valid mint", yi_mint_account.key);
        e
    })?;

    if yi_mint.mint_authority != Some(underlying.owner) {
        warn!(
            "Yi underlying account {} is not owned by the authority of mint {}",
            underlying_token_account.key, yi_mint_account.key
        );
        return Err(ScopeError::UnexpectedAccount);
    }

    let price = ratio_to_price(underlying.amount.into(), yi_mint.supply.into(), DECIMALS)?;

    Ok(DatedPrice::new(
        price,
        clock.slot,
        clock.unix_timestamp_u64(),
    ))
}

pub fn validate_token_account(underlying_token_account: &AccountInfo) -> ScopeResult<()> {
    TokenAccount::unpack(underlying_token_account.data)?;
    Ok(())
}
