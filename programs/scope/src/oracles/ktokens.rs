use bytemuck::{Pod, Zeroable};
use solana_pubkey::Pubkey;
use tracing::warn;

use crate::{
    utils::{
        anchor_discriminator,
        consts::MAX_PRICE_EXP,
        math::{price_of_lamports_to_price_of_tokens, u64_div_to_price},
        zero_copy_deserialize,
    },
    AccountInfo, Clock, DatedPrice, DecodeError, Price, ScopeError, ScopeResult,
};

/// Strategy status of a retired strategy, its shares are not priced anymore.
const STRATEGY_STATUS_FROZEN: u64 = 3;

/// Condensed header of a kamino strategy account.
///
/// This is not the field order of the deployed strategy program: the fields needed for pricing
/// are packed first, after the anchor discriminator. Accounts are expected in this layout.
/// The position and reward bookkeeping that follows it is ignored.
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct WhirlpoolStrategy {
    pub admin_authority: Pubkey,
    pub global_config: Pubkey,
    pub status: u64,
    pub pool: Pubkey,
    pub token_a_mint: Pubkey,
    pub token_b_mint: Pubkey,
    pub shares_mint: Pubkey,
    pub shares_mint_decimals: u64,
    pub token_a_mint_decimals: u64,
    pub shares_issued: u64,
    pub token_a_invested: u64,
    pub token_a_uninvested: u64,
}

impl WhirlpoolStrategy {
    pub fn discriminator() -> [u8; 8] {
        anchor_discriminator("WhirlpoolStrategy")
    }

    pub fn load(k_account: &AccountInfo) -> Result<Self, DecodeError> {
        zero_copy_deserialize(k_account, &Self::discriminator())
    }

    /// Underlying token amount owned by the strategy, in lamports
    pub fn holdings(&self) -> ScopeResult<u64> {
        self.token_a_invested
            .checked_add(self.token_a_uninvested)
            .ok_or(ScopeError::MathOverflow)
    }
}

/// Gives the price of 1 kToken in its underlying token
///
/// This is the underlying holdings (invested and uninvested) divided by the number of shares issued.
/// Reward tokens are excluded from the calculation.
pub fn get_price(k_account: &AccountInfo, clock: &Clock) -> ScopeResult<DatedPrice> {
    let strategy = WhirlpoolStrategy::load(k_account)?;

    if strategy.status == STRATEGY_STATUS_FROZEN {
        warn!("Ktoken strategy {} is frozen", k_account.key);
        return Err(DecodeError::StaleOrInvalid.into());
    }

    let price = get_price_per_full_share(
        strategy.holdings()?,
        strategy.shares_issued,
        strategy.shares_mint_decimals,
        strategy.token_a_mint_decimals,
    )
    .map_err(|e| {
        warn!(
            "Error computing the share price of ktoken {}: {e:?}",
            k_account.key
        );
        e
    })?;

    Ok(DatedPrice::new(
        price,
        clock.slot,
        clock.unix_timestamp_u64(),
    ))
}

pub fn validate_strategy(k_account: &AccountInfo) -> ScopeResult<()> {
    WhirlpoolStrategy::load(k_account)?;
    Ok(())
}

fn get_price_per_full_share(
    holdings: u64,
    shares_issued: u64,
    shares_decimals: u64,
    underlying_decimals: u64,
) -> ScopeResult<Price> {
    let lamport_price = u64_div_to_price(holdings, shares_issued)?;
    let price =
        price_of_lamports_to_price_of_tokens(lamport_price, shares_decimals, underlying_decimals)?;
    if price.exp > MAX_PRICE_EXP {
        price.rescale(MAX_PRICE_EXP)
    } else {
        Ok(price)
    }
}
