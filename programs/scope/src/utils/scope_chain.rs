//! Price chains: a price in a different quotation computed from prices stored in a feed.
//!
//! A feed is not aware of how its prices relate to each other. A chain lists up to
//! [`MAX_CHAIN_LENGTH`] entries of the feed whose prices are multiplied together, for
//! instance `mSOL/SOL × SOL/USDH × USDH/USD` gives `mSOL/USD`.
//!
//! A [`ScopeChainAccount`] stores one chain per foreign token id (up to [`crate::MAX_ENTRIES`]).
//!
//! ## Example
//!
//! Given a feed with the prices:
//!
//! 0. USDH/USD
//! 1. SOL/USDH
//! 2. mSOL/SOL
//!
//! and a consumer with two tokens, `0: SOL` and `1: mSOL`, priced in USD:
//!
//! ```
//! use scope::utils::scope_chain::ScopeChainAccount;
//!
//! let raw_chain: &[&[u16]] = &[
//!     // SOL/USD
//!     &[1_u16, 0],
//!     // mSOL/USD
//!     &[2, 1, 0],
//! ];
//! let mut chains = bytemuck::zeroed_box::<ScopeChainAccount>();
//! chains.update(raw_chain).unwrap();
//! ```
//!
//! Consumers with an enum of their tokens can use [`ScopeChainAccount::auto_chain_update`] with
//! any `Token: IntoEnumIterator + TryInto<PriceChain<ScopeId>>`.

use std::fmt::Debug;

use decimal_wad::decimal::U192;
pub use strum::IntoEnumIterator;
use thiserror::Error;

use crate::{utils::anchor_discriminator, DatedPrice, OraclePrices, Price, ScopeError, MAX_ENTRIES};

/// Maximum length of a chain (4 so the size of one chain is the same as `u64`)
pub const MAX_CHAIN_LENGTH: usize = 4;

/// Id marking an unused link of a chain
const NO_PRICE: u16 = MAX_ENTRIES as u16;

pub type RawChain = [u16; MAX_CHAIN_LENGTH];

#[derive(Clone, Debug)]
pub struct PriceChain<T>([Option<T>; MAX_CHAIN_LENGTH])
where
    T: Into<u16>;

impl<T> TryFrom<&[T]> for PriceChain<T>
where
    T: Into<u16> + Clone + Copy,
{
    type Error = ScopeChainError;

    fn try_from(arr: &[T]) -> Result<Self, Self::Error> {
        if arr.len() > MAX_CHAIN_LENGTH {
            return Err(ScopeChainError::PriceChainTooLong);
        }
        let mut res = [None; MAX_CHAIN_LENGTH];
        for (input, output) in arr.iter().zip(res.iter_mut()) {
            *output = Some(*input);
        }
        Ok(Self(res))
    }
}

impl<T> From<PriceChain<T>> for RawChain
where
    T: Into<u16>,
{
    fn from(chain: PriceChain<T>) -> Self {
        chain.0.map(|v| match v {
            Some(v) => v.into(),
            None => NO_PRICE,
        })
    }
}

pub struct RawChainWrap(RawChain);

impl<T> TryFrom<&[T]> for RawChainWrap
where
    T: Into<u16> + Clone + Copy,
{
    type Error = ScopeChainError;

    fn try_from(arr: &[T]) -> Result<Self, Self::Error> {
        let scope_chain: PriceChain<T> = arr.try_into()?;
        Ok(Self(scope_chain.into()))
    }
}

#[derive(PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable, Clone, Copy)]
#[repr(C)]
pub struct ScopeChainAccount {
    chain_array: [RawChain; MAX_ENTRIES],
}

impl ScopeChainAccount {
    pub fn discriminator() -> [u8; 8] {
        anchor_discriminator("ScopeChainAccount")
    }

    pub fn auto_chain_update<Token, ScopeId>(&mut self) -> Result<(), ScopeChainError>
    where
        Token: TryInto<PriceChain<ScopeId>> + IntoEnumIterator,
        ScopeId: Into<u16> + Copy + Clone,
    {
        let mut chain_iter_mut = self.chain_array.iter_mut();
        for (token, chain) in Token::iter().zip(chain_iter_mut.by_ref()) {
            let scope_chain: PriceChain<ScopeId> = token
                .try_into()
                .map_err(|_| ScopeChainError::PriceChainConversionFailure)?;
            *chain = scope_chain.into();
        }
        // Set all remaining to default value
        for dst in chain_iter_mut.flatten() {
            *dst = NO_PRICE;
        }
        Ok(())
    }

    pub fn update_entry(
        &mut self,
        token_id: usize,
        price_chain: impl TryInto<RawChainWrap>,
    ) -> Result<(), ScopeChainError> {
        let chain: RawChainWrap = price_chain
            .try_into()
            .map_err(|_| ScopeChainError::PriceChainConversionFailure)?;
        let dst = self
            .chain_array
            .get_mut(token_id)
            .ok_or(ScopeChainError::NoChainForToken)?;
        *dst = chain.0;
        Ok(())
    }

    pub fn update<T>(&mut self, base_chain_array: &[T]) -> Result<(), ScopeChainError>
    where
        T: TryInto<RawChainWrap> + Copy,
    {
        let mut chain_iter_mut = self.chain_array.iter_mut();
        for (price_chain, dst) in base_chain_array.iter().zip(chain_iter_mut.by_ref()) {
            let chain: RawChainWrap = (*price_chain)
                .try_into()
                .map_err(|_| ScopeChainError::PriceChainConversionFailure)?;
            *dst = chain.0;
        }
        // Set all remaining to default value
        for dst in chain_iter_mut.flatten() {
            *dst = NO_PRICE;
        }
        Ok(())
    }

    pub fn get_chain(&self, token_id: usize) -> Option<&RawChain> {
        self.chain_array.get(token_id)
    }

    pub fn get_price(
        &self,
        prices: &OraclePrices,
        token_id: usize,
    ) -> Result<DatedPrice, ScopeChainError> {
        let chain = self
            .get_chain(token_id)
            .ok_or(ScopeChainError::NoChainForToken)?;
        get_price_from_chain(prices, chain)
    }
}

/// Multiply the prices of a chain.
///
/// The result has the exponent of the last link (the quotation) and the oldest slot and
/// timestamp of the links.
pub fn get_price_from_chain(
    prices: &OraclePrices,
    chain: &RawChain,
) -> Result<DatedPrice, ScopeChainError> {
    let links: Vec<&DatedPrice> = chain
        .iter()
        .map(|&id| usize::from(id))
        .take_while(|&id| id < MAX_ENTRIES)
        .map(|id| prices.prices.get(id).ok_or(ScopeChainError::NoChainForToken))
        .collect::<Result<_, _>>()?;

    let last = links.last().ok_or(ScopeChainError::NoChainForToken)?;
    // Final number of decimals is the last element one's which should be the quotation price.
    let exp = last.price.exp;

    let last_updated_slot = links
        .iter()
        .map(|price| price.last_updated_slot)
        .min()
        .unwrap_or_default();
    let unix_timestamp = links
        .iter()
        .map(|price| price.unix_timestamp)
        .min()
        .unwrap_or_default();

    let total_decimals: u64 = links
        .iter()
        .try_fold(0_u64, |acc, price| acc.checked_add(price.price.exp))
        .ok_or(ScopeChainError::MathOverflow)?;

    // Compute token value by multiplying all value of the chain
    let product = links
        .iter()
        .try_fold(U192::from(1_u64), |acc, price| {
            acc.checked_mul(U192::from(price.price.value))
        })
        .ok_or(ScopeChainError::MathOverflow)?;

    // Remove the decimals of every link but the last one
    let scale_down_decimals = total_decimals - exp;
    let scale_down_factor = U192::from(10_u64)
        .checked_pow(U192::from(scale_down_decimals))
        .ok_or(ScopeChainError::MathOverflow)?;
    let value = product / scale_down_factor;
    if value > U192::from(u64::MAX) {
        return Err(ScopeChainError::IntegerConversionOverflow);
    }

    Ok(DatedPrice::new(
        Price {
            value: value.as_u64(),
            exp,
        },
        last_updated_slot,
        unix_timestamp,
    ))
}

/// Errors that can be raised while creating or manipulating a scope chain
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ScopeChainError {
    #[error("Too many prices in a chain, cannot be stored")]
    PriceChainTooLong,
    #[error("Conversion to a price chain failed")]
    PriceChainConversionFailure,
    #[error("The token has not a valid chain associated")]
    NoChainForToken,
    #[error("No valid price computed from the provided chain and prices")]
    InvalidPricesInChain,
    #[error("Math overflow while computing a chained price")]
    MathOverflow,
    #[error("Chained price does not fit in a u64")]
    IntegerConversionOverflow,
}

impl From<ScopeChainError> for ScopeError {
    fn from(chain_error: ScopeChainError) -> Self {
        match chain_error {
            ScopeChainError::PriceChainTooLong
            | ScopeChainError::PriceChainConversionFailure
            | ScopeChainError::NoChainForToken
            | ScopeChainError::InvalidPricesInChain => ScopeError::BadScopeChainOrPrices,
            ScopeChainError::MathOverflow => ScopeError::MathOverflow,
            ScopeChainError::IntegerConversionOverflow => ScopeError::IntegerOverflow,
        }
    }
}
