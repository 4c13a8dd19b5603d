pub mod ctokens;
pub mod ktokens;
pub mod msol_stake;
pub mod pyth;
pub mod pyth_ema;
pub mod spl_stake;
pub mod switchboard_v1;
pub mod switchboard_v2;
pub mod twap;
pub mod yitoken;

use num_enum::{IntoPrimitive, TryFromPrimitive};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::{
    AccountInfo, Clock, DatedPrice, OracleMappings, OracleTwaps, ScopeError, ScopeResult,
};

#[derive(
    IntoPrimitive,
    TryFromPrimitive,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Debug,
    Hash,
    Display,
    EnumIter,
    EnumString,
)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum OracleType {
    Pyth = 0,
    /// Switchboard v1 aggregator, the price is the result of the last completed round
    SwitchboardV1 = 1,
    SwitchboardV2 = 2,
    /// Yi vault token: amount of underlying in the vault per share
    YiToken = 3,
    /// Solend tokens
    CToken = 4,
    /// SPL Stake Pool token (giving the stake rate in SOL):
    /// This oracle type provide a reference and is not meant to be used directly
    /// to get the value of the token because of different limitations:
    /// - The stake rate is only updated once per epoch and can be delayed by one hour after a new epoch.
    /// - The stake rate does not take into account the fees that applies on staking or unstaking.
    /// - Unstaking is not immediate and the market price is often lower than the "stake price".
    SplStake = 5,
    /// KTokens from Kamino
    KToken = 6,
    /// Pyth Exponentially-Weighted Moving Average
    PythEMA = 7,
    /// MSOL Stake Pool token
    /// Same limitations as [`OracleType::SplStake`], the stake rate is only updated once per epoch.
    MsolStake = 8,
    /// TWAP of another token of the feed
    ScopeTwap = 11,
}

impl OracleType {
    /// Get the number of compute unit needed to refresh the price of a token
    pub fn get_update_cu_budget(&self) -> u32 {
        match self {
            OracleType::Pyth | OracleType::PythEMA => 20_000,
            OracleType::SwitchboardV1 => 25_000,
            OracleType::SwitchboardV2 => 30_000,
            OracleType::YiToken => 25_000,
            OracleType::CToken => 130_000,
            OracleType::SplStake => 20_000,
            OracleType::KToken => 120_000,
            OracleType::MsolStake => 20_000,
            OracleType::ScopeTwap => 10_000,
        }
    }

    pub fn is_twap(&self) -> bool {
        matches!(self, OracleType::ScopeTwap)
    }

    /// Number of accounts read after the price account
    pub fn extra_accounts_count(&self) -> usize {
        match self {
            OracleType::YiToken => 1,
            _ => 0,
        }
    }

    /// Prices derived from an on-chain balance rather than pushed by a publisher.
    ///
    /// They change whenever the underlying accounts change so they must be re-read
    /// on every refresh.
    pub fn is_polled(&self) -> bool {
        matches!(
            self,
            OracleType::YiToken
                | OracleType::CToken
                | OracleType::SplStake
                | OracleType::KToken
                | OracleType::MsolStake
        )
    }
}

/// Get the price for a given oracle type
///
/// The `base_account` should have been checked against the oracle mapping
/// If needed the `extra_accounts` will be extracted from the provided iterator and checked
/// with the data contained in the `base_account`
/// `index` is the token being refreshed, used by the types reading the feed itself
pub fn get_price<'a, 'b>(
    price_type: OracleType,
    base_account: &AccountInfo<'a>,
    extra_accounts: &mut impl Iterator<Item = &'b AccountInfo<'a>>,
    clock: &Clock,
    oracle_mappings: &OracleMappings,
    oracle_twaps: &OracleTwaps,
    index: usize,
) -> ScopeResult<DatedPrice>
where
    'a: 'b,
{
    match price_type {
        OracleType::Pyth => pyth::get_price(base_account, clock),
        OracleType::PythEMA => pyth_ema::get_price(base_account, clock),
        OracleType::SwitchboardV1 => switchboard_v1::get_price(base_account),
        OracleType::SwitchboardV2 => switchboard_v2::get_price(base_account),
        OracleType::YiToken => {
            let mint_account = extra_accounts
                .next()
                .ok_or(ScopeError::AccountsAndTokenMismatch)?;
            yitoken::get_price(base_account, mint_account, clock)
        }
        OracleType::CToken => ctokens::get_price(base_account, clock),
        OracleType::SplStake => spl_stake::get_price(base_account, clock),
        OracleType::KToken => ktokens::get_price(base_account, clock),
        OracleType::MsolStake => msol_stake::get_price(base_account, clock),
        OracleType::ScopeTwap => twap::get_twap_of_source(oracle_mappings, oracle_twaps, index),
    }
}

/// Validate the given account as being an appropriate price account for the
/// given oracle type.
///
/// This function shall be called before update of oracle mappings
pub fn validate_oracle_account(
    price_type: OracleType,
    price_account: &AccountInfo,
) -> ScopeResult<()> {
    match price_type {
        OracleType::Pyth | OracleType::PythEMA => pyth::validate_pyth_price_info(price_account),
        OracleType::SwitchboardV1 => switchboard_v1::validate_aggregator(price_account),
        OracleType::SwitchboardV2 => switchboard_v2::validate_aggregator(price_account),
        OracleType::YiToken => yitoken::validate_token_account(price_account),
        OracleType::CToken => ctokens::validate_reserve(price_account),
        OracleType::SplStake => spl_stake::validate_stake_pool(price_account),
        OracleType::KToken => ktokens::validate_strategy(price_account),
        OracleType::MsolStake => msol_stake::validate_state(price_account),
        // The twaps registry of the feed, checked against the configuration on mapping
        OracleType::ScopeTwap => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn oracle_type_wire_values() {
        let values: Vec<u8> = OracleType::iter().map(u8::from).collect();
        assert_eq!(values, vec![0, 1, 2, 3, 4, 5, 6, 7, 8, 11]);
        assert_eq!(OracleType::try_from(11_u8).unwrap(), OracleType::ScopeTwap);
        assert_eq!(OracleType::try_from(7_u8).unwrap(), OracleType::PythEMA);
        assert!(OracleType::try_from(9_u8).is_err());
        assert!(OracleType::try_from(12_u8).is_err());
        assert_eq!(OracleType::MsolStake.to_string(), "MsolStake");
        assert_eq!("CToken".parse::<OracleType>().unwrap(), OracleType::CToken);
    }

    #[test]
    fn only_yitoken_needs_extra_accounts() {
        for oracle_type in OracleType::iter() {
            let expected = usize::from(oracle_type == OracleType::YiToken);
            assert_eq!(oracle_type.extra_accounts_count(), expected);
            assert!(oracle_type.get_update_cu_budget() > 0);
        }
        assert!(OracleType::YiToken.is_polled());
        assert!(!OracleType::Pyth.is_polled());
        assert!(OracleType::ScopeTwap.is_twap());
        assert!(!OracleType::ScopeTwap.is_polled());
    }
}
