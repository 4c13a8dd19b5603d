//! Price oracle aggregator.
//!
//! Upstream price accounts of several protocols are decoded into a common [`Price`]
//! representation, stored in fixed-size registries indexed by token id and optionally
//! averaged over time in per-token TWAP buffers.
//!
//! - [`OracleMappings`] maps every token id to its upstream account and [`oracles::OracleType`].
//! - [`OraclePrices`] keeps the last refreshed [`DatedPrice`] of every token.
//! - [`OracleTwaps`] keeps the recent samples of the tokens with TWAP enabled.
//! - [`TokenMetadatas`] keeps the display name and max age of every token.
//!
//! [`feed::ScopeFeed`] owns the four registries of a feed and exposes the refresh, read and
//! admin operations.

pub mod accounts;
#[cfg(feature = "serde")]
pub mod config;
pub mod errors;
pub mod feed;
pub mod handlers;
pub mod oracles;
pub mod states;
pub mod utils;

pub use num_enum;
pub use solana_pubkey::Pubkey;

pub use crate::{
    accounts::{AccountInfo, Clock},
    errors::*,
    feed::ScopeFeed,
    handlers::{RefreshAccounts, RefreshReport, RefreshStatus, TokenRefresh},
    oracles::OracleType,
    states::*,
    utils::scope_chain,
};

pub const MAX_ENTRIES_U16: u16 = 512;
pub const MAX_ENTRIES: usize = MAX_ENTRIES_U16 as usize;

/// Number of price accounts of a batch refresh
pub const REFRESH_BATCH_SIZE: usize = 8;

/// Capacity of a TWAP buffer, and default window of a TWAP
pub const TWAP_NUM_OBS: usize = 32;
pub const MIN_TWAP_WINDOW: usize = 2;
