//! A price feed: the registries of one feed name and the operations over them.

use solana_pubkey::Pubkey;

use crate::{
    handlers::{
        handler_approve_admin_cached, handler_initialize, handler_refresh_prices,
        handler_reset_twap, handler_set_admin_cached, handler_update_mapping,
        handler_update_token_metadata, RefreshAccounts, RefreshReport, TokenRefresh,
        UpdateTokenMetadataMode,
    },
    oracles::{twap, OracleType},
    utils::scope_chain::{get_price_from_chain, RawChain},
    AccountInfo, AdminCap, Clock, Configuration, DatedPrice, MappingEntry, MappingOptions,
    OracleMappings,
    OraclePrices, OracleTwaps, Price, ScopeResult, TokenMetadatas, REFRESH_BATCH_SIZE,
};

/// The registries are only written through the operations below, every admin operation
/// requires an [`AdminCap`] of this feed.
pub struct ScopeFeed {
    pub(crate) feed_name: String,
    pub(crate) configuration: Configuration,
    pub(crate) oracle_mappings: Box<OracleMappings>,
    pub(crate) oracle_prices: Box<OraclePrices>,
    pub(crate) oracle_twaps: Box<OracleTwaps>,
    pub(crate) tokens_metadata: Box<TokenMetadatas>,
}

impl ScopeFeed {
    pub fn new(admin: Pubkey, feed_name: &str) -> ScopeResult<Self> {
        handler_initialize::process(admin, feed_name)
    }

    pub fn feed_name(&self) -> &str {
        &self.feed_name
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    pub fn oracle_mappings(&self) -> &OracleMappings {
        &self.oracle_mappings
    }

    pub fn oracle_prices(&self) -> &OraclePrices {
        &self.oracle_prices
    }

    pub fn oracle_twaps(&self) -> &OracleTwaps {
        &self.oracle_twaps
    }

    pub fn tokens_metadata(&self) -> &TokenMetadatas {
        &self.tokens_metadata
    }

    pub fn authorize(&self, signer: &Pubkey) -> ScopeResult<AdminCap> {
        self.configuration.authorize(signer)
    }

    fn refresh_ctx<'s>(&'s mut self, clock: &'s Clock) -> RefreshAccounts<'s> {
        RefreshAccounts {
            oracle_prices: &mut *self.oracle_prices,
            oracle_mappings: &*self.oracle_mappings,
            oracle_twaps: &mut *self.oracle_twaps,
            clock,
        }
    }

    pub fn refresh_one<'a>(
        &mut self,
        clock: &Clock,
        token: u16,
        price_info: &AccountInfo<'a>,
        extra_accounts: &[AccountInfo<'a>],
    ) -> ScopeResult<TokenRefresh> {
        handler_refresh_prices::refresh_one_price(
            &mut self.refresh_ctx(clock),
            token,
            price_info,
            extra_accounts,
        )
    }

    pub fn refresh_batch<'a>(
        &mut self,
        clock: &Clock,
        first_token: u16,
        price_infos: &[AccountInfo<'a>; REFRESH_BATCH_SIZE],
        extra_accounts: &[AccountInfo<'a>],
    ) -> ScopeResult<RefreshReport> {
        handler_refresh_prices::refresh_batch_prices(
            &mut self.refresh_ctx(clock),
            first_token,
            price_infos,
            extra_accounts,
        )
    }

    pub fn refresh_list<'a>(
        &mut self,
        clock: &Clock,
        tokens: &[u16],
        accounts: &[AccountInfo<'a>],
    ) -> ScopeResult<RefreshReport> {
        handler_refresh_prices::refresh_price_list(&mut self.refresh_ctx(clock), tokens, accounts)
    }

    pub fn get_dated_price(&self, token: usize) -> ScopeResult<DatedPrice> {
        self.oracle_prices.get_price(token)
    }

    /// Last stored price of `token` with its age in seconds at `now`.
    pub fn get_price(&self, token: usize, now: i64) -> ScopeResult<(Price, u64)> {
        let price = self.oracle_prices.get_price(token)?;
        let age = self.oracle_prices.price_age(token, now)?;
        Ok((price.price, age))
    }

    pub fn get_twap(&self, token: usize) -> ScopeResult<Price> {
        twap::get_price(&self.oracle_mappings, &self.oracle_twaps, token).map(|twap| twap.price)
    }

    pub fn is_stale(&self, token: usize, now: i64) -> ScopeResult<bool> {
        let price = self.oracle_prices.get_price(token)?;
        Ok(self.tokens_metadata.get(token)?.is_stale(&price, now))
    }

    pub fn get_price_from_chain(&self, chain: &RawChain) -> ScopeResult<DatedPrice> {
        Ok(get_price_from_chain(&self.oracle_prices, chain)?)
    }

    /// Map `token` to `price_info`, or remove its mapping when `price_info` is `None`.
    ///
    /// The TWAP of the token restarts when its source changes.
    pub fn set_mapping(
        &mut self,
        cap: &AdminCap,
        token: usize,
        price_type: OracleType,
        price_info: Option<&AccountInfo>,
        options: MappingOptions,
    ) -> ScopeResult<()> {
        let previous = self.oracle_mappings.get_entry(token).ok();
        handler_update_mapping::process(
            cap,
            &self.configuration,
            &mut self.oracle_mappings,
            token,
            price_type,
            price_info,
            options,
        )?;
        self.reset_twap_on_source_change(token, previous)
    }

    /// Same as [`Self::set_mapping`] without access to the account data.
    pub fn set_mapping_key(
        &mut self,
        cap: &AdminCap,
        token: usize,
        price_type: OracleType,
        price_account: Pubkey,
        options: MappingOptions,
    ) -> ScopeResult<()> {
        let previous = self.oracle_mappings.get_entry(token).ok();
        handler_update_mapping::process_unchecked(
            cap,
            &self.configuration,
            &mut self.oracle_mappings,
            token,
            price_type,
            price_account,
            options,
        )?;
        self.reset_twap_on_source_change(token, previous)
    }

    fn reset_twap_on_source_change(
        &mut self,
        token: usize,
        previous: Option<MappingEntry>,
    ) -> ScopeResult<()> {
        let current = self.oracle_mappings.get_entry(token).ok();
        let same_source = match (&previous, &current) {
            (Some(prev), Some(curr)) => {
                prev.price_info_account == curr.price_info_account
                    && prev.price_type == curr.price_type
            }
            _ => false,
        };
        if !same_source {
            self.oracle_twaps.reset_entry(token)?;
        }
        Ok(())
    }

    pub fn update_token_metadata(
        &mut self,
        cap: &AdminCap,
        token: usize,
        mode: UpdateTokenMetadataMode,
        value: &[u8],
    ) -> ScopeResult<()> {
        handler_update_token_metadata::process(
            cap,
            &self.configuration,
            &mut self.tokens_metadata,
            token,
            mode.to_u64(),
            value,
        )
    }

    pub fn set_metadata(
        &mut self,
        cap: &AdminCap,
        token: usize,
        max_age_price_seconds: u64,
        name: &str,
    ) -> ScopeResult<()> {
        self.update_token_metadata(
            cap,
            token,
            UpdateTokenMetadataMode::MaxPriceAgeSeconds,
            &max_age_price_seconds.to_le_bytes(),
        )?;
        self.update_token_metadata(cap, token, UpdateTokenMetadataMode::Name, name.as_bytes())
    }

    pub fn reset_twap(&mut self, cap: &AdminCap, token: usize) -> ScopeResult<()> {
        handler_reset_twap::process(cap, &self.configuration, &mut self.oracle_twaps, token)
    }

    pub fn set_admin_cached(&mut self, cap: &AdminCap, new_admin: Pubkey) -> ScopeResult<()> {
        handler_set_admin_cached::process(cap, &mut self.configuration, new_admin, &self.feed_name)
    }

    pub fn approve_admin_cached(&mut self, signer: &Pubkey) -> ScopeResult<()> {
        handler_approve_admin_cached::process(signer, &mut self.configuration, &self.feed_name)
    }
}
