use bytemuck::{Pod, Zeroable};
use solana_pubkey::Pubkey;

use super::DatedPrice;
use crate::{utils::consts::*, ScopeError, ScopeResult, MAX_ENTRIES};

static_assertions::const_assert_eq!(ORACLE_PRICES_SIZE, std::mem::size_of::<OraclePrices>());
static_assertions::const_assert_eq!(0, std::mem::size_of::<OraclePrices>() % 8);
// Account to store dated prices
#[derive(Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct OraclePrices {
    pub oracle_mappings: Pubkey,
    pub prices: [DatedPrice; MAX_ENTRIES],
}

impl OraclePrices {
    pub fn get_price(&self, entry_id: usize) -> ScopeResult<DatedPrice> {
        self.prices
            .get(entry_id)
            .copied()
            .ok_or(ScopeError::SlotOutOfRange)
    }

    pub fn get_price_mut(&mut self, entry_id: usize) -> ScopeResult<&mut DatedPrice> {
        self.prices
            .get_mut(entry_id)
            .ok_or(ScopeError::SlotOutOfRange)
    }

    /// Seconds elapsed between the last refresh of `entry_id` and `now`.
    pub fn price_age(&self, entry_id: usize, now: i64) -> ScopeResult<u64> {
        let price = self.get_price(entry_id)?;
        let now = u64::try_from(now).unwrap_or(0);
        Ok(now.saturating_sub(price.unix_timestamp))
    }

    pub fn reset_entry(&mut self, entry_id: usize) -> ScopeResult<()> {
        *self.get_price_mut(entry_id)? = DatedPrice::default();
        Ok(())
    }
}
