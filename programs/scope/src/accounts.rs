//! Read-only views over the raw accounts handed to the core by the runtime.

use solana_pubkey::Pubkey;

/// Key and raw data of an upstream account.
#[derive(Debug, Clone, Copy)]
pub struct AccountInfo<'a> {
    pub key: &'a Pubkey,
    pub data: &'a [u8],
}

impl<'a> AccountInfo<'a> {
    pub fn new(key: &'a Pubkey, data: &'a [u8]) -> Self {
        Self { key, data }
    }

    /// Padding entry of a fixed-width refresh batch.
    pub fn is_placeholder(&self) -> bool {
        *self.key == Pubkey::default()
    }
}

/// Time reference of a refresh, stamped on every written price.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Clock {
    pub slot: u64,
    pub epoch_start_timestamp: i64,
    pub epoch: u64,
    pub unix_timestamp: i64,
}

impl Clock {
    /// Timestamp as stored in prices; times before the unix epoch are clamped to 0.
    pub fn unix_timestamp_u64(&self) -> u64 {
        u64::try_from(self.unix_timestamp).unwrap_or(0)
    }
}
