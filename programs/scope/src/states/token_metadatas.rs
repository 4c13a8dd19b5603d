use bytemuck::{Pod, Zeroable};

use super::DatedPrice;
use crate::{utils::consts::*, ScopeError, ScopeResult, MAX_ENTRIES};

pub const TOKEN_NAME_LEN: usize = 32;

static_assertions::const_assert_eq!(TOKEN_METADATA_SIZE, std::mem::size_of::<TokenMetadatas>());
static_assertions::const_assert_eq!(0, std::mem::size_of::<TokenMetadatas>() % 8);
#[derive(Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct TokenMetadatas {
    pub metadatas_array: [TokenMetadata; MAX_ENTRIES],
}

impl TokenMetadatas {
    pub fn get(&self, entry_id: usize) -> ScopeResult<&TokenMetadata> {
        self.metadatas_array
            .get(entry_id)
            .ok_or(ScopeError::SlotOutOfRange)
    }

    pub fn get_mut(&mut self, entry_id: usize) -> ScopeResult<&mut TokenMetadata> {
        self.metadatas_array
            .get_mut(entry_id)
            .ok_or(ScopeError::SlotOutOfRange)
    }
}

#[derive(Clone, Copy, Pod, Zeroable, PartialEq, Eq, Default)]
#[repr(C)]
pub struct TokenMetadata {
    pub name: [u8; TOKEN_NAME_LEN],
    /// A price older than this is stale
    pub max_age_price_seconds: u64,
    pub _reserved: [u64; 15],
}

impl TokenMetadata {
    pub fn get_name(&self) -> &str {
        // names are only written through `set_name` which stores valid utf-8
        std::str::from_utf8(&self.name)
            .unwrap_or_default()
            .trim_end_matches('\0')
    }

    pub fn set_name(&mut self, name: &str) -> ScopeResult<()> {
        self.set_name_bytes(name.as_bytes())
    }

    pub fn set_name_bytes(&mut self, bytes: &[u8]) -> ScopeResult<()> {
        if bytes.len() > TOKEN_NAME_LEN || std::str::from_utf8(bytes).is_err() {
            return Err(ScopeError::InvalidTokenMetadataName);
        }
        let mut padded_name = [0_u8; TOKEN_NAME_LEN];
        padded_name[..bytes.len()].copy_from_slice(bytes);
        self.name = padded_name;
        Ok(())
    }

    /// Whether `price` is too old at `now` for this token.
    pub fn is_stale(&self, price: &DatedPrice, now: i64) -> bool {
        let now = u64::try_from(now).unwrap_or(0);
        now.saturating_sub(price.unix_timestamp) > self.max_age_price_seconds
    }

    pub fn reset(&mut self) {
        *self = TokenMetadata::default();
    }
}

impl std::fmt::Debug for TokenMetadata {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenMetadata")
            .field("name", &self.get_name())
            .field("max_age_price_seconds", &self.max_age_price_seconds)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Price;

    #[test]
    fn name_round_trip() {
        let mut metadata = TokenMetadata::default();
        metadata.set_name("SOL/USD").unwrap();
        assert_eq!(metadata.get_name(), "SOL/USD");
        assert_eq!(
            metadata.set_name(&"x".repeat(33)),
            Err(ScopeError::InvalidTokenMetadataName)
        );
        assert_eq!(metadata.get_name(), "SOL/USD");
    }

    #[test]
    fn staleness() {
        let metadata = TokenMetadata {
            max_age_price_seconds: 60,
            ..Default::default()
        };
        let price = DatedPrice::new(Price { value: 1, exp: 0 }, 1, 1_000);
        assert!(!metadata.is_stale(&price, 1_060));
        assert!(metadata.is_stale(&price, 1_061));
        // unconfigured tokens are stale as soon as time passes
        assert!(TokenMetadata::default().is_stale(&price, 1_001));
        assert!(!TokenMetadata::default().is_stale(&price, 1_000));
    }
}
