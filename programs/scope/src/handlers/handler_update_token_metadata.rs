use num_enum::TryFromPrimitive;
use tracing::info;

use crate::{AdminCap, Configuration, ScopeError, ScopeResult, TokenMetadatas};

#[derive(TryFromPrimitive, PartialEq, Eq, Clone, Copy, Debug)]
#[repr(u64)]
pub enum UpdateTokenMetadataMode {
    Name = 0,
    MaxPriceAgeSeconds = 1,
}

impl UpdateTokenMetadataMode {
    pub fn to_u64(self) -> u64 {
        self as u64
    }
}

pub fn process(
    cap: &AdminCap,
    configuration: &Configuration,
    tokens_metadata: &mut TokenMetadatas,
    index: usize,
    mode: u64,
    value: &[u8],
) -> ScopeResult<()> {
    configuration.check_cap(cap)?;

    let token_metadata = tokens_metadata.get_mut(index)?;

    let mode: UpdateTokenMetadataMode = mode
        .try_into()
        .map_err(|_| ScopeError::InvalidTokenUpdateMode)?;
    match mode {
        UpdateTokenMetadataMode::MaxPriceAgeSeconds => {
            let value = value
                .get(..8)
                .and_then(|bytes| bytes.try_into().ok())
                .map(u64::from_le_bytes)
                .ok_or(ScopeError::ConversionFailure)?;
            info!("Setting token max age for index {:?} to {}", index, value);
            token_metadata.max_age_price_seconds = value;
        }
        UpdateTokenMetadataMode::Name => {
            token_metadata.set_name_bytes(value)?;
            info!(
                "Setting token name for index {} to {}",
                index,
                token_metadata.get_name()
            );
        }
    }

    Ok(())
}
