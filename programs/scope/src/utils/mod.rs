pub mod consts;
pub mod macros;
pub mod math;
pub mod pdas;
pub mod price_impl;
pub mod scope_chain;

use bytemuck::AnyBitPattern;
pub use decimal_wad;
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::{AccountInfo, DecodeError};

/// First 8 bytes of `sha256("account:<name>")`, the tag prefixing anchor accounts.
pub fn anchor_discriminator(account_name: &str) -> [u8; 8] {
    let mut hasher = Sha256::new();
    hasher.update(b"account:");
    hasher.update(account_name.as_bytes());
    let hash = hasher.finalize();
    let mut discriminator = [0_u8; 8];
    discriminator.copy_from_slice(&hash[..8]);
    discriminator
}

/// Read a `T` laid out at `offset` in the account data.
pub fn read_pod_at<T: AnyBitPattern>(
    account: &AccountInfo<'_>,
    offset: usize,
) -> Result<T, DecodeError> {
    let end = offset + std::mem::size_of::<T>();
    let bytes = account.data.get(offset..end).ok_or_else(|| {
        warn!(
            "Account {} does not have enough bytes to be deserialized ({} < {end})",
            account.key,
            account.data.len()
        );
        DecodeError::MalformedLayout
    })?;
    bytemuck::try_pod_read_unaligned(bytes).map_err(|e| {
        warn!("Account {} deserialization failed: {e:?}", account.key);
        DecodeError::MalformedLayout
    })
}

/// Read an anchor account: check the 8 bytes discriminator then read `T` right after it.
pub fn zero_copy_deserialize<T: AnyBitPattern>(
    account: &AccountInfo<'_>,
    discriminator: &[u8; 8],
) -> Result<T, DecodeError> {
    let disc_bytes = account.data.get(..8).ok_or_else(|| {
        warn!(
            "Account {} does not have enough bytes to be deserialized",
            account.key
        );
        DecodeError::MalformedLayout
    })?;
    if disc_bytes != discriminator {
        warn!(
            "Expected discriminator for account {} ({:?}) is different from received {:?}",
            account.key, discriminator, disc_bytes
        );
        return Err(DecodeError::MalformedLayout);
    }
    read_pod_at(account, 8)
}
