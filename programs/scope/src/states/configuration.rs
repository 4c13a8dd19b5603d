use bytemuck::{Pod, Zeroable};
use solana_pubkey::Pubkey;
use tracing::warn;

use crate::{utils::consts::CONFIGURATION_SIZE, ScopeError, ScopeResult};

static_assertions::const_assert_eq!(CONFIGURATION_SIZE, std::mem::size_of::<Configuration>());
static_assertions::const_assert_eq!(0, std::mem::size_of::<Configuration>() % 8);
// Configuration account of a price feed
#[derive(Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct Configuration {
    pub admin: Pubkey,
    pub oracle_mappings: Pubkey,
    pub oracle_prices: Pubkey,
    pub tokens_metadata: Pubkey,
    pub oracle_twaps: Pubkey,
    pub admin_cached: Pubkey,
    _padding: [u64; 10],
}

/// Proof that the caller signed as the admin of a feed.
///
/// Only [`Configuration::authorize`] can build one, every mutation of the mapping registry
/// or of the metadata table requires it.
#[derive(Debug)]
pub struct AdminCap {
    admin: Pubkey,
}

impl AdminCap {
    pub fn admin(&self) -> &Pubkey {
        &self.admin
    }
}

impl Configuration {
    pub fn new(
        admin: Pubkey,
        oracle_mappings: Pubkey,
        oracle_prices: Pubkey,
        tokens_metadata: Pubkey,
        oracle_twaps: Pubkey,
    ) -> Self {
        Self {
            admin,
            oracle_mappings,
            oracle_prices,
            tokens_metadata,
            oracle_twaps,
            admin_cached: Pubkey::default(),
            _padding: [0; 10],
        }
    }

    pub fn authorize(&self, signer: &Pubkey) -> ScopeResult<AdminCap> {
        if *signer != self.admin || *signer == Pubkey::default() {
            warn!("Signer {signer} is not the admin of the feed");
            return Err(ScopeError::Unauthorized);
        }
        Ok(AdminCap { admin: *signer })
    }

    /// Check that `cap` was issued by the current admin of this feed.
    pub fn check_cap(&self, cap: &AdminCap) -> ScopeResult<()> {
        if cap.admin != self.admin {
            warn!(
                "Admin capability of {} does not match the feed admin {}",
                cap.admin, self.admin
            );
            return Err(ScopeError::Unauthorized);
        }
        Ok(())
    }
}
