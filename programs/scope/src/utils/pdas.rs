//! Deterministic addresses of the accounts composing a price feed.
//!
//! A feed is identified by its name; each of its registries gets a stable key derived from
//! the feed name and a per-registry seed so that registries can reference each other.

use sha2::{Digest, Sha256};
use solana_pubkey::Pubkey;

pub mod seeds {
    pub const ORACLE_MAPPINGS: &[u8] = b"mappings";
    pub const ORACLE_PRICES: &[u8] = b"prices";
    pub const ORACLE_TWAPS: &[u8] = b"twaps";
    pub const TOKEN_METADATAS: &[u8] = b"metadatas";
}

pub fn feed_account_pubkey(seed: &[u8], feed_name: &str) -> Pubkey {
    let mut hasher = Sha256::new();
    hasher.update(seed);
    hasher.update(feed_name.as_bytes());
    let mut bytes = [0_u8; 32];
    bytes.copy_from_slice(&hasher.finalize());
    Pubkey::new_from_array(bytes)
}
