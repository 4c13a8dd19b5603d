//! JSON description of the tokens of a feed.
//!
//! ```json
//! {
//!   "default_max_age": 30,
//!   "tokens": {
//!     "0": {
//!       "label": "SOL/USD",
//!       "oracle_type": "Pyth",
//!       "oracle_mapping": "J83w4HKfqxwcq3BEMMkPFSppX3gqekLyLJBexebFVkix"
//!     }
//!   }
//! }
//! ```

use std::{collections::BTreeMap, fs::File, io::BufReader, path::Path};

use serde::{Deserialize, Serialize};
use solana_pubkey::Pubkey;
use thiserror::Error;
use tracing::info;

use crate::{
    feed::ScopeFeed, oracles::OracleType, states::token_metadatas::TOKEN_NAME_LEN, AdminCap,
    MappingOptions, ScopeError, MAX_ENTRIES, MIN_TWAP_WINDOW, TWAP_NUM_OBS,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot access the configuration file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid configuration format: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid configuration of token {token}: {reason}")]
    Invalid { token: u16, reason: String },
    #[error(transparent)]
    Scope(#[from] ScopeError),
}

pub type ConfigResult<T = ()> = Result<T, ConfigError>;

/// Format of storage of a feed configuration
#[derive(Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScopeConfig {
    /// Default max age of the prices, in seconds
    pub default_max_age: u64,
    /// Tokens by index in the feed registries
    #[serde(default)]
    pub tokens: BTreeMap<u16, TokenConfig>,
}

/// Configuration of the tokens
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenConfig {
    /// Name of the pair (used for display)
    /// eg. "SOL/USD"
    pub label: String,
    /// Type of oracle providing the price.
    pub oracle_type: OracleType,
    /// Optional specific token max age (in seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_age: Option<u64>,
    /// Onchain account used as source for the exchange rate.
    #[serde(with = "serde_string")] // Use bs58 for serialization
    pub oracle_mapping: Pubkey,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub twap_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twap_window: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_price: Option<u16>,
    /// Account read after `oracle_mapping` (mint of a Yi token)
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_opt_string"
    )]
    pub extra_account: Option<Pubkey>,
    /// Token whose TWAP is published by a `ScopeTwap` token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twap_source: Option<u16>,
}

impl TokenConfig {
    pub fn mapping_options(&self) -> MappingOptions {
        MappingOptions {
            twap_enabled: self.twap_enabled,
            twap_window: self.twap_window,
            ref_price: self.ref_price,
            extra_account: self.extra_account,
            twap_source: self.twap_source,
            ..Default::default()
        }
    }
}

impl ScopeConfig {
    pub fn save_to_file(&self, file_path: impl AsRef<Path>) -> ConfigResult {
        let file = File::create(file_path)?;
        serde_json::to_writer_pretty(file, &self)?;
        Ok(())
    }

    pub fn read_from_file(file_path: impl AsRef<Path>) -> ConfigResult<Self> {
        let file = File::open(file_path)?;
        let buf_reader = BufReader::new(file);
        let config: Self = serde_json::from_reader(buf_reader)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn max_age(&self, token: &TokenConfig) -> u64 {
        token.max_age.unwrap_or(self.default_max_age)
    }

    pub fn validate(&self) -> ConfigResult {
        for (&token, conf) in &self.tokens {
            let invalid = |reason: &str| ConfigError::Invalid {
                token,
                reason: reason.to_owned(),
            };
            if usize::from(token) >= MAX_ENTRIES {
                return Err(invalid("index out of range"));
            }
            if conf.oracle_mapping == Pubkey::default() {
                return Err(invalid("missing oracle mapping"));
            }
            if conf.label.len() > TOKEN_NAME_LEN {
                return Err(invalid("label longer than 32 bytes"));
            }
            if let Some(window) = conf.twap_window {
                if !(MIN_TWAP_WINDOW..=TWAP_NUM_OBS).contains(&usize::from(window)) {
                    return Err(invalid("twap window out of range"));
                }
            }
            if let Some(ref_price) = conf.ref_price {
                if ref_price == token || !self.tokens.contains_key(&ref_price) {
                    return Err(invalid("reference price is not another configured token"));
                }
            }
            if conf.oracle_type.extra_accounts_count() > 0 && conf.extra_account.is_none() {
                return Err(invalid("missing extra account"));
            }
            if conf.oracle_type.is_twap() {
                let source_has_twap = conf
                    .twap_source
                    .filter(|source| *source != token)
                    .and_then(|source| self.tokens.get(&source))
                    .is_some_and(|source| source.twap_enabled);
                if !source_has_twap {
                    return Err(invalid("twap source is not another token with twap enabled"));
                }
            }
        }
        Ok(())
    }

    /// Write the mapping and metadata of every configured token in `feed`.
    ///
    /// Tokens absent from the configuration are left untouched.
    pub fn apply(&self, cap: &AdminCap, feed: &mut ScopeFeed) -> ConfigResult {
        self.validate()?;
        for (&token, conf) in &self.tokens {
            let token_idx = usize::from(token);
            info!(
                "Configuring token {token} ({}) as {} from {}",
                conf.label, conf.oracle_type, conf.oracle_mapping
            );
            feed.set_mapping_key(
                cap,
                token_idx,
                conf.oracle_type,
                conf.oracle_mapping,
                conf.mapping_options(),
            )?;
            feed.set_metadata(cap, token_idx, self.max_age(conf), &conf.label)?;
        }
        Ok(())
    }
}

/// Serialize and deserialize through the `Display` and `FromStr` representation
pub mod serde_string {
    use std::{fmt::Display, str::FromStr};

    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Display,
        S: Serializer,
    {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        T: FromStr,
        T::Err: Display,
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer)?
            .parse()
            .map_err(de::Error::custom)
    }
}

/// [`serde_string`] for optional values
pub mod serde_opt_string {
    use std::{fmt::Display, str::FromStr};

    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Display,
        S: Serializer,
    {
        match value {
            Some(value) => serializer.collect_str(value),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        T: FromStr,
        T::Err: Display,
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)?
            .map(|s| s.parse().map_err(de::Error::custom))
            .transpose()
    }
}
