use bytemuck::{Pod, Zeroable};
use solana_pubkey::Pubkey;

use crate::{oracles::OracleType, utils::consts::*, ScopeError, ScopeResult, MAX_ENTRIES};

/// Length of the optional upstream feed name stored next to each mapping
pub const REF_FEED_NAME_LEN: usize = 16;

static_assertions::const_assert_eq!(ORACLE_MAPPING_SIZE, std::mem::size_of::<OracleMappings>());
static_assertions::const_assert_eq!(0, std::mem::size_of::<OracleMappings>() % 8);
// Registry associating each token index to its upstream price account
#[derive(Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct OracleMappings {
    pub price_info_accounts: [Pubkey; MAX_ENTRIES],
    pub price_types: [u8; MAX_ENTRIES],
    pub twap_enabled: [u8; MAX_ENTRIES], // true or false
    pub twap_window: [u8; MAX_ENTRIES], // number of observations averaged by the TWAP
    /// reference price against which we check confidence within 5%
    pub ref_price: [u16; MAX_ENTRIES],
    pub ref_feed_names: [[u8; REF_FEED_NAME_LEN]; MAX_ENTRIES],
    /// Account read after the price account, for the oracle types needing one
    pub extra_price_info_accounts: [Pubkey; MAX_ENTRIES],
    pub twap_source: [u16; MAX_ENTRIES], // meaningful only if type == ScopeTwap
}

/// Optional settings of a mapping entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MappingOptions {
    pub twap_enabled: bool,
    /// Number of observations of the TWAP, `None` keeps the maximum
    pub twap_window: Option<u8>,
    pub ref_price: Option<u16>,
    pub ref_feed_name: [u8; REF_FEED_NAME_LEN],
    /// Pinned extra account, required by the oracle types reading one (Yi mint)
    pub extra_account: Option<Pubkey>,
    /// Token whose TWAP is published, required by [`OracleType::ScopeTwap`]
    pub twap_source: Option<u16>,
}

/// Decoded view of one entry of [`OracleMappings`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappingEntry {
    pub price_info_account: Pubkey,
    pub price_type: OracleType,
    pub twap_enabled: bool,
    pub twap_window: u8,
    pub ref_price: Option<u16>,
    pub extra_account: Option<Pubkey>,
    pub twap_source: Option<u16>,
}

fn check_entry_id(entry_id: usize) -> ScopeResult<usize> {
    if entry_id < MAX_ENTRIES {
        Ok(entry_id)
    } else {
        Err(ScopeError::SlotOutOfRange)
    }
}

impl OracleMappings {
    /// Resolve the mapping of a token.
    ///
    /// Fails with [`ScopeError::SlotInactive`] when no upstream account is configured.
    pub fn get_entry(&self, entry_id: usize) -> ScopeResult<MappingEntry> {
        let entry_id = check_entry_id(entry_id)?;
        let price_info_account = self.price_info_accounts[entry_id];
        if price_info_account == Pubkey::default() {
            return Err(ScopeError::SlotInactive);
        }
        Ok(MappingEntry {
            price_info_account,
            price_type: self.get_entry_type(entry_id)?,
            twap_enabled: self.is_twap_enabled(entry_id),
            twap_window: self.get_twap_window(entry_id),
            ref_price: self.get_ref_price(entry_id),
            extra_account: self.get_extra_account(entry_id),
            twap_source: self.get_twap_source(entry_id),
        })
    }

    pub fn get_entry_type(&self, entry_id: usize) -> ScopeResult<OracleType> {
        let entry_id = check_entry_id(entry_id)?;
        OracleType::try_from(self.price_types[entry_id]).map_err(|_| ScopeError::BadTokenType)
    }

    pub fn is_twap_enabled(&self, entry_id: usize) -> bool {
        self.twap_enabled.get(entry_id).is_some_and(|e| *e > 0)
    }

    pub fn get_twap_window(&self, entry_id: usize) -> u8 {
        match self.twap_window.get(entry_id) {
            Some(0) | None => crate::TWAP_NUM_OBS as u8,
            Some(window) => *window,
        }
    }

    pub fn is_entry_used(&self, entry_id: usize) -> bool {
        self.price_info_accounts
            .get(entry_id)
            .is_some_and(|pk| *pk != Pubkey::default())
    }

    pub fn get_ref_price(&self, entry_id: usize) -> Option<u16> {
        match self.ref_price.get(entry_id) {
            Some(&u16::MAX) | None => None,
            Some(raw_ref_price) => Some(*raw_ref_price),
        }
    }

    pub fn get_extra_account(&self, entry_id: usize) -> Option<Pubkey> {
        self.extra_price_info_accounts
            .get(entry_id)
            .copied()
            .filter(|pk| *pk != Pubkey::default())
    }

    pub fn get_twap_source(&self, entry_id: usize) -> Option<u16> {
        match self.twap_source.get(entry_id) {
            Some(&u16::MAX) | None => None,
            Some(source) => Some(*source),
        }
    }

    pub fn get_ref_feed_name(&self, entry_id: usize) -> Option<&str> {
        let raw = self.ref_feed_names.get(entry_id)?;
        let name = std::str::from_utf8(raw).ok()?.trim_end_matches('\0');
        (!name.is_empty()).then_some(name)
    }

    pub(crate) fn reset_entry(&mut self, entry_id: usize) -> ScopeResult<()> {
        let entry_id = check_entry_id(entry_id)?;
        self.price_info_accounts[entry_id] = Pubkey::default();
        self.price_types[entry_id] = 0;
        self.twap_enabled[entry_id] = false as u8;
        self.twap_window[entry_id] = 0;
        self.ref_price[entry_id] = u16::MAX;
        self.ref_feed_names[entry_id] = [0; REF_FEED_NAME_LEN];
        self.extra_price_info_accounts[entry_id] = Pubkey::default();
        self.twap_source[entry_id] = u16::MAX;
        Ok(())
    }

    pub(crate) fn set_entry_mapping(
        &mut self,
        entry_id: usize,
        price_info: Pubkey,
        price_type: OracleType,
        options: MappingOptions,
    ) -> ScopeResult<()> {
        let entry_id = check_entry_id(entry_id)?;
        if let Some(ref_price) = options.ref_price {
            if usize::from(ref_price) >= MAX_ENTRIES || usize::from(ref_price) == entry_id {
                return Err(ScopeError::SlotOutOfRange);
            }
        }
        let twap_window = match options.twap_window {
            None => crate::TWAP_NUM_OBS as u8,
            Some(window) if (crate::MIN_TWAP_WINDOW..=crate::TWAP_NUM_OBS)
                .contains(&usize::from(window)) =>
            {
                window
            }
            Some(_) => return Err(ScopeError::OutOfRangeIntegralConversion),
        };
        let extra_account = if price_type.extra_accounts_count() > 0 {
            match options.extra_account {
                Some(pk) if pk != Pubkey::default() => pk,
                _ => return Err(ScopeError::MissingExtraAccount),
            }
        } else {
            Pubkey::default()
        };
        let twap_source = if price_type.is_twap() {
            match options.twap_source {
                Some(source) if usize::from(source) < MAX_ENTRIES
                    && usize::from(source) != entry_id =>
                {
                    source
                }
                _ => return Err(ScopeError::InvalidTwapSource),
            }
        } else {
            u16::MAX
        };
        self.price_info_accounts[entry_id] = price_info;
        self.price_types[entry_id] = price_type.into();
        self.twap_enabled[entry_id] = options.twap_enabled as u8;
        self.twap_window[entry_id] = twap_window;
        self.ref_price[entry_id] = options.ref_price.unwrap_or(u16::MAX);
        self.ref_feed_names[entry_id] = options.ref_feed_name;
        self.extra_price_info_accounts[entry_id] = extra_account;
        self.twap_source[entry_id] = twap_source;
        Ok(())
    }

    pub fn to_debug_print_entry(&self, entry_id: usize) -> DebugPrintMappingEntry {
        DebugPrintMappingEntry {
            entry_id,
            mappings: self,
        }
    }
}

pub struct DebugPrintMappingEntry<'a> {
    pub entry_id: usize,
    pub mappings: &'a OracleMappings,
}

impl std::fmt::Debug for DebugPrintMappingEntry<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let entry_id = self.entry_id;
        let mappings = self.mappings;
        let mut d = f.debug_struct("OracleMappingEntry");
        d.field("entry_id", &entry_id);
        match mappings.get_entry(entry_id) {
            Ok(entry) => d
                .field("price_type", &entry.price_type)
                .field("price_info_account", &entry.price_info_account)
                .field("twap_enabled", &entry.twap_enabled)
                .field("twap_window", &entry.twap_window)
                .field(
                    "ref_price_index",
                    if let Some(ref_price) = &entry.ref_price {
                        ref_price
                    } else {
                        &"None"
                    },
                )
                .field("ref_feed_name", &mappings.get_ref_feed_name(entry_id))
                .field("extra_account", &entry.extra_account)
                .field("twap_source", &entry.twap_source)
                .finish(),
            Err(e) => d.field("error", &e).finish(),
        }
    }
}
