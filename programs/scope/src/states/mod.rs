use bytemuck::{Pod, Zeroable};

pub mod configuration;
pub mod oracle_mappings;
pub mod oracle_prices;
pub mod oracle_twaps;
pub mod token_metadatas;
pub use configuration::{AdminCap, Configuration};
pub use oracle_mappings::{MappingEntry, MappingOptions, OracleMappings};
pub use oracle_prices::OraclePrices;
pub use oracle_twaps::{OracleTwaps, TwapBuffer, TwapUpdate};
pub use token_metadatas::{TokenMetadata, TokenMetadatas};

#[derive(Debug, Default, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct Price {
    // Integer + exponent representation
    // decimal price would be
    // as integer: 6462236900000, exponent: 8
    // as float:   64622.36900000

    // value is the scaled integer
    // for example, 6462236900000 for btc
    pub value: u64,

    // exponent represents the number of decimals
    // for example, 8 for btc
    pub exp: u64,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct DatedPrice {
    pub price: Price,
    pub last_updated_slot: u64,
    pub unix_timestamp: u64,
    pub _reserved: [u64; 2],
    pub _reserved2: [u16; 3],
    /// Slot of the registry this price was written to
    pub index: u16,
}

impl DatedPrice {
    pub fn new(price: Price, last_updated_slot: u64, unix_timestamp: u64) -> Self {
        Self {
            price,
            last_updated_slot,
            unix_timestamp,
            ..Default::default()
        }
    }
}
