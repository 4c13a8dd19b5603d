pub const CONFIGURATION_SIZE: usize = 272;
pub const ORACLE_MAPPING_SIZE: usize = 44544;
pub const ORACLE_PRICES_SIZE: usize = 28704;
pub const TWAP_BUFFER_SIZE: usize = 1088;
pub const ORACLE_TWAPS_SIZE: usize = 557120;
pub const TOKEN_METADATA_SIZE: usize = 81920;

/// Factor used to check confidence interval of oracle prices
/// for pyth prices (confidence interval check) and switchboard prices (standard deviation check)
pub const ORACLE_CONFIDENCE_FACTOR: u64 = 50; // 100% / 2%

pub const SECONDS_PER_HOUR: i64 = 60 * 60;

/// Highest exponent a stored price may carry
pub const MAX_PRICE_EXP: u64 = 18;
