use tracing::info;

use crate::{AdminCap, Configuration, OracleTwaps, ScopeResult};

/// Drop every sample of the TWAP of `token`.
pub fn process(
    cap: &AdminCap,
    configuration: &Configuration,
    oracle_twaps: &mut OracleTwaps,
    token: usize,
) -> ScopeResult<()> {
    configuration.check_cap(cap)?;

    info!("Reset twap of token {token}");

    crate::oracles::twap::reset_twap(oracle_twaps, token)
}
