pub mod handler_approve_admin_cached;
pub mod handler_initialize;
pub mod handler_refresh_prices;
pub mod handler_reset_twap;
pub mod handler_set_admin_cached;
pub mod handler_update_mapping;
pub mod handler_update_token_metadata;

pub use handler_refresh_prices::{RefreshAccounts, RefreshReport, RefreshStatus, TokenRefresh};
pub use handler_update_token_metadata::UpdateTokenMetadataMode;
