#![allow(dead_code)]

pub mod fixtures;
pub mod mock_oracles;
pub mod types;

use tracing_subscriber::EnvFilter;

/// Route the crate logs to the test output, filtered by `RUST_LOG`.
pub fn init_logs() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
