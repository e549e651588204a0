//! Logger setup
//!
//! Everything in the workspace logs through the `log` facade; this wires
//! it to `env_logger`. `RUST_LOG` overrides the default filter.

use log::LevelFilter;

/// Initialize logging at `info` unless `RUST_LOG` says otherwise.
/// Safe to call more than once.
pub fn init() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}

/// Debug-level logging captured by the test harness.
pub fn init_for_tests() {
    let _ = env_logger::builder()
        .is_test(true)
        .filter_level(LevelFilter::Debug)
        .try_init();
}
