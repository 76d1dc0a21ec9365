//! # Application State Management
//!
//! This module handles what the application needs before the engine starts:
//! - Reading the engine configuration
//! - Bootstrapping the logger from it

pub mod config;

use log::LevelFilter;

/// Configures `env_logger` to write to stdout.
///
/// `RUST_LOG` is read first and `filter` (the config's `log_filter`) is applied on top of
/// it. Without either, `info` and above is logged. Calling this more than once is harmless:
/// only the first call installs a logger.
pub fn init_logging(filter: Option<&str>) {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .filter_level(LevelFilter::Info)
        .parse_env("RUST_LOG");
    if let Some(filter) = filter {
        log_builder.parse_filters(filter);
    }

    if log_builder.try_init().is_ok() {
        log::info!("Logger initialized");
    }
}
