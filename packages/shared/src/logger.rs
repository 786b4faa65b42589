//! Logging setup for the Traveller binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Build the default filter directive for a crate and its binary.
///
/// Crate and binary names are normalized to the `snake_case` target names
/// `tracing` uses, so `traveller-server` becomes `traveller_server`.
pub fn default_directive(crate_name: &str, binary_name: &str, default_log_level: &str) -> String {
    let crate_target = crate_name.replace('-', "_");
    let binary_target = binary_name.replace('-', "_");

    if crate_target == binary_target {
        format!("{}={},tower_http={}", crate_target, default_log_level, default_log_level)
    } else {
        format!(
            "{}={},{}={},tower_http={}",
            crate_target, default_log_level, binary_target, default_log_level, default_log_level
        )
    }
}

/// Initialize the tracing subscriber with the specified default log level.
///
/// The level can be overridden with the `RUST_LOG` environment variable.
///
/// # Arguments
///
/// * `crate_name` - The calling crate, usually `env!("CARGO_PKG_NAME")`
/// * `binary_name` - The binary, usually `env!("CARGO_BIN_NAME")`
/// * `default_log_level` - e.g. "debug", "info", "warn"
///
/// # Examples
///
/// ```no_run
/// use traveller_shared::logger::setup_logger;
///
/// setup_logger("traveller-server", "traveller-server", "debug");
/// ```
pub fn setup_logger(crate_name: &str, binary_name: &str, default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                default_directive(crate_name, binary_name, default_log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
