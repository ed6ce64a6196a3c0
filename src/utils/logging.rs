use env_logger::{Builder, Env};
use log::debug;

/// Installs an `env_logger` backend, honouring `RUST_LOG` and falling back to `default_filter`.
///
/// Calling this more than once is harmless; later calls leave the first logger in place.
///
/// # Examples
///
/// ```
/// rs_gas_collapse::utils::init_logging("info");
/// rs_gas_collapse::utils::init_logging("debug");
/// ```
pub fn init_logging(default_filter: &str) {
    let result = Builder::from_env(Env::default().default_filter_or(default_filter))
        .format_timestamp_millis()
        .try_init();
    if result.is_err() {
        debug!("Logger already initialised, keeping the existing one");
    }
}
