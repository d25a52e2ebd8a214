use tracing_subscriber::{fmt, EnvFilter};

/// Initializes the global `tracing` subscriber once at process start.
///
/// `RUST_LOG` follows the usual `EnvFilter` syntax (e.g. `debug`,
/// `pdp11_sim::core::cache=debug`) and defaults to `warn` so a clean run
/// stays quiet on stderr beyond the fatal diagnostics the driver prints
/// itself.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt().with_env_filter(filter).with_target(false).init();
}
