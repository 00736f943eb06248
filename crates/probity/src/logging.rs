//! Log output for tests

use tracing::debug;
use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Filter used when `RUST_LOG` is unset
const DEFAULT_FILTER: &str = "probity=warn";

/// Install a fmt subscriber that writes through the test harness
///
/// Filtering follows `RUST_LOG`. Fails when a global subscriber is already
/// installed.
pub fn try_init_test_logging() -> Result<(), SetGlobalDefaultError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_test_writer()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Like [`try_init_test_logging`], but safe to call from every test
pub fn init_test_logging() {
    if let Err(err) = try_init_test_logging() {
        debug!(error = %err, "Test logging already initialized");
    }
}
