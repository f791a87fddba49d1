//! Tracing subscriber setup
//!
//! Library code only emits `tracing` events. Hosts (and the test suites) call
//! [`init_tracing`] once to get formatted output filtered by `RUST_LOG`.

use std::sync::Once;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not set
const DEFAULT_FILTER: &str = "xfchess_session=info";

static INIT: Once = Once::new();

/// Install a fmt subscriber with an env filter. Safe to call repeatedly.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        // Another subscriber may already be installed by the host
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .try_init();
    });
}
