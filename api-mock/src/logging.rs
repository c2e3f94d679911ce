//! Tracing setup for tests.
//!
//! A test binary has one global subscriber, so only the first initializer
//! called in a process takes effect; every later call, whatever its mode, is
//! a no-op and returns `false`. Pick the mode for a whole binary by calling
//! [`init_tracing`] (or building contexts with
//! [`crate::TestContext::with_tracing`]) before anything else initializes
//! tracing. `RUST_LOG` overrides the default filter of the compact and JSON
//! modes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Once;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();
static INSTALLED: AtomicBool = AtomicBool::new(false);

const DEFAULT_FILTER: &str = "info,api_mock=debug";

/// Output format and filter of the test subscriber
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TracingMode {
    /// Compact lines, `RUST_LOG` or the default filter
    #[default]
    Compact,
    /// Compact lines with an explicit filter such as `"debug"`
    Filter(String),
    /// JSON lines, `RUST_LOG` or the default filter
    Json,
    /// No output
    Silent,
}

fn env_or_default_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the test subscriber for `mode`
///
/// Returns `true` only for the call that installed it.
pub fn init_tracing(mode: TracingMode) -> bool {
    let mut installed_now = false;
    INIT.call_once(|| {
        let registry = tracing_subscriber::registry();
        let fmt = tracing_subscriber::fmt::layer().with_test_writer();

        // try_init: another subscriber may already be installed by the test binary
        let result = match &mode {
            TracingMode::Compact => registry
                .with(env_or_default_filter())
                .with(fmt.compact())
                .try_init(),
            TracingMode::Filter(filter) => registry
                .with(EnvFilter::new(filter))
                .with(fmt.compact())
                .try_init(),
            TracingMode::Json => registry
                .with(env_or_default_filter())
                .with(fmt.json())
                .try_init(),
            TracingMode::Silent => registry.with(EnvFilter::new("off")).with(fmt).try_init(),
        };
        installed_now = result.is_ok();
        INSTALLED.store(installed_now, Ordering::SeqCst);
    });

    if !installed_now {
        tracing::trace!(?mode, "test tracing already initialized, mode ignored");
    }
    installed_now
}

/// Whether one of the initializers installed the test subscriber
pub fn tracing_installed() -> bool {
    INSTALLED.load(Ordering::SeqCst)
}

/// Initialize compact tracing output captured by the test harness
pub fn init_test_tracing() -> bool {
    init_tracing(TracingMode::Compact)
}

/// Initialize tracing with an explicit filter such as `"debug"`
pub fn init_test_tracing_with_filter(filter: &str) -> bool {
    init_tracing(TracingMode::Filter(filter.to_string()))
}

/// Initialize tracing with JSON lines output
pub fn init_test_tracing_json() -> bool {
    init_tracing(TracingMode::Json)
}

/// Suppress all tracing output
pub fn init_test_tracing_silent() -> bool {
    init_tracing(TracingMode::Silent)
}
