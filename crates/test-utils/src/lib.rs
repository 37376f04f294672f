pub mod builders;
pub mod fake_native;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use globwatch::logging::LOG_ENV_VAR;
use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// How long async tests wait for a single step before failing.
pub const STEP_TIMEOUT: Duration = Duration::from_secs(5);

/// Install a test-writer subscriber once per test binary.
///
/// The filter comes from `GLOBWATCH_LOG` (same syntax as `RUST_LOG`), e.g.
/// `GLOBWATCH_LOG=globwatch=debug cargo test -- --nocapture`. Output is
/// captured per test and only shown for failures.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));

        // Another harness may already have installed one.
        let _ = fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .try_init();
    });
}

/// Await `f`, panicking after [`STEP_TIMEOUT`].
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: Future<Output = T>,
{
    tokio::time::timeout(STEP_TIMEOUT, f)
        .await
        .unwrap_or_else(|_| panic!("test step timed out after {STEP_TIMEOUT:?}"))
}
