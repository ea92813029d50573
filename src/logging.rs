use std::sync::Once;

use tracing_subscriber::{fmt, EnvFilter};

static TRACING_INIT: Once = Once::new();

/// Installs the stderr subscriber once. `RUST_LOG` wins over `verbose`.
pub fn init_tracing(verbose: bool) {
    TRACING_INIT.call_once(|| {
        let default = if verbose { "apptrack=debug" } else { "apptrack=warn" };
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

        // a test harness may have installed a subscriber already
        let _ = fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    });
}
