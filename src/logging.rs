//! Logging setup.
//!
//! Log lines go to stderr so stdout only carries answers and listings.
//! `RUST_LOG` takes precedence over the `[logging]` config section:
//!
//! ```bash
//! RUST_LOG=docqa_core=debug docqa chat
//! ```

use std::sync::Once;

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

static INIT: Once = Once::new();

/// Install the global subscriber. Only the first call has any effect.
pub fn init_with_config(config: &LoggingConfig) {
    INIT.call_once(|| {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            EnvFilter::new(config.directives())
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(true)
            .compact()
            .try_init();
    });
}
