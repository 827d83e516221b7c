//! Logging setup.
//!
//! Every component logs through `tracing`; nothing is emitted until a
//! subscriber is installed. Embedders that already install one can ignore
//! this module. `RUST_LOG` overrides the profile's default filter.

use std::sync::Once;
use tracing_subscriber::EnvFilter;

/// How log output is shaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Human-readable output at debug level.
    Development,
    /// Output captured by the test harness, at trace level.
    Test,
}

impl Profile {
    fn default_directive(self) -> &'static str {
        match self {
            Profile::Development => "choice_filter=debug",
            Profile::Test => "choice_filter=trace",
        }
    }
}

static INIT_ONCE: Once = Once::new();

/// Installs a global `tracing` subscriber. Only the first call has an
/// effect, and an already installed subscriber is left in place.
///
/// ```
/// use choice_filter::logging::{init, Profile};
///
/// init(Profile::Development);
/// init(Profile::Development);
/// ```
pub fn init(profile: Profile) {
    INIT_ONCE.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(profile.default_directive()));
        let builder = tracing_subscriber::fmt().with_env_filter(filter);
        let installed = match profile {
            Profile::Development => builder.try_init(),
            Profile::Test => builder.with_test_writer().try_init(),
        };
        if installed.is_err() {
            tracing::debug!("a tracing subscriber was already installed");
        }
    });
}
