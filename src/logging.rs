//! Logging setup for the command line.
//!
//! The library itself only emits `tracing` events; installing a subscriber is
//! left to the binary.

use std::sync::Once;
use tracing_subscriber::EnvFilter;

static INIT_ONCE: Once = Once::new();

/// Verbosity selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Warnings only
    #[default]
    Normal,
    /// Debug events from this crate
    Verbose,
}

impl Verbosity {
    fn default_directive(self) -> &'static str {
        match self {
            Verbosity::Normal => "prosediff=warn",
            Verbosity::Verbose => "prosediff=debug",
        }
    }
}

/// Installs a formatted subscriber writing to stderr.
///
/// `RUST_LOG` takes precedence over `verbosity`. Only the first call has an
/// effect, and an already installed global subscriber is left in place.
///
/// ```
/// use prosediff::logging::{init, Verbosity};
///
/// init(Verbosity::Normal);
/// init(Verbosity::Verbose);
/// ```
pub fn init(verbosity: Verbosity) {
    INIT_ONCE.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(verbosity.default_directive()));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    });
}
