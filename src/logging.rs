//! Diagnostic logging setup.
//!
//! User-facing messages go through [`crate::cli::Reporter`]; this only
//! configures the `tracing` subscriber used for diagnostics.

use crate::cli::Verbosity;
use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset.
#[must_use]
pub const fn default_filter(verbosity: Verbosity) -> &'static str {
    match verbosity {
        Verbosity::Verbose => "warn,robotpy_wrapper=debug",
        Verbosity::Silent => "off",
        Verbosity::Quiet | Verbosity::Normal => "warn",
    }
}

/// Installs the global subscriber writing to stderr. `RUST_LOG` takes
/// precedence over the verbosity flags.
///
/// Calling this more than once is harmless; later calls are ignored.
pub fn init(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter() {
        assert_eq!(default_filter(Verbosity::Normal), "warn");
        assert_eq!(default_filter(Verbosity::Silent), "off");
        assert!(default_filter(Verbosity::Verbose).contains("robotpy_wrapper=debug"));
    }

    #[test]
    fn test_init_twice() {
        init(Verbosity::Quiet);
        init(Verbosity::Verbose);
    }
}
