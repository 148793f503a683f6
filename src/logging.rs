//! stderr logging for the binary.
//!
//! The library only emits `tracing` events; installing a subscriber is left
//! to whoever drives it.

use std::sync::Once;
use tracing_subscriber::EnvFilter;

static INIT_ONCE: Once = Once::new();

/// Default filter directive for a `-v` count. `RUST_LOG` wins when no `-v`
/// was given.
pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "preview_patcher=warn",
        1 => "preview_patcher=info",
        _ => "preview_patcher=debug",
    }
}

/// Install the fmt subscriber on stderr. Later calls are no-ops.
pub fn init(verbosity: u8) {
    INIT_ONCE.call_once(|| {
        let filter = if verbosity == 0 {
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_directive(0)))
        } else {
            EnvFilter::new(default_directive(verbosity))
        };

        // Another subscriber may already be installed (tests, embedding).
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_idempotent() {
        init(0);
        init(2);
        init(1);
    }

    #[test]
    fn test_verbosity_raises_level() {
        assert_eq!(default_directive(0), "preview_patcher=warn");
        assert_eq!(default_directive(1), "preview_patcher=info");
        assert_eq!(default_directive(5), "preview_patcher=debug");
    }
}
