use std::io::{self, IsTerminal};

use tracing_subscriber::EnvFilter;

/// Level used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_FILTER: &str = "warn";

fn make_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Initialise the tracing subscriber. Call once at startup.
///
/// * Honours `RUST_LOG` when set, otherwise logs warnings and errors only.
/// * Writes to stderr so stdout carries nothing but the JSON reply.
/// * Colours output only when stderr is a terminal.
pub fn init_tracing() {
    // A second call finds a subscriber already installed; nothing to do.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(make_filter())
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .without_time()
        .with_target(false)
        .try_init();
}
