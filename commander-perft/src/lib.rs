//! Offline tooling for the Commander Chess engine: move-tree counting and
//! SVG board diagrams.

pub mod perft;
pub mod stats;
pub mod svg;

use tracing_subscriber::EnvFilter;

/// Console logging for the binaries; `RUST_LOG` overrides the `info` default.
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();
}
