//! Tracing subscriber for the CLI.
//!
//! Output is enabled through `RUST_LOG`:
//! - `RUST_LOG=reflectc=debug`: one event per pass and per fixture.
//! - `RUST_LOG=reflect_synth=trace`: every reserved name and generator step.
//! - `--tree` renders spans as an indented tree instead of flat lines.

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Install the subscriber. Safe to call more than once; only the first
/// call has an effect, and nothing is installed unless `RUST_LOG` is set.
pub fn init_tracing(tree: bool) {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_err() {
            return;
        }
        let filter = EnvFilter::from_default_env();
        if tree {
            let layer = tracing_tree::HierarchicalLayer::new(2)
                .with_targets(true)
                .with_bracketed_fields(true)
                .with_writer(std::io::stderr);
            tracing_subscriber::registry().with(filter).with(layer).init();
        } else {
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_level(true)
                        .with_writer(std::io::stderr),
                )
                .with(filter)
                .init();
        }
    });
}
