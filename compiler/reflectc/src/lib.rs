//! Driver for the arrow-reflect synthesis passes.
//!
//! # Architecture
//!
//! ```text
//! source ──► reflect_parse ──► CompilationUnit
//!                                   │
//!                                   ▼
//!                  PluginDriver (one pass per unit)
//!                    │  shapes, reflection, optics,
//!                    │  samples, decorator wrappers
//!                    ▼
//!        PassOutput { synthesized, diagnostics }
//!                    │
//!                    ▼
//!         reflect_eval (fixture `box()`)
//! ```
//!
//! The library also hosts fixture discovery and the harness that the
//! generated fixture tests call, plus the handlers behind the `reflectc`
//! binary.

pub mod commands;
pub mod config;
pub mod driver;
pub mod fixture;
pub mod tracing_setup;

pub use config::{ConfigError, PluginConfig};
pub use driver::{PassControl, PassOutput, PluginDriver};
pub use fixture::{
    discover_fixtures, run_fixture, run_fixtures, run_source, Fixture, FixtureError,
    FixtureReport,
};
pub use tracing_setup::init_tracing;
