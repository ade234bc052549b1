//! Diagnostic system for the reflection plugin.
//!
//! Every failure the plugin can report is a [`Diagnostic`] with:
//! - an error code for searchability
//! - a message saying what went wrong
//! - a primary span at the offending declaration
//! - optional notes and suggestions
//!
//! [`ErrorGuaranteed`] is handed out only when an error count is nonzero,
//! so code holding one knows something was reported.

mod diagnostic;
pub mod emitter;
mod error_code;
mod guarantee;
pub mod queue;
pub mod span_utils;

pub use diagnostic::{Diagnostic, Label, Severity};
pub use error_code::ErrorCode;
pub use guarantee::ErrorGuaranteed;
pub use queue::{DiagnosticConfig, DiagnosticQueue};
