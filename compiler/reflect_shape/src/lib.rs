//! Shape analysis for reflection.
//!
//! Classifies a declaration as a [`Shape`]: a product of named members, a
//! closed coproduct of variants, or opaque with a reason. Every generator of
//! the plugin works from shapes, never from raw declarations.
//!
//! Classification is total: malformed or unsupported declarations come out
//! as [`Shape::Opaque`] rather than as errors. Whether an opaque shape is an
//! error depends on what was requested, which is the synthesizer's call.

mod analyzer;
mod shape;

pub use analyzer::{ShapeAnalyzer, ShapeConfig, SingletonPolicy, DEFAULT_MAX_SHAPE_DEPTH};
pub use shape::{CoproductShape, OpaqueReason, ProductShape, Shape, ShapeMember};
