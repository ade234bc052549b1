//! Reflect IR - declaration graph and expression arena
//!
//! This crate contains the data the compiler plugin operates on:
//! - Spans for source locations
//! - Names for interned identifiers
//! - Syntactic type references
//! - Declarations and compilation units
//! - The flat expression arena shared by parsed and synthesized code
//! - Canonical rendering of all of the above
//!
//! # Design Philosophy
//!
//! - **Intern Everything**: Strings → Name(u32)
//! - **Flatten Everything**: No Box<Expr>, use ExprId(u32) indices
//! - **Reference by index**: declarations point at each other by `DeclId`
//!
//! Types that contain floats store them as u64 bits for Hash compatibility.

/// Compile-time assertion that a type has a specific size.
///
/// Used to prevent accidental size regressions in frequently-allocated types.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

mod arena;
mod decl;
pub mod expr;
mod interner;
mod name;
pub mod render;
mod span;
mod synth;
mod ty;
mod unit;

pub use arena::{ArenaMark, ExprArena};
pub use decl::{
    Annotation, AnnotationArg, AnnotationValue, DeclFlags, DeclId, DeclKind, Declaration, Member,
    Param,
};
pub use expr::{
    BinaryOp, CallArg, CallArgRange, Expr, ExprId, ExprKind, ExprRange, LambdaParam,
    LambdaParamRange, UnaryOp, WhenArm, WhenArmRange, WhenCondition,
};
pub use interner::{InternError, SharedInterner, StringInterner, StringLookup};
pub use name::Name;
pub use render::Renderer;
pub use span::Span;
pub use synth::{SynthOrigin, SynthesizedDecl};
pub use ty::{BuiltinType, TypeRef};
pub use unit::{CompilationUnit, DeclTable, Import};

static_assert_size!(Name, 4);
static_assert_size!(ExprId, 4);
static_assert_size!(DeclId, 4);
static_assert_size!(Span, 8);
