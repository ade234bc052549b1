//! Declaration synthesis for the reflection plugin.
//!
//! Generators work from [`reflect_shape::Shape`]s and write new expressions
//! into the unit's arena through a [`SynthContext`]:
//!
//! - reflection: accessors, the `product()` descriptor, discriminators
//! - optics: lenses and list traversals
//! - decorators: intercepting wrappers around annotated functions
//! - samples: default-valued instances
//!
//! Names come from a per-pass [`SymbolTable`] so nothing generated shadows
//! user code or other generated code.

mod context;
mod decorator;
mod error;
mod naming;
mod reflect;
mod request;
mod sample;

#[cfg(test)]
mod test_support;

pub use context::{SynthConfig, SynthContext};
pub use decorator::{DecoratorOrder, DecoratorSpec};
pub use error::SynthError;
pub use naming::{
    capitalize, decapitalize, scope_of, NameBinding, NamingExhausted, Scope, SymbolTable,
    DEFAULT_MAX_NAME_SUFFIX,
};
pub use request::Request;
