//! Grammar productions, split by syntactic category.
//!
//! Each module extends [`Parser`](crate::Parser) with the productions for
//! one category.

mod decl;
mod expr;
mod ty;
