//! Synthesis failures.
//!
//! Every variant except [`SynthError::NamingExhausted`] is scoped to one
//! declaration: the driver rolls that declaration back and keeps going.

use reflect_diagnostic::{Diagnostic, ErrorCode};
use reflect_ir::Span;

use crate::naming::NamingExhausted;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SynthError {
    #[error("cannot generate {requested} for `{decl}`: {reason}")]
    UnsupportedShape {
        decl: String,
        requested: &'static str,
        reason: String,
        span: Span,
    },

    #[error("conflicting decorators on `{function}`: {message}")]
    DecoratorConflict {
        function: String,
        message: String,
        span: Span,
        /// The decorator that conflicts with the one at `span`.
        other: Option<Span>,
    },

    #[error("{source}")]
    NamingExhausted {
        #[source]
        source: NamingExhausted,
        span: Span,
    },

    #[error("no default value for `{ty}` at `{path}`")]
    NoDefaultAvailable { ty: String, path: String, span: Span },
}

impl SynthError {
    pub(crate) fn naming(source: NamingExhausted, span: Span) -> Self {
        SynthError::NamingExhausted { source, span }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            SynthError::UnsupportedShape { .. } => ErrorCode::E2001,
            SynthError::DecoratorConflict { .. } => ErrorCode::E3001,
            SynthError::NamingExhausted { .. } => ErrorCode::E4001,
            SynthError::NoDefaultAvailable { .. } => ErrorCode::E5001,
        }
    }

    /// Fatal errors abort the whole pass instead of one declaration.
    pub fn is_fatal(&self) -> bool {
        matches!(self, SynthError::NamingExhausted { .. })
    }

    pub fn span(&self) -> Span {
        match self {
            SynthError::UnsupportedShape { span, .. }
            | SynthError::DecoratorConflict { span, .. }
            | SynthError::NamingExhausted { span, .. }
            | SynthError::NoDefaultAvailable { span, .. } => *span,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let diagnostic = Diagnostic::error(self.code()).with_message(self.to_string());
        match self {
            SynthError::UnsupportedShape { requested, .. } => diagnostic
                .with_label(self.span(), format!("{requested} requested here"))
                .with_note("only data classes, objects, sealed hierarchies and enums have a shape"),
            SynthError::DecoratorConflict { other, .. } => {
                let diagnostic = diagnostic.with_label(self.span(), "this decorator");
                match other {
                    Some(other) => diagnostic.with_secondary_label(*other, "conflicts with this one"),
                    None => diagnostic,
                }
            }
            SynthError::NamingExhausted { .. } => diagnostic
                .with_label(self.span(), "while naming a declaration generated for this")
                .with_note("no declaration of this pass was inserted"),
            SynthError::NoDefaultAvailable { .. } => diagnostic
                .with_label(self.span(), "sample requested here")
                .with_suggestion("make the member nullable or give it a supported type"),
        }
    }
}
