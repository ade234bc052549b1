//! Evaluation failures.
//!
//! Every failure carries the span of the expression that raised it and the
//! chain of functions it unwound through, innermost first.

use reflect_diagnostic::{Diagnostic, ErrorCode};
use reflect_ir::Span;

use crate::value::Value;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EvalErrorKind {
    #[error("unresolved reference `{name}`")]
    UndefinedVariable { name: String },

    #[error("unresolved function `{name}`")]
    UndefinedFunction { name: String },

    #[error("`{type_name}` has no member `{member}`")]
    NoSuchMember { type_name: String, member: String },

    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("`{callee}` takes {expected} argument(s) but {found} were supplied")]
    ArityMismatch {
        callee: String,
        expected: usize,
        found: usize,
    },

    #[error("no value passed for parameter `{param}` of `{callee}`")]
    MissingArgument { callee: String, param: String },

    #[error("`{callee}` has no parameter named `{param}`")]
    UnknownArgument { callee: String, param: String },

    #[error("index {index} out of bounds for length {len}")]
    IndexOutOfBounds { index: i64, len: usize },

    #[error("`{type_name}` is not callable")]
    NotCallable { type_name: String },

    #[error("{found} cannot be cast to {ty}")]
    CastFailed { ty: String, found: String },

    #[error("null dereference")]
    NullDereference,

    #[error("division by zero")]
    DivisionByZero,

    #[error("call depth exceeded {limit}")]
    StackOverflow { limit: usize },

    #[error("`this` is not available here")]
    NoReceiver,

    #[error("the unit declares no `box()` function")]
    NoEntryPoint,

    #[error("malformed expression")]
    Malformed,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{kind}")]
pub struct EvalError {
    pub kind: EvalErrorKind,
    pub span: Span,
    /// Functions unwound through, innermost first.
    pub backtrace: Vec<String>,
}

impl EvalError {
    pub fn new(kind: EvalErrorKind, span: Span) -> Self {
        EvalError {
            kind,
            span,
            backtrace: Vec::new(),
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let mut diagnostic = Diagnostic::error(ErrorCode::E6001)
            .with_message(self.to_string())
            .with_label(self.span, "evaluation failed here");
        if !self.backtrace.is_empty() {
            diagnostic = diagnostic.with_note(format!("in {}", self.backtrace.join(" <- ")));
        }
        diagnostic
    }
}

pub type EvalResult<T = Value> = Result<T, EvalError>;

/// Non-local exits while evaluating a function body.
#[derive(Debug)]
pub(crate) enum Flow {
    Return(Value),
    Error(EvalError),
}

impl From<EvalError> for Flow {
    fn from(error: EvalError) -> Self {
        Flow::Error(error)
    }
}

pub(crate) type FlowResult<T = Value> = Result<T, Flow>;
