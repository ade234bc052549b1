//! Parse error types.

use reflect_diagnostic::{Diagnostic, ErrorCode};
use reflect_ir::Span;

use crate::lexer::TokenKind;

/// What was being parsed when an error occurred.
///
/// Rendered as the primary label ("while parsing a class declaration").
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorContext {
    Unit,
    Import,
    Annotation,
    ClassDecl,
    FunctionDecl,
    PropertyDecl,
    EnumEntries,
    Parameters,
    Type,
    Expression,
    Lambda,
    When,
    CallArgs,
}

impl ErrorContext {
    pub fn description(self) -> &'static str {
        match self {
            ErrorContext::Unit => "a source file",
            ErrorContext::Import => "an import",
            ErrorContext::Annotation => "an annotation",
            ErrorContext::ClassDecl => "a class declaration",
            ErrorContext::FunctionDecl => "a function declaration",
            ErrorContext::PropertyDecl => "a property declaration",
            ErrorContext::EnumEntries => "enum entries",
            ErrorContext::Parameters => "a parameter list",
            ErrorContext::Type => "a type",
            ErrorContext::Expression => "an expression",
            ErrorContext::Lambda => "a lambda",
            ErrorContext::When => "a when expression",
            ErrorContext::CallArgs => "call arguments",
        }
    }
}

/// A parse error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError {
    pub code: ErrorCode,
    pub message: String,
    pub span: Span,
    pub context: Option<ErrorContext>,
    pub help: Vec<String>,
}

impl ParseError {
    pub fn new(code: ErrorCode, message: impl Into<String>, span: Span) -> Self {
        ParseError {
            code,
            message: message.into(),
            span,
            context: None,
            help: Vec::new(),
        }
    }

    /// `expected X, found Y`
    pub fn expected(code: ErrorCode, what: &str, found: TokenKind, span: Span) -> Self {
        Self::new(code, format!("expected {what}, found {}", found.describe()), span)
    }

    /// Attach a context unless one is already present; the innermost wins.
    #[must_use]
    pub fn in_context(mut self, context: ErrorContext) -> Self {
        self.context.get_or_insert(context);
        self
    }

    #[must_use]
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help.push(help.into());
        self
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let label = match self.context {
            Some(context) => format!("while parsing {}", context.description()),
            None => "here".to_owned(),
        };
        let mut diag = Diagnostic::error(self.code)
            .with_message(self.message.clone())
            .with_label(self.span, label);
        for help in &self.help {
            diag = diag.with_note(help.clone());
        }
        diag
    }
}
