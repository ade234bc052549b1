//! Front-end for the Kotlin subset used by plugin fixtures.
//!
//! Lexes with `logos` and parses by recursive descent into a
//! [`CompilationUnit`]: a declaration table plus a flat expression arena.
//! Only the constructs the fixtures need are accepted; anything else is a
//! parse error with recovery to the next declaration.

mod cursor;
mod error;
mod grammar;
mod lexer;
mod recovery;

pub use cursor::Cursor;
pub use error::{ErrorContext, ParseError};
pub use lexer::{lex, LexOutput, Token, TokenKind};

use reflect_diagnostic::Diagnostic;
use reflect_ir::{CompilationUnit, Name, StringInterner};

/// Result of parsing one source file.
#[derive(Debug)]
pub struct ParseOutput {
    pub unit: CompilationUnit,
    /// Lexer and parser errors, in discovery order.
    pub diagnostics: Vec<Diagnostic>,
}

impl ParseOutput {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// Parse `source` into a compilation unit named `source_name`.
#[tracing::instrument(level = "debug", skip(source, interner))]
pub fn parse(source_name: &str, source: &str, interner: &StringInterner) -> ParseOutput {
    let lexed = lex(source, interner);
    let mut diagnostics = lexed.errors;

    let parser = Parser::new(&lexed.tokens, interner, source_name);
    let (unit, errors) = parser.parse_unit();
    diagnostics.extend(errors.iter().map(ParseError::to_diagnostic));

    tracing::debug!(
        decls = unit.decls.len(),
        exprs = unit.arena.len(),
        errors = diagnostics.len(),
        "parsed unit"
    );
    ParseOutput { unit, diagnostics }
}

/// Contextual keywords, interned once per parser.
///
/// The lexer only knows hard keywords; modifiers like `data` are plain
/// identifiers wherever they are not in modifier position.
struct SoftKeywords {
    data: Name,
    sealed: Name,
    abstract_: Name,
    open: Name,
    enum_: Name,
    companion: Name,
    init: Name,
    out: Name,
    in_: Name,
    vararg: Name,
    by: Name,
    /// Modifiers accepted and dropped.
    ignored: [Name; 16],
}

impl SoftKeywords {
    fn new(interner: &StringInterner) -> Self {
        let ignored = [
            "private",
            "public",
            "internal",
            "protected",
            "override",
            "final",
            "inline",
            "const",
            "lateinit",
            "suspend",
            "operator",
            "infix",
            "tailrec",
            "external",
            "value",
            "annotation",
        ]
        .map(|s| interner.intern(s));
        SoftKeywords {
            data: interner.intern("data"),
            sealed: interner.intern("sealed"),
            abstract_: interner.intern("abstract"),
            open: interner.intern("open"),
            enum_: interner.intern("enum"),
            companion: interner.intern("companion"),
            init: interner.intern("init"),
            out: interner.intern("out"),
            in_: interner.intern("in"),
            vararg: interner.intern("vararg"),
            by: interner.intern("by"),
            ignored,
        }
    }

    fn is_modifier(&self, name: Name) -> bool {
        name == self.data
            || name == self.sealed
            || name == self.abstract_
            || name == self.open
            || name == self.enum_
            || name == self.companion
            || name == self.vararg
            || self.ignored.contains(&name)
    }
}

/// Parser state.
pub(crate) struct Parser<'a> {
    cursor: Cursor<'a>,
    unit: CompilationUnit,
    kw: SoftKeywords,
    /// Nesting of `()`/`[]`; newlines are insignificant while positive.
    paren_depth: u32,
    errors: Vec<ParseError>,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token], interner: &'a StringInterner, source_name: &str) -> Self {
        Parser {
            cursor: Cursor::new(tokens, interner),
            unit: CompilationUnit::new(source_name),
            kw: SoftKeywords::new(interner),
            paren_depth: 0,
            errors: Vec::new(),
        }
    }

    #[inline]
    fn interner(&self) -> &'a StringInterner {
        self.cursor.interner()
    }

    /// Run `f` with the given paren depth, restoring the old one after.
    fn with_paren_depth<T>(&mut self, depth: u32, f: impl FnOnce(&mut Self) -> T) -> T {
        let saved = std::mem::replace(&mut self.paren_depth, depth);
        let result = f(self);
        self.paren_depth = saved;
        result
    }

    /// Skip newlines if inside parentheses or brackets.
    fn skip_nested_newlines(&mut self) {
        if self.paren_depth > 0 {
            self.cursor.skip_newlines();
        }
    }

    /// At a newline, skip ahead if the next line continues with one of
    /// `kinds` (`.foo` chains, `&&`/`||` chains, `else`).
    fn continue_line(&mut self, kinds: &[TokenKind]) {
        if self.cursor.check(TokenKind::Newline) {
            let next = self.cursor.peek_past_newlines();
            if kinds
                .iter()
                .any(|k| std::mem::discriminant(k) == std::mem::discriminant(&next))
            {
                self.cursor.skip_newlines();
            }
        }
    }
}
