//! Lexer for the fixture language using logos with string interning.

use logos::Logos;
use reflect_diagnostic::{Diagnostic, ErrorCode};
use reflect_ir::{Name, Span, StringInterner};

/// Raw token from logos (before interning).
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\r\f]+")]
enum RawToken {
    #[regex(r"//[^\n]*")]
    LineComment,

    #[token("/*", block_comment)]
    BlockComment,

    #[token("\n")]
    Newline,

    #[token("package")]
    Package,
    #[token("import")]
    Import,
    #[token("class")]
    Class,
    #[token("interface")]
    Interface,
    #[token("object")]
    Object,
    #[token("fun")]
    Fun,
    #[token("val")]
    Val,
    #[token("var")]
    Var,
    #[token("return")]
    Return,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("when")]
    When,
    #[token("is")]
    Is,
    #[token("as")]
    As,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("null")]
    Null,
    #[token("this")]
    This,
    #[token("constructor")]
    Constructor,

    #[token("@")]
    At,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("::")]
    ColonColon,
    #[token(":")]
    Colon,
    #[token(",")]
    Comma,
    #[token("?.")]
    SafeDot,
    #[token(".")]
    Dot,
    #[token("->")]
    Arrow,
    #[token("?")]
    Question,
    #[token(";")]
    Semicolon,
    #[token("==")]
    EqEq,
    #[token("=")]
    Eq,
    #[token("!=")]
    NotEq,
    #[token("<=")]
    LtEq,
    #[token("<")]
    Lt,
    #[token(">=")]
    GtEq,
    #[token(">")]
    Gt,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("!")]
    Bang,
    #[token("&&")]
    AmpAmp,
    #[token("||")]
    PipePipe,

    // Integer, with an optional `L` suffix
    #[regex(r"[0-9][0-9_]*L?", |lex| {
        lex.slice().trim_end_matches('L').replace('_', "").parse::<i64>().ok()
    })]
    Int(i64),

    // Float, with an optional `f` suffix
    #[regex(r"[0-9][0-9_]*\.[0-9][0-9_]*([eE][+-]?[0-9]+)?[fF]?", |lex| {
        lex.slice().trim_end_matches(['f', 'F']).replace('_', "").parse::<f64>().ok()
    })]
    Float(f64),

    // String literal (no unescaped newlines allowed)
    #[regex(r#""([^"\\\n\r]|\\.)*""#)]
    String,

    // Char literal
    #[regex(r"'([^'\\\n\r]|\\.)'")]
    Char,

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,

    #[regex(r"`[^`\n]+`")]
    QuotedIdent,
}

/// Token kinds after interning.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum TokenKind {
    Ident(Name),
    Int(i64),
    /// Stored as bits.
    Float(u64),
    Str(Name),
    Char(char),

    Package,
    Import,
    Class,
    Interface,
    Object,
    Fun,
    Val,
    Var,
    Return,
    If,
    Else,
    When,
    Is,
    As,
    True,
    False,
    Null,
    This,
    Constructor,

    At,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    ColonColon,
    Colon,
    Comma,
    SafeDot,
    Dot,
    Arrow,
    Question,
    Semicolon,
    EqEq,
    Eq,
    NotEq,
    LtEq,
    Lt,
    GtEq,
    Gt,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Bang,
    AmpAmp,
    PipePipe,

    Newline,
    Error,
    Eof,
}

impl TokenKind {
    /// Human-readable form for error messages.
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::Ident(_) => "identifier",
            TokenKind::Int(_) => "integer literal",
            TokenKind::Float(_) => "float literal",
            TokenKind::Str(_) => "string literal",
            TokenKind::Char(_) => "character literal",
            TokenKind::Package => "`package`",
            TokenKind::Import => "`import`",
            TokenKind::Class => "`class`",
            TokenKind::Interface => "`interface`",
            TokenKind::Object => "`object`",
            TokenKind::Fun => "`fun`",
            TokenKind::Val => "`val`",
            TokenKind::Var => "`var`",
            TokenKind::Return => "`return`",
            TokenKind::If => "`if`",
            TokenKind::Else => "`else`",
            TokenKind::When => "`when`",
            TokenKind::Is => "`is`",
            TokenKind::As => "`as`",
            TokenKind::True => "`true`",
            TokenKind::False => "`false`",
            TokenKind::Null => "`null`",
            TokenKind::This => "`this`",
            TokenKind::Constructor => "`constructor`",
            TokenKind::At => "`@`",
            TokenKind::LParen => "`(`",
            TokenKind::RParen => "`)`",
            TokenKind::LBrace => "`{`",
            TokenKind::RBrace => "`}`",
            TokenKind::LBracket => "`[`",
            TokenKind::RBracket => "`]`",
            TokenKind::ColonColon => "`::`",
            TokenKind::Colon => "`:`",
            TokenKind::Comma => "`,`",
            TokenKind::SafeDot => "`?.`",
            TokenKind::Dot => "`.`",
            TokenKind::Arrow => "`->`",
            TokenKind::Question => "`?`",
            TokenKind::Semicolon => "`;`",
            TokenKind::EqEq => "`==`",
            TokenKind::Eq => "`=`",
            TokenKind::NotEq => "`!=`",
            TokenKind::LtEq => "`<=`",
            TokenKind::Lt => "`<`",
            TokenKind::GtEq => "`>=`",
            TokenKind::Gt => "`>`",
            TokenKind::Plus => "`+`",
            TokenKind::Minus => "`-`",
            TokenKind::Star => "`*`",
            TokenKind::Slash => "`/`",
            TokenKind::Percent => "`%`",
            TokenKind::Bang => "`!`",
            TokenKind::AmpAmp => "`&&`",
            TokenKind::PipePipe => "`||`",
            TokenKind::Newline => "newline",
            TokenKind::Error => "invalid token",
            TokenKind::Eof => "end of file",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

/// Lexer output: tokens ending in `Eof`, plus lexical errors.
#[derive(Debug, Default)]
pub struct LexOutput {
    pub tokens: Vec<Token>,
    pub errors: Vec<Diagnostic>,
}

/// Lex source code into tokens.
pub fn lex(source: &str, interner: &StringInterner) -> LexOutput {
    let mut output = LexOutput::default();
    let mut logos = RawToken::lexer(source);

    while let Some(token_result) = logos.next() {
        let span = Span::from_range(logos.span());
        let slice = logos.slice();

        match token_result {
            Ok(RawToken::LineComment | RawToken::BlockComment) => {}
            Ok(raw) => {
                let kind = convert_token(raw, slice, interner);
                output.tokens.push(Token { kind, span });
            }
            Err(()) => {
                output.errors.push(lex_error(slice, span));
                output.tokens.push(Token {
                    kind: TokenKind::Error,
                    span,
                });
            }
        }
    }

    let eof_pos = u32::try_from(source.len()).unwrap_or(u32::MAX);
    output.tokens.push(Token {
        kind: TokenKind::Eof,
        span: Span::point(eof_pos),
    });
    output
}

/// Consume through the closing `*/`. Comments do not nest; an unterminated
/// comment swallows the rest of the input and lexes as an error.
fn block_comment(lex: &mut logos::Lexer<RawToken>) -> bool {
    match lex.remainder().find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            true
        }
        None => {
            lex.bump(lex.remainder().len());
            false
        }
    }
}

fn lex_error(slice: &str, span: Span) -> Diagnostic {
    match slice.chars().next() {
        Some('"' | '\'') => Diagnostic::error(ErrorCode::E0001)
            .with_message("unterminated literal")
            .with_label(span, "literal starts here"),
        Some(c) if c.is_ascii_digit() => Diagnostic::error(ErrorCode::E0003)
            .with_message(format!("invalid number literal `{slice}`"))
            .with_label(span, "out of range or malformed"),
        _ => Diagnostic::error(ErrorCode::E0002)
            .with_message(format!("invalid character `{slice}`"))
            .with_label(span, "not valid here"),
    }
}

fn convert_token(raw: RawToken, slice: &str, interner: &StringInterner) -> TokenKind {
    match raw {
        RawToken::Int(n) => TokenKind::Int(n),
        RawToken::Float(f) => TokenKind::Float(f.to_bits()),
        RawToken::String => {
            let content = &slice[1..slice.len() - 1];
            TokenKind::Str(interner.intern(&unescape_string(content)))
        }
        RawToken::Char => TokenKind::Char(unescape_char(&slice[1..slice.len() - 1])),
        RawToken::Ident => TokenKind::Ident(interner.intern(slice)),
        RawToken::QuotedIdent => TokenKind::Ident(interner.intern(&slice[1..slice.len() - 1])),

        RawToken::Package => TokenKind::Package,
        RawToken::Import => TokenKind::Import,
        RawToken::Class => TokenKind::Class,
        RawToken::Interface => TokenKind::Interface,
        RawToken::Object => TokenKind::Object,
        RawToken::Fun => TokenKind::Fun,
        RawToken::Val => TokenKind::Val,
        RawToken::Var => TokenKind::Var,
        RawToken::Return => TokenKind::Return,
        RawToken::If => TokenKind::If,
        RawToken::Else => TokenKind::Else,
        RawToken::When => TokenKind::When,
        RawToken::Is => TokenKind::Is,
        RawToken::As => TokenKind::As,
        RawToken::True => TokenKind::True,
        RawToken::False => TokenKind::False,
        RawToken::Null => TokenKind::Null,
        RawToken::This => TokenKind::This,
        RawToken::Constructor => TokenKind::Constructor,

        RawToken::At => TokenKind::At,
        RawToken::LParen => TokenKind::LParen,
        RawToken::RParen => TokenKind::RParen,
        RawToken::LBrace => TokenKind::LBrace,
        RawToken::RBrace => TokenKind::RBrace,
        RawToken::LBracket => TokenKind::LBracket,
        RawToken::RBracket => TokenKind::RBracket,
        RawToken::ColonColon => TokenKind::ColonColon,
        RawToken::Colon => TokenKind::Colon,
        RawToken::Comma => TokenKind::Comma,
        RawToken::SafeDot => TokenKind::SafeDot,
        RawToken::Dot => TokenKind::Dot,
        RawToken::Arrow => TokenKind::Arrow,
        RawToken::Question => TokenKind::Question,
        RawToken::Semicolon => TokenKind::Semicolon,
        RawToken::EqEq => TokenKind::EqEq,
        RawToken::Eq => TokenKind::Eq,
        RawToken::NotEq => TokenKind::NotEq,
        RawToken::LtEq => TokenKind::LtEq,
        RawToken::Lt => TokenKind::Lt,
        RawToken::GtEq => TokenKind::GtEq,
        RawToken::Gt => TokenKind::Gt,
        RawToken::Plus => TokenKind::Plus,
        RawToken::Minus => TokenKind::Minus,
        RawToken::Star => TokenKind::Star,
        RawToken::Slash => TokenKind::Slash,
        RawToken::Percent => TokenKind::Percent,
        RawToken::Bang => TokenKind::Bang,
        RawToken::AmpAmp => TokenKind::AmpAmp,
        RawToken::PipePipe => TokenKind::PipePipe,
        RawToken::Newline => TokenKind::Newline,

        // Filtered out by `lex`.
        RawToken::LineComment | RawToken::BlockComment => TokenKind::Newline,
    }
}

fn resolve_escape(c: char) -> Option<char> {
    match c {
        'n' => Some('\n'),
        'r' => Some('\r'),
        't' => Some('\t'),
        '\\' => Some('\\'),
        '"' => Some('"'),
        '\'' => Some('\''),
        '$' => Some('$'),
        '0' => Some('\0'),
        _ => None,
    }
}

/// Unknown escapes are kept literally.
fn unescape_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some(esc) => match resolve_escape(esc) {
                Some(resolved) => result.push(resolved),
                None => {
                    result.push('\\');
                    result.push(esc);
                }
            },
            None => result.push('\\'),
        }
    }
    result
}

fn unescape_char(s: &str) -> char {
    let mut chars = s.chars();
    match chars.next() {
        Some('\\') => chars
            .next()
            .map_or('\\', |esc| resolve_escape(esc).unwrap_or(esc)),
        Some(c) => c,
        None => '\0',
    }
}
