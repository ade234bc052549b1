//! Token cursor for navigating the token stream.
//!
//! Provides low-level token access, lookahead, and consumption methods.
//! Newlines are real tokens; the grammar decides where they are significant.

use std::mem::discriminant;

use reflect_diagnostic::ErrorCode;
use reflect_ir::{Name, Span, StringInterner};

use crate::error::ParseError;
use crate::lexer::{Token, TokenKind};

pub struct Cursor<'a> {
    tokens: &'a [Token],
    interner: &'a StringInterner,
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// The token slice must end with `Eof`.
    pub fn new(tokens: &'a [Token], interner: &'a StringInterner) -> Self {
        debug_assert!(
            matches!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof)),
            "token stream must end with Eof"
        );
        Cursor {
            tokens,
            interner,
            pos: 0,
        }
    }

    pub fn interner(&self) -> &'a StringInterner {
        self.interner
    }

    /// Current position, for speculative parsing.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Restore a position returned by `position`.
    pub fn set_position(&mut self, pos: usize) {
        debug_assert!(pos < self.tokens.len(), "cursor position {pos} out of bounds");
        self.pos = pos;
    }

    #[inline]
    pub fn current(&self) -> Token {
        self.tokens[self.pos]
    }

    #[inline]
    pub fn current_kind(&self) -> TokenKind {
        self.tokens[self.pos].kind
    }

    #[inline]
    pub fn current_span(&self) -> Span {
        self.tokens[self.pos].span
    }

    #[inline]
    pub fn previous_span(&self) -> Span {
        if self.pos > 0 {
            self.tokens[self.pos - 1].span
        } else {
            Span::DUMMY
        }
    }

    #[inline]
    pub fn is_at_end(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Eof)
    }

    /// Check the current token's kind, ignoring any payload.
    #[inline]
    pub fn check(&self, kind: TokenKind) -> bool {
        discriminant(&self.current_kind()) == discriminant(&kind)
    }

    #[inline]
    pub fn check_ident(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Ident(_))
    }

    /// Whether the current token is the identifier `name`.
    #[inline]
    pub fn check_name(&self, name: Name) -> bool {
        self.current_kind() == TokenKind::Ident(name)
    }

    /// Kind of the token `n` positions ahead (`Eof` past the end).
    pub fn peek_kind(&self, n: usize) -> TokenKind {
        self.tokens
            .get(self.pos + n)
            .map_or(TokenKind::Eof, |t| t.kind)
    }

    #[inline]
    pub fn peek_next_kind(&self) -> TokenKind {
        self.peek_kind(1)
    }

    /// Kind of the first token at or after the cursor that is not a newline.
    pub fn peek_past_newlines(&self) -> TokenKind {
        self.tokens[self.pos..]
            .iter()
            .map(|t| t.kind)
            .find(|k| !matches!(k, TokenKind::Newline))
            .unwrap_or(TokenKind::Eof)
    }

    /// Advance and return the consumed token. Never moves past `Eof`.
    pub fn advance(&mut self) -> Token {
        let token = self.current();
        if !self.is_at_end() {
            self.pos += 1;
        }
        token
    }

    pub fn skip_newlines(&mut self) {
        while matches!(self.current_kind(), TokenKind::Newline) {
            self.pos += 1;
        }
    }

    /// Skip newlines and semicolons between statements.
    pub fn skip_separators(&mut self) {
        while matches!(
            self.current_kind(),
            TokenKind::Newline | TokenKind::Semicolon
        ) {
            self.pos += 1;
        }
    }

    /// Consume `kind` if it is current.
    pub fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            let code = if matches!(
                kind,
                TokenKind::RParen | TokenKind::RBrace | TokenKind::RBracket
            ) {
                ErrorCode::E1003
            } else {
                ErrorCode::E1001
            };
            Err(ParseError::expected(
                code,
                kind.describe(),
                self.current_kind(),
                self.current_span(),
            ))
        }
    }

    pub fn expect_ident(&mut self) -> Result<Name, ParseError> {
        if let TokenKind::Ident(name) = self.current_kind() {
            self.advance();
            Ok(name)
        } else {
            Err(ParseError::expected(
                ErrorCode::E1004,
                "identifier",
                self.current_kind(),
                self.current_span(),
            ))
        }
    }
}

#[cfg(test)]
mod tests;
