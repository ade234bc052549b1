//! Error recovery for the parser.
//!
//! After a failed declaration the parser skips to the next token that can
//! start a declaration at the same brace depth.

use crate::lexer::TokenKind;
use crate::Parser;

impl Parser<'_> {
    /// Whether the current token can start a declaration.
    pub(crate) fn at_declaration_start(&self) -> bool {
        match self.cursor.current_kind() {
            TokenKind::At
            | TokenKind::Class
            | TokenKind::Interface
            | TokenKind::Object
            | TokenKind::Fun
            | TokenKind::Val
            | TokenKind::Var => true,
            TokenKind::Ident(name) => {
                self.kw.is_modifier(name)
                    && matches!(
                        self.cursor.peek_next_kind(),
                        TokenKind::Ident(_)
                            | TokenKind::Class
                            | TokenKind::Interface
                            | TokenKind::Object
                            | TokenKind::Fun
                            | TokenKind::Val
                            | TokenKind::Var
                    )
            }
            _ => false,
        }
    }

    /// Skip to the next declaration start at brace depth zero.
    ///
    /// Stops before a `}` that would close the enclosing body, so class
    /// bodies can continue with their remaining members.
    pub(crate) fn recover_to_declaration(&mut self) {
        let mut depth = 0u32;
        // Always make progress past the offending token.
        let mut first = true;
        loop {
            match self.cursor.current_kind() {
                TokenKind::Eof => return,
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => {
                    if depth == 0 {
                        return;
                    }
                    depth -= 1;
                }
                TokenKind::Newline if depth == 0 => {
                    self.cursor.skip_newlines();
                    if self.at_declaration_start() {
                        return;
                    }
                    continue;
                }
                _ if depth == 0 && !first && self.at_declaration_start() => return,
                _ => {}
            }
            first = false;
            self.cursor.advance();
        }
    }
}
