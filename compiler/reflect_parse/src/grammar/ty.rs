//! Type parsing.
//!
//! Types stay syntactic: qualified heads keep their last segment, and
//! variance modifiers on arguments are dropped.

use reflect_diagnostic::ErrorCode;
use reflect_ir::TypeRef;

use crate::error::{ErrorContext, ParseError};
use crate::lexer::TokenKind;
use crate::Parser;

impl Parser<'_> {
    /// Parse a type expression.
    pub(crate) fn parse_type(&mut self) -> Result<TypeRef, ParseError> {
        self.parse_type_inner()
            .map_err(|e| e.in_context(ErrorContext::Type))
    }

    fn parse_type_inner(&mut self) -> Result<TypeRef, ParseError> {
        let ty = match self.cursor.current_kind() {
            TokenKind::LParen => self.parse_function_or_grouped_type()?,
            TokenKind::Ident(_) => {
                let name = self.parse_qualified_name()?;
                let args = self.parse_type_args()?;
                TypeRef::generic(name, args)
            }
            found => {
                return Err(ParseError::expected(
                    ErrorCode::E1005,
                    "type",
                    found,
                    self.cursor.current_span(),
                ));
            }
        };
        Ok(self.parse_nullable_suffix(ty))
    }

    fn parse_nullable_suffix(&mut self, mut ty: TypeRef) -> TypeRef {
        while self.cursor.eat(TokenKind::Question) {
            ty = ty.nullable();
        }
        ty
    }

    /// `a.b.C` keeping `C`.
    fn parse_qualified_name(&mut self) -> Result<reflect_ir::Name, ParseError> {
        let mut name = self.cursor.expect_ident()?;
        while self.cursor.check(TokenKind::Dot)
            && matches!(self.cursor.peek_next_kind(), TokenKind::Ident(_))
        {
            self.cursor.advance();
            name = self.cursor.expect_ident()?;
        }
        Ok(name)
    }

    /// `<A, out B, *>`, or nothing.
    pub(crate) fn parse_type_args(&mut self) -> Result<Vec<TypeRef>, ParseError> {
        if !self.cursor.eat(TokenKind::Lt) {
            return Ok(Vec::new());
        }
        let mut args = Vec::new();
        loop {
            self.cursor.skip_newlines();
            if self.cursor.eat(TokenKind::Star) {
                args.push(TypeRef::Star);
            } else {
                self.skip_variance();
                args.push(self.parse_type()?);
            }
            self.cursor.skip_newlines();
            if !self.cursor.eat(TokenKind::Comma) {
                break;
            }
        }
        self.cursor.expect(TokenKind::Gt)?;
        Ok(args)
    }

    fn skip_variance(&mut self) {
        let at_variance = self.cursor.check_name(self.kw.out) || self.cursor.check_name(self.kw.in_);
        if at_variance && matches!(self.cursor.peek_next_kind(), TokenKind::Ident(_)) {
            self.cursor.advance();
        }
    }

    /// `(A, B) -> R` or a parenthesized type such as `((A) -> R)?`.
    fn parse_function_or_grouped_type(&mut self) -> Result<TypeRef, ParseError> {
        self.cursor.expect(TokenKind::LParen)?;
        let mut params = Vec::new();
        self.cursor.skip_newlines();
        while !self.cursor.check(TokenKind::RParen) {
            params.push(self.parse_type()?);
            self.cursor.skip_newlines();
            if !self.cursor.eat(TokenKind::Comma) {
                break;
            }
            self.cursor.skip_newlines();
        }
        self.cursor.expect(TokenKind::RParen)?;

        if self.cursor.eat(TokenKind::Arrow) {
            let ret = self.parse_type()?;
            return Ok(TypeRef::function(params, ret));
        }
        match params.len() {
            1 => Ok(params.remove(0)),
            _ => Err(ParseError::new(
                ErrorCode::E1005,
                "expected `->` after function type parameters",
                self.cursor.current_span(),
            )),
        }
    }

    /// `<T, out U : Bound>` declaration type parameters; bounds are dropped.
    pub(crate) fn parse_type_params(
        &mut self,
    ) -> Result<smallvec::SmallVec<[reflect_ir::Name; 2]>, ParseError> {
        let mut params = smallvec::SmallVec::new();
        if !self.cursor.eat(TokenKind::Lt) {
            return Ok(params);
        }
        loop {
            self.skip_variance();
            params.push(self.cursor.expect_ident()?);
            if self.cursor.eat(TokenKind::Colon) {
                self.parse_type()?;
            }
            if !self.cursor.eat(TokenKind::Comma) {
                break;
            }
        }
        self.cursor.expect(TokenKind::Gt)?;
        Ok(params)
    }
}

#[cfg(test)]
mod tests;
