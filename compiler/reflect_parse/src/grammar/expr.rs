//! Expression parsing.
//!
//! Precedence climbing over the binary operators, with `is`, infix `to`
//! and `as` slotted in at their Kotlin levels:
//!
//! | level | operators |
//! |---|---|
//! | 1 | `\|\|` |
//! | 2 | `&&` |
//! | 3 | `==` `!=` |
//! | 4 | `<` `<=` `>` `>=` |
//! | 5 | `is` `!is` |
//! | 6 | `to` |
//! | 7 | `+` `-` |
//! | 8 | `*` `/` `%` |
//! | 9 | `as` |
//!
//! Newlines end an expression at brace level unless the next line starts
//! with `.`, `?.`, `&&` or `||`.

use reflect_diagnostic::ErrorCode;
use reflect_ir::{
    BinaryOp, CallArg, ExprId, ExprKind, LambdaParam, Span, UnaryOp, WhenArm, WhenCondition,
};
use reflect_stack::ensure_sufficient_stack;

use crate::error::{ErrorContext, ParseError};
use crate::lexer::TokenKind;
use crate::Parser;

const IS_PRECEDENCE: u8 = 5;
const TO_PRECEDENCE: u8 = 6;

/// An infix operator at the current position.
#[derive(Copy, Clone)]
enum Infix {
    Binary(BinaryOp),
    Is { negated: bool },
    To,
}

impl Infix {
    fn precedence(self) -> u8 {
        match self {
            Infix::Binary(op) => op.precedence(),
            Infix::Is { .. } => IS_PRECEDENCE,
            Infix::To => TO_PRECEDENCE,
        }
    }
}

impl Parser<'_> {
    /// Parse an expression.
    pub(crate) fn parse_expr(&mut self) -> Result<ExprId, ParseError> {
        ensure_sufficient_stack(|| self.parse_binary(1))
    }

    fn alloc(&mut self, kind: ExprKind, span: Span) -> ExprId {
        self.unit.arena.alloc(kind, span)
    }

    fn span_from(&self, start: Span) -> Span {
        start.merge(self.cursor.previous_span())
    }

    fn parse_binary(&mut self, min_prec: u8) -> Result<ExprId, ParseError> {
        let start = self.cursor.current_span();
        let mut lhs = self.parse_cast()?;
        loop {
            self.skip_nested_newlines();
            self.continue_line(&[TokenKind::AmpAmp, TokenKind::PipePipe]);
            let Some(op) = self.current_infix() else {
                break;
            };
            let prec = op.precedence();
            if prec < min_prec {
                break;
            }
            match op {
                Infix::Binary(op) => {
                    self.cursor.advance();
                    self.cursor.skip_newlines();
                    let rhs = self.parse_binary(prec + 1)?;
                    lhs = self.alloc(ExprKind::Binary { op, lhs, rhs }, self.span_from(start));
                }
                Infix::To => {
                    self.cursor.advance();
                    self.cursor.skip_newlines();
                    let second = self.parse_binary(prec + 1)?;
                    lhs = self.unit.arena.pair(lhs, second, self.span_from(start));
                }
                Infix::Is { negated } => {
                    if negated {
                        self.cursor.advance();
                    }
                    self.cursor.advance();
                    let ty = self.parse_type()?;
                    lhs = self.alloc(
                        ExprKind::Is {
                            expr: lhs,
                            ty,
                            negated,
                        },
                        self.span_from(start),
                    );
                }
            }
        }
        Ok(lhs)
    }

    fn current_infix(&self) -> Option<Infix> {
        let op = match self.cursor.current_kind() {
            TokenKind::PipePipe => BinaryOp::Or,
            TokenKind::AmpAmp => BinaryOp::And,
            TokenKind::EqEq => BinaryOp::Eq,
            TokenKind::NotEq => BinaryOp::NotEq,
            TokenKind::Lt => BinaryOp::Lt,
            TokenKind::LtEq => BinaryOp::LtEq,
            TokenKind::Gt => BinaryOp::Gt,
            TokenKind::GtEq => BinaryOp::GtEq,
            TokenKind::Plus => BinaryOp::Add,
            TokenKind::Minus => BinaryOp::Sub,
            TokenKind::Star => BinaryOp::Mul,
            TokenKind::Slash => BinaryOp::Div,
            TokenKind::Percent => BinaryOp::Rem,
            TokenKind::Is => return Some(Infix::Is { negated: false }),
            TokenKind::Bang if self.cursor.peek_next_kind() == TokenKind::Is => {
                return Some(Infix::Is { negated: true });
            }
            TokenKind::Ident(name) if name == reflect_ir::Name::TO => return Some(Infix::To),
            _ => return None,
        };
        Some(Infix::Binary(op))
    }

    /// `expr as T`, `expr as? T`
    fn parse_cast(&mut self) -> Result<ExprId, ParseError> {
        let start = self.cursor.current_span();
        let mut expr = self.parse_prefix()?;
        while self.cursor.eat(TokenKind::As) {
            self.cursor.eat(TokenKind::Question);
            let ty = self.parse_type()?;
            expr = self.unit.arena.cast(expr, ty, self.span_from(start));
        }
        Ok(expr)
    }

    fn parse_prefix(&mut self) -> Result<ExprId, ParseError> {
        let start = self.cursor.current_span();
        let op = match self.cursor.current_kind() {
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Bang => UnaryOp::Not,
            _ => return self.parse_postfix(),
        };
        self.cursor.advance();
        let operand = ensure_sufficient_stack(|| self.parse_prefix())?;
        Ok(self.alloc(ExprKind::Unary { op, operand }, self.span_from(start)))
    }

    fn parse_postfix(&mut self) -> Result<ExprId, ParseError> {
        let start = self.cursor.current_span();
        let mut expr = self.parse_primary()?;
        loop {
            self.skip_nested_newlines();
            self.continue_line(&[TokenKind::Dot, TokenKind::SafeDot]);
            match self.cursor.current_kind() {
                TokenKind::Dot | TokenKind::SafeDot => {
                    let safe = self.cursor.advance().kind == TokenKind::SafeDot;
                    self.cursor.skip_newlines();
                    let name = self.cursor.expect_ident()?;
                    expr = self.alloc(
                        ExprKind::Field {
                            receiver: expr,
                            name,
                            safe,
                        },
                        self.span_from(start),
                    );
                }
                TokenKind::LParen => {
                    let mut args = self.parse_call_args()?;
                    if self.cursor.check(TokenKind::LBrace) {
                        args.push(CallArg::positional(self.parse_lambda()?));
                    }
                    let args = self.unit.arena.alloc_call_args(args);
                    expr = self.alloc(ExprKind::Call { callee: expr, args }, self.span_from(start));
                }
                // `emptyList<Int>()`: explicit type arguments are dropped.
                TokenKind::Lt if self.is_callable_head(expr) => {
                    let save = self.cursor.position();
                    if self.parse_type_args().is_ok() && self.cursor.check(TokenKind::LParen) {
                        continue;
                    }
                    self.cursor.set_position(save);
                    break;
                }
                TokenKind::LBrace if self.is_callable_head(expr) => {
                    let lambda = self.parse_lambda()?;
                    let args = self.unit.arena.alloc_call_args([CallArg::positional(lambda)]);
                    expr = self.alloc(ExprKind::Call { callee: expr, args }, self.span_from(start));
                }
                TokenKind::LBracket => {
                    let index = self.with_paren_depth(1, |p| {
                        p.cursor.advance();
                        p.cursor.skip_newlines();
                        let index = p.parse_expr()?;
                        p.cursor.skip_newlines();
                        p.cursor.expect(TokenKind::RBracket)?;
                        Ok::<_, ParseError>(index)
                    })?;
                    expr = self.unit.arena.index(expr, index, self.span_from(start));
                }
                // `x!!` asserts non-null; evaluation is unchanged.
                TokenKind::Bang if self.cursor.peek_next_kind() == TokenKind::Bang => {
                    self.cursor.advance();
                    self.cursor.advance();
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    /// Whether `callee` can take a trailing lambda or explicit type
    /// arguments: `name { ... }`, `recv.name<T>()`.
    fn is_callable_head(&self, callee: ExprId) -> bool {
        matches!(
            self.unit.arena.kind(callee),
            ExprKind::Ident(_) | ExprKind::Field { .. }
        )
    }

    /// `(a, name = b)`
    pub(crate) fn parse_call_args(&mut self) -> Result<Vec<CallArg>, ParseError> {
        self.with_paren_depth(1, |p| -> Result<Vec<CallArg>, ParseError> {
            p.cursor.expect(TokenKind::LParen)?;
            let mut args = Vec::new();
            p.cursor.skip_newlines();
            while !p.cursor.check(TokenKind::RParen) {
                let name = match p.cursor.current_kind() {
                    TokenKind::Ident(name) if p.cursor.peek_next_kind() == TokenKind::Eq => {
                        p.cursor.advance();
                        p.cursor.advance();
                        p.cursor.skip_newlines();
                        Some(name)
                    }
                    _ => None,
                };
                let value = p.parse_expr()?;
                args.push(CallArg { name, value });
                p.cursor.skip_newlines();
                if !p.cursor.eat(TokenKind::Comma) {
                    break;
                }
                p.cursor.skip_newlines();
            }
            p.cursor.expect(TokenKind::RParen)?;
            Ok(args)
        })
        .map_err(|e| e.in_context(ErrorContext::CallArgs))
    }

    fn parse_primary(&mut self) -> Result<ExprId, ParseError> {
        let token = self.cursor.current();
        let span = token.span;
        let kind = match token.kind {
            TokenKind::Int(n) => ExprKind::Int(n),
            TokenKind::Float(bits) => ExprKind::Double(bits),
            TokenKind::Str(s) => ExprKind::Str(s),
            TokenKind::Char(c) => ExprKind::Char(c),
            TokenKind::True => ExprKind::Bool(true),
            TokenKind::False => ExprKind::Bool(false),
            TokenKind::Null => ExprKind::Null,
            TokenKind::This => ExprKind::This,
            TokenKind::Ident(name) => ExprKind::Ident(name),
            TokenKind::LParen => return self.parse_parenthesized(),
            TokenKind::LBrace => return self.parse_lambda(),
            TokenKind::If => return self.parse_if(),
            TokenKind::When => {
                return self
                    .parse_when()
                    .map_err(|e| e.in_context(ErrorContext::When));
            }
            TokenKind::Return => return self.parse_return(),
            // `::name` function reference
            TokenKind::ColonColon => {
                self.cursor.advance();
                let name = self.cursor.expect_ident()?;
                return Ok(self.alloc(ExprKind::Ident(name), self.span_from(span)));
            }
            found => {
                return Err(ParseError::expected(ErrorCode::E1002, "expression", found, span)
                    .in_context(ErrorContext::Expression));
            }
        };
        self.cursor.advance();
        Ok(self.alloc(kind, span))
    }

    fn parse_parenthesized(&mut self) -> Result<ExprId, ParseError> {
        self.with_paren_depth(1, |p| {
            p.cursor.expect(TokenKind::LParen)?;
            p.cursor.skip_newlines();
            let inner = p.parse_expr()?;
            p.cursor.skip_newlines();
            p.cursor.expect(TokenKind::RParen)?;
            Ok(inner)
        })
    }

    fn parse_return(&mut self) -> Result<ExprId, ParseError> {
        let start = self.cursor.expect(TokenKind::Return)?.span;
        let ends_here = matches!(
            self.cursor.current_kind(),
            TokenKind::Newline
                | TokenKind::Semicolon
                | TokenKind::RBrace
                | TokenKind::RParen
                | TokenKind::Eof
        );
        let value = if ends_here {
            ExprId::INVALID
        } else {
            self.parse_expr()?
        };
        Ok(self.alloc(ExprKind::Return(value), self.span_from(start)))
    }

    /// `if (cond) a else b`; block branches become `Block` expressions.
    fn parse_if(&mut self) -> Result<ExprId, ParseError> {
        let start = self.cursor.expect(TokenKind::If)?.span;
        let cond = self.parse_parenthesized()?;
        self.cursor.skip_newlines();
        let then_branch = self.parse_branch()?;
        self.continue_line(&[TokenKind::Else]);
        let else_branch = if self.cursor.eat(TokenKind::Else) {
            self.cursor.skip_newlines();
            self.parse_branch()?
        } else {
            ExprId::INVALID
        };
        Ok(self.alloc(
            ExprKind::If {
                cond,
                then_branch,
                else_branch,
            },
            self.span_from(start),
        ))
    }

    fn parse_branch(&mut self) -> Result<ExprId, ParseError> {
        if self.cursor.check(TokenKind::LBrace) {
            self.parse_block()
        } else {
            self.parse_expr()
        }
    }

    /// `when (subject) { is A -> x; 1, 2 -> y; else -> z }`
    fn parse_when(&mut self) -> Result<ExprId, ParseError> {
        let start = self.cursor.expect(TokenKind::When)?.span;
        let subject = if self.cursor.check(TokenKind::LParen) {
            self.parse_parenthesized()?
        } else {
            ExprId::INVALID
        };
        self.cursor.skip_newlines();

        let arms = self.with_paren_depth(0, |p| -> Result<Vec<WhenArm>, ParseError> {
            p.cursor.expect(TokenKind::LBrace)?;
            let mut arms = Vec::new();
            loop {
                p.cursor.skip_separators();
                if p.cursor.eat(TokenKind::RBrace) {
                    break;
                }
                let mut conditions = vec![p.parse_when_condition()?];
                while p.cursor.eat(TokenKind::Comma) {
                    p.cursor.skip_newlines();
                    conditions.push(p.parse_when_condition()?);
                }
                p.cursor.expect(TokenKind::Arrow)?;
                p.cursor.skip_newlines();
                let body = p.parse_branch()?;
                arms.extend(
                    conditions
                        .into_iter()
                        .map(|condition| WhenArm { condition, body }),
                );
                if p.cursor.is_at_end() {
                    return Err(ParseError::new(
                        ErrorCode::E1003,
                        "unclosed `when` body",
                        start,
                    ));
                }
            }
            Ok(arms)
        })?;

        let arms = self.unit.arena.alloc_when_arms(arms);
        Ok(self.alloc(ExprKind::When { subject, arms }, self.span_from(start)))
    }

    fn parse_when_condition(&mut self) -> Result<WhenCondition, ParseError> {
        match self.cursor.current_kind() {
            TokenKind::Else => {
                self.cursor.advance();
                Ok(WhenCondition::Else)
            }
            TokenKind::Is => {
                self.cursor.advance();
                Ok(WhenCondition::Is(self.parse_type()?))
            }
            _ => Ok(WhenCondition::Value(self.parse_expr()?)),
        }
    }

    /// `{ stmts }` as a block expression.
    pub(crate) fn parse_block(&mut self) -> Result<ExprId, ParseError> {
        let start = self.cursor.current_span();
        let stmts = self.with_paren_depth(0, |p| -> Result<Vec<ExprId>, ParseError> {
            p.cursor.expect(TokenKind::LBrace)?;
            p.parse_statements(start)
        })?;
        let list = self.unit.arena.alloc_expr_list(stmts);
        Ok(self.alloc(ExprKind::Block(list), self.span_from(start)))
    }

    /// Statements up to and including the closing `}`.
    fn parse_statements(&mut self, open: Span) -> Result<Vec<ExprId>, ParseError> {
        let mut stmts = Vec::new();
        loop {
            self.cursor.skip_separators();
            if self.cursor.eat(TokenKind::RBrace) {
                return Ok(stmts);
            }
            if self.cursor.is_at_end() {
                return Err(ParseError::new(ErrorCode::E1003, "unclosed `{`", open));
            }
            stmts.push(self.parse_statement()?);
        }
    }

    fn parse_statement(&mut self) -> Result<ExprId, ParseError> {
        let start = self.cursor.current_span();
        let mutable = match self.cursor.current_kind() {
            TokenKind::Val => false,
            TokenKind::Var => true,
            _ => return self.parse_expr(),
        };
        self.cursor.advance();
        let name = self.cursor.expect_ident()?;
        let ty = if self.cursor.eat(TokenKind::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };
        self.cursor.expect(TokenKind::Eq)?;
        self.cursor.skip_newlines();
        let init = self.parse_expr()?;
        Ok(self.alloc(
            ExprKind::Let {
                name,
                ty,
                init,
                mutable,
            },
            self.span_from(start),
        ))
    }

    /// `{ a: T, b -> body }` or `{ body }`.
    ///
    /// A single expression body is stored directly; several statements (or
    /// a lone `val`) become a `Block`.
    fn parse_lambda(&mut self) -> Result<ExprId, ParseError> {
        let start = self.cursor.current_span();
        let (params, stmts) = self
            .with_paren_depth(0, |p| -> Result<(Vec<LambdaParam>, Vec<ExprId>), ParseError> {
                p.cursor.expect(TokenKind::LBrace)?;
                p.cursor.skip_newlines();
                let params = p.try_parse_lambda_params().unwrap_or_default();
                let stmts = p.parse_statements(start)?;
                Ok((params, stmts))
            })
            .map_err(|e| e.in_context(ErrorContext::Lambda))?;

        let body = match stmts.as_slice() {
            [single] if !matches!(self.unit.arena.kind(*single), ExprKind::Let { .. }) => *single,
            _ => {
                let list = self.unit.arena.alloc_expr_list(stmts);
                self.alloc(ExprKind::Block(list), self.span_from(start))
            }
        };
        let span = self.span_from(start);
        Ok(self.unit.arena.lambda(params, body, span))
    }

    /// Speculatively parse `a: T, b ->`; restores the cursor on failure.
    fn try_parse_lambda_params(&mut self) -> Option<Vec<LambdaParam>> {
        let save = self.cursor.position();
        let result = self.parse_lambda_params();
        if result.is_none() {
            self.cursor.set_position(save);
        }
        result
    }

    fn parse_lambda_params(&mut self) -> Option<Vec<LambdaParam>> {
        let mut params = Vec::new();
        loop {
            let TokenKind::Ident(name) = self.cursor.current_kind() else {
                return None;
            };
            self.cursor.advance();
            let ty = if self.cursor.eat(TokenKind::Colon) {
                Some(self.parse_type().ok()?)
            } else {
                None
            };
            params.push(LambdaParam { name, ty });
            if !self.cursor.eat(TokenKind::Comma) {
                break;
            }
            self.cursor.skip_newlines();
        }
        self.cursor.eat(TokenKind::Arrow).then_some(params)
    }
}
