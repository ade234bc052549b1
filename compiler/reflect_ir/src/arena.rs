//! Append-only expression arena with checkpoint/rollback.
//!
//! Parsed bodies and synthesized bodies share one arena per compilation
//! unit. Synthesis appends; a failed declaration (or an aborted pass) rolls
//! the arena back to a previously taken [`ArenaMark`], so no half-built
//! expressions survive.

use crate::expr::{
    CallArg, CallArgRange, Expr, ExprId, ExprKind, ExprRange, LambdaParam, LambdaParamRange,
    WhenArm, WhenArmRange,
};
use crate::{Name, Span, TypeRef};

/// Convert a table length to a `u32` index.
///
/// # Panics
/// Panics if the table exceeds `u32::MAX` entries.
pub(crate) fn to_u32(len: usize, what: &str) -> u32 {
    u32::try_from(len).unwrap_or_else(|_| panic!("too many {what}: {len} exceeds u32::MAX"))
}

/// Convert a list length to a `u16` range length.
///
/// # Panics
/// Panics if the list exceeds `u16::MAX` entries.
pub(crate) fn to_u16(len: usize, what: &str) -> u16 {
    u16::try_from(len).unwrap_or_else(|_| panic!("too many {what}: {len} exceeds u16::MAX"))
}

/// Table lengths captured by [`ExprArena::checkpoint`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ArenaMark {
    exprs: usize,
    expr_lists: usize,
    call_args: usize,
    lambda_params: usize,
    when_arms: usize,
}

/// Flat storage for every expression of a compilation unit.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExprArena {
    exprs: Vec<Expr>,
    expr_lists: Vec<ExprId>,
    call_args: Vec<CallArg>,
    lambda_params: Vec<LambdaParam>,
    when_arms: Vec<WhenArm>,
}

impl ExprArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an expression, returning its ID.
    pub fn alloc(&mut self, kind: ExprKind, span: Span) -> ExprId {
        let id = ExprId::new(to_u32(self.exprs.len(), "expressions"));
        self.exprs.push(Expr::new(kind, span));
        id
    }

    #[inline]
    pub fn get(&self, id: ExprId) -> &Expr {
        &self.exprs[id.index()]
    }

    #[inline]
    pub fn kind(&self, id: ExprId) -> &ExprKind {
        &self.exprs[id.index()].kind
    }

    #[inline]
    pub fn span(&self, id: ExprId) -> Span {
        self.exprs[id.index()].span
    }

    /// Number of allocated expressions.
    pub fn len(&self) -> usize {
        self.exprs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exprs.is_empty()
    }

    pub fn alloc_expr_list(&mut self, ids: impl IntoIterator<Item = ExprId>) -> ExprRange {
        let start = to_u32(self.expr_lists.len(), "expression lists");
        self.expr_lists.extend(ids);
        let len = to_u16(self.expr_lists.len() - start as usize, "list elements");
        ExprRange::new(start, len)
    }

    pub fn alloc_call_args(&mut self, args: impl IntoIterator<Item = CallArg>) -> CallArgRange {
        let start = to_u32(self.call_args.len(), "call arguments");
        self.call_args.extend(args);
        let len = to_u16(self.call_args.len() - start as usize, "call arguments");
        CallArgRange::new(start, len)
    }

    pub fn alloc_lambda_params(
        &mut self,
        params: impl IntoIterator<Item = LambdaParam>,
    ) -> LambdaParamRange {
        let start = to_u32(self.lambda_params.len(), "lambda parameters");
        self.lambda_params.extend(params);
        let len = to_u16(self.lambda_params.len() - start as usize, "lambda parameters");
        LambdaParamRange::new(start, len)
    }

    pub fn alloc_when_arms(&mut self, arms: impl IntoIterator<Item = WhenArm>) -> WhenArmRange {
        let start = to_u32(self.when_arms.len(), "when arms");
        self.when_arms.extend(arms);
        let len = to_u16(self.when_arms.len() - start as usize, "when arms");
        WhenArmRange::new(start, len)
    }

    pub fn expr_list(&self, range: ExprRange) -> &[ExprId] {
        &self.expr_lists[range.to_range()]
    }

    pub fn call_args(&self, range: CallArgRange) -> &[CallArg] {
        &self.call_args[range.to_range()]
    }

    pub fn lambda_params(&self, range: LambdaParamRange) -> &[LambdaParam] {
        &self.lambda_params[range.to_range()]
    }

    pub fn when_arms(&self, range: WhenArmRange) -> &[WhenArm] {
        &self.when_arms[range.to_range()]
    }

    /// Capture the current table lengths.
    pub fn checkpoint(&self) -> ArenaMark {
        ArenaMark {
            exprs: self.exprs.len(),
            expr_lists: self.expr_lists.len(),
            call_args: self.call_args.len(),
            lambda_params: self.lambda_params.len(),
            when_arms: self.when_arms.len(),
        }
    }

    /// Discard everything allocated since `mark`.
    pub fn rollback(&mut self, mark: ArenaMark) {
        self.exprs.truncate(mark.exprs);
        self.expr_lists.truncate(mark.expr_lists);
        self.call_args.truncate(mark.call_args);
        self.lambda_params.truncate(mark.lambda_params);
        self.when_arms.truncate(mark.when_arms);
    }

    // Construction helpers for synthesized code.

    pub fn int(&mut self, value: i64, span: Span) -> ExprId {
        self.alloc(ExprKind::Int(value), span)
    }

    pub fn string(&mut self, value: Name, span: Span) -> ExprId {
        self.alloc(ExprKind::Str(value), span)
    }

    pub fn ident(&mut self, name: Name, span: Span) -> ExprId {
        self.alloc(ExprKind::Ident(name), span)
    }

    pub fn this(&mut self, span: Span) -> ExprId {
        self.alloc(ExprKind::This, span)
    }

    pub fn field(&mut self, receiver: ExprId, name: Name, span: Span) -> ExprId {
        self.alloc(
            ExprKind::Field {
                receiver,
                name,
                safe: false,
            },
            span,
        )
    }

    /// `callee(args)` with a plain identifier callee.
    pub fn call(&mut self, callee: Name, args: Vec<CallArg>, span: Span) -> ExprId {
        let callee = self.ident(callee, span);
        let args = self.alloc_call_args(args);
        self.alloc(ExprKind::Call { callee, args }, span)
    }

    /// `receiver.method(args)`
    pub fn method_call(
        &mut self,
        receiver: ExprId,
        method: Name,
        args: Vec<CallArg>,
        span: Span,
    ) -> ExprId {
        let callee = self.field(receiver, method, span);
        let args = self.alloc_call_args(args);
        self.alloc(ExprKind::Call { callee, args }, span)
    }

    pub fn lambda(&mut self, params: Vec<LambdaParam>, body: ExprId, span: Span) -> ExprId {
        let params = self.alloc_lambda_params(params);
        self.alloc(ExprKind::Lambda { params, body }, span)
    }

    pub fn pair(&mut self, first: ExprId, second: ExprId, span: Span) -> ExprId {
        self.alloc(ExprKind::Pair { first, second }, span)
    }

    pub fn cast(&mut self, expr: ExprId, ty: TypeRef, span: Span) -> ExprId {
        self.alloc(ExprKind::Cast { expr, ty }, span)
    }

    pub fn index(&mut self, receiver: ExprId, index: ExprId, span: Span) -> ExprId {
        self.alloc(ExprKind::Index { receiver, index }, span)
    }
}

#[cfg(test)]
mod tests;
