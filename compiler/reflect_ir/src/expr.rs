//! Expression nodes for the flat expression arena.
//!
//! Expressions reference their children by [`ExprId`] and their lists by
//! typed ranges into side tables of the [`ExprArena`](crate::ExprArena);
//! there is no `Box<Expr>` anywhere in the tree.

use std::fmt;

use crate::{Name, Span, TypeRef};

/// Index into the expression arena.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub struct ExprId(u32);

impl ExprId {
    /// Sentinel for "no expression" (e.g. a missing else branch).
    pub const INVALID: ExprId = ExprId(u32::MAX);

    #[inline]
    pub const fn new(index: u32) -> Self {
        ExprId(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn is_valid(self) -> bool {
        self.0 != u32::MAX
    }
}

impl fmt::Debug for ExprId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "ExprId({})", self.0)
        } else {
            write!(f, "ExprId::INVALID")
        }
    }
}

impl Default for ExprId {
    fn default() -> Self {
        Self::INVALID
    }
}

/// Defines a `(start, len)` range type over one of the arena's side tables.
macro_rules! define_range {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
        pub struct $name {
            pub start: u32,
            pub len: u16,
        }

        impl $name {
            pub const EMPTY: $name = $name { start: 0, len: 0 };

            #[inline]
            pub const fn new(start: u32, len: u16) -> Self {
                $name { start, len }
            }

            #[inline]
            pub const fn is_empty(&self) -> bool {
                self.len == 0
            }

            #[inline]
            pub const fn len(&self) -> usize {
                self.len as usize
            }

            #[inline]
            pub fn to_range(&self) -> std::ops::Range<usize> {
                self.start as usize..self.start as usize + self.len as usize
            }
        }
    };
}

define_range!(
    /// Range of expression ids (block statements, list elements).
    ExprRange
);
define_range!(
    /// Range of call arguments.
    CallArgRange
);
define_range!(
    /// Range of lambda parameters.
    LambdaParamRange
);
define_range!(
    /// Range of `when` arms.
    WhenArmRange
);

/// Binary operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
}

impl BinaryOp {
    pub fn as_symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }

    /// Binding strength; higher binds tighter.
    ///
    /// Gaps leave room for `is` (5) and infix `to` (6), which sit between
    /// comparison and additive operators.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::Or => 1,
            BinaryOp::And => 2,
            BinaryOp::Eq | BinaryOp::NotEq => 3,
            BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => 4,
            BinaryOp::Add | BinaryOp::Sub => 7,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => 8,
        }
    }
}

/// Unary prefix operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum UnaryOp {
    Not,
    Neg,
}

/// A call argument, optionally named (`copy(x = v)`).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct CallArg {
    pub name: Option<Name>,
    pub value: ExprId,
}

impl CallArg {
    pub fn positional(value: ExprId) -> Self {
        CallArg { name: None, value }
    }

    pub fn named(name: Name, value: ExprId) -> Self {
        CallArg {
            name: Some(name),
            value,
        }
    }
}

/// A lambda parameter with an optional type annotation.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct LambdaParam {
    pub name: Name,
    pub ty: Option<TypeRef>,
}

/// Condition of a `when` arm.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum WhenCondition {
    /// `is T ->`
    Is(TypeRef),
    /// `expr ->`
    Value(ExprId),
    /// `else ->`
    Else,
}

/// One arm of a `when` expression.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct WhenArm {
    pub condition: WhenCondition,
    pub body: ExprId,
}

/// Expression kinds.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum ExprKind {
    Int(i64),
    /// Stored as bits for `Eq`/`Hash`.
    Double(u64),
    Bool(bool),
    Char(char),
    Str(Name),
    Null,
    Ident(Name),
    This,
    /// `receiver.name` or `receiver?.name`.
    Field {
        receiver: ExprId,
        name: Name,
        safe: bool,
    },
    /// `callee(args)`; method calls use a `Field` callee.
    Call { callee: ExprId, args: CallArgRange },
    /// `receiver[index]`
    Index { receiver: ExprId, index: ExprId },
    Binary {
        op: BinaryOp,
        lhs: ExprId,
        rhs: ExprId,
    },
    Unary { op: UnaryOp, operand: ExprId },
    /// `first to second`
    Pair { first: ExprId, second: ExprId },
    /// `{ params -> body }`
    Lambda {
        params: LambdaParamRange,
        body: ExprId,
    },
    /// `expr as T`
    Cast { expr: ExprId, ty: TypeRef },
    /// `expr is T` / `expr !is T`
    Is {
        expr: ExprId,
        ty: TypeRef,
        negated: bool,
    },
    /// `if (cond) then else otherwise`; `otherwise` may be `INVALID`.
    If {
        cond: ExprId,
        then_branch: ExprId,
        else_branch: ExprId,
    },
    /// `when (subject) { arms }`; `subject` may be `INVALID`.
    When { subject: ExprId, arms: WhenArmRange },
    /// `{ stmts }` evaluating to its last statement.
    Block(ExprRange),
    /// `val name: ty = init`
    Let {
        name: Name,
        ty: Option<TypeRef>,
        init: ExprId,
        mutable: bool,
    },
    /// `return value`; `value` may be `INVALID`.
    Return(ExprId),
    /// Placeholder produced by parser recovery.
    Error,
}

/// An expression node with its source span.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr { kind, span }
    }
}
