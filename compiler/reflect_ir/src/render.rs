//! Canonical source rendering.
//!
//! Declarations and expressions render to one normalized Kotlin-like form:
//! single spaces, 4-space indentation, minimal parentheses, and trailing
//! lambdas moved out of the argument list. Two declarations are considered
//! the same when their renderings are equal, which is how synthesized output
//! is compared against expected fixtures.

use crate::expr::{CallArg, ExprKind, UnaryOp, WhenCondition};
use crate::{
    Annotation, AnnotationValue, DeclFlags, DeclKind, Declaration, ExprArena, ExprId, Name,
    StringLookup, TypeRef,
};

// Precedence levels not owned by `BinaryOp`.
const PREC_LOWEST: u8 = 0;
const PREC_IS: u8 = 5;
const PREC_INFIX: u8 = 6;
const PREC_AS: u8 = 9;
const PREC_PREFIX: u8 = 10;
const PREC_POSTFIX: u8 = 11;
const PREC_PRIMARY: u8 = 12;

/// In-memory output buffer.
#[derive(Default)]
struct StringEmitter {
    buffer: String,
}

impl StringEmitter {
    fn emit(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    fn emit_newline(&mut self) {
        self.buffer.push('\n');
    }

    fn emit_indent(&mut self, level: usize) {
        for _ in 0..level * 4 {
            self.buffer.push(' ');
        }
    }

    fn emit_space(&mut self) {
        self.buffer.push(' ');
    }

    fn output(self) -> String {
        self.buffer
    }
}

/// Renders declarations, expressions and types of one unit.
pub struct Renderer<'a> {
    interner: &'a dyn StringLookup,
    arena: &'a ExprArena,
}

impl<'a> Renderer<'a> {
    pub fn new(interner: &'a dyn StringLookup, arena: &'a ExprArena) -> Self {
        Renderer { interner, arena }
    }

    pub fn decl(&self, decl: &Declaration) -> String {
        let mut out = StringEmitter::default();
        self.emit_decl(&mut out, decl, 0);
        out.output()
    }

    pub fn expr(&self, id: ExprId) -> String {
        let mut out = StringEmitter::default();
        self.emit_expr(&mut out, id, PREC_LOWEST, 0);
        out.output()
    }

    pub fn ty(&self, ty: &TypeRef) -> String {
        let mut out = StringEmitter::default();
        self.emit_type(&mut out, ty);
        out.output()
    }

    fn name(&self, name: Name) -> &str {
        self.interner.lookup(name)
    }

    fn emit_decl(&self, out: &mut StringEmitter, decl: &Declaration, indent: usize) {
        for annotation in &decl.annotations {
            self.emit_annotation(out, annotation);
            out.emit_space();
        }
        match decl.kind {
            DeclKind::Function => self.emit_function(out, decl, indent),
            DeclKind::Property => self.emit_property(out, decl, indent),
            DeclKind::Class => self.emit_class_header(out, decl),
        }
    }

    fn emit_annotation(&self, out: &mut StringEmitter, annotation: &Annotation) {
        out.emit("@");
        out.emit(self.name(annotation.name));
        if annotation.args.is_empty() {
            return;
        }
        out.emit("(");
        for (i, arg) in annotation.args.iter().enumerate() {
            if i > 0 {
                out.emit(", ");
            }
            if let Some(name) = arg.name {
                out.emit(self.name(name));
                out.emit(" = ");
            }
            match &arg.value {
                AnnotationValue::Str(s) => out.emit(&quote_str(self.name(*s))),
                AnnotationValue::Int(n) => out.emit(&n.to_string()),
                AnnotationValue::Bool(b) => out.emit(if *b { "true" } else { "false" }),
                AnnotationValue::Ident(id) => out.emit(self.name(*id)),
            }
        }
        out.emit(")");
    }

    fn emit_function(&self, out: &mut StringEmitter, decl: &Declaration, indent: usize) {
        out.emit("fun ");
        self.emit_type_params(out, decl);
        if let Some(receiver) = &decl.receiver {
            self.emit_type(out, receiver);
            out.emit(".");
        }
        out.emit(self.name(decl.name));
        out.emit("(");
        for (i, param) in decl.params.iter().enumerate() {
            if i > 0 {
                out.emit(", ");
            }
            out.emit(self.name(param.name));
            out.emit(": ");
            self.emit_type(out, &param.ty);
            if let Some(default) = param.default {
                out.emit(" = ");
                self.emit_expr(out, default, PREC_LOWEST, indent);
            }
        }
        out.emit(")");
        self.emit_declared_type(out, decl.ret.as_ref());
        if let Some(body) = decl.body {
            if matches!(self.arena.kind(body), ExprKind::Block(_)) {
                out.emit_space();
            } else {
                out.emit(" = ");
            }
            self.emit_expr(out, body, PREC_LOWEST, indent);
        }
    }

    fn emit_property(&self, out: &mut StringEmitter, decl: &Declaration, indent: usize) {
        out.emit(if decl.flags.contains(DeclFlags::MUTABLE) {
            "var "
        } else {
            "val "
        });
        if let Some(receiver) = &decl.receiver {
            self.emit_type(out, receiver);
            out.emit(".");
        }
        out.emit(self.name(decl.name));
        self.emit_declared_type(out, decl.ret.as_ref());
        if let Some(init) = decl.body {
            out.emit(" = ");
            self.emit_expr(out, init, PREC_LOWEST, indent);
        }
    }

    fn emit_class_header(&self, out: &mut StringEmitter, decl: &Declaration) {
        let flags = decl.flags;
        for (flag, keyword) in [
            (DeclFlags::SEALED, "sealed "),
            (DeclFlags::ABSTRACT, "abstract "),
            (DeclFlags::OPEN, "open "),
            (DeclFlags::DATA, "data "),
            (DeclFlags::ENUM, "enum "),
            (DeclFlags::COMPANION, "companion "),
        ] {
            if flags.contains(flag) {
                out.emit(keyword);
            }
        }
        if flags.contains(DeclFlags::ENUM_ENTRY) {
            out.emit(self.name(decl.name));
            return;
        }
        out.emit(if flags.contains(DeclFlags::INTERFACE) {
            "interface "
        } else if flags.contains(DeclFlags::OBJECT) {
            "object "
        } else {
            "class "
        });
        out.emit(self.name(decl.name));
        if !decl.type_params.is_empty() {
            out.emit("<");
            self.emit_names(out, &decl.type_params);
            out.emit(">");
        }
        if !decl.members.is_empty() {
            out.emit("(");
            for (i, member) in decl.members.iter().enumerate() {
                if i > 0 {
                    out.emit(", ");
                }
                if member.is_property {
                    out.emit(if member.mutable { "var " } else { "val " });
                }
                out.emit(self.name(member.name));
                out.emit(": ");
                self.emit_type(out, &member.ty);
                if let Some(default) = member.default {
                    out.emit(" = ");
                    self.emit_expr(out, default, PREC_LOWEST, 0);
                }
            }
            out.emit(")");
        }
        if !decl.supertypes.is_empty() {
            out.emit(" : ");
            for (i, supertype) in decl.supertypes.iter().enumerate() {
                if i > 0 {
                    out.emit(", ");
                }
                self.emit_type(out, supertype);
            }
        }
    }

    fn emit_type_params(&self, out: &mut StringEmitter, decl: &Declaration) {
        if !decl.type_params.is_empty() {
            out.emit("<");
            self.emit_names(out, &decl.type_params);
            out.emit("> ");
        }
    }

    fn emit_names(&self, out: &mut StringEmitter, names: &[Name]) {
        for (i, &name) in names.iter().enumerate() {
            if i > 0 {
                out.emit(", ");
            }
            out.emit(self.name(name));
        }
    }

    fn emit_declared_type(&self, out: &mut StringEmitter, ty: Option<&TypeRef>) {
        if let Some(ty) = ty.filter(|ty| **ty != TypeRef::Infer) {
            out.emit(": ");
            self.emit_type(out, ty);
        }
    }

    fn emit_type(&self, out: &mut StringEmitter, ty: &TypeRef) {
        match ty {
            TypeRef::Named { name, args } => {
                out.emit(self.name(*name));
                if !args.is_empty() {
                    out.emit("<");
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            out.emit(", ");
                        }
                        self.emit_type(out, arg);
                    }
                    out.emit(">");
                }
            }
            TypeRef::Nullable(inner) => {
                let parens = matches!(**inner, TypeRef::Function { .. });
                if parens {
                    out.emit("(");
                }
                self.emit_type(out, inner);
                if parens {
                    out.emit(")");
                }
                out.emit("?");
            }
            TypeRef::Function { params, ret } => {
                out.emit("(");
                for (i, param) in params.iter().enumerate() {
                    if i > 0 {
                        out.emit(", ");
                    }
                    self.emit_type(out, param);
                }
                out.emit(") -> ");
                self.emit_type(out, ret);
            }
            TypeRef::Star => out.emit("*"),
            TypeRef::Infer => out.emit("_"),
        }
    }

    fn precedence(&self, id: ExprId) -> u8 {
        match self.arena.kind(id) {
            ExprKind::Int(n) if *n < 0 => PREC_PREFIX,
            ExprKind::Double(bits) if f64::from_bits(*bits).is_sign_negative() => PREC_PREFIX,
            ExprKind::Int(_)
            | ExprKind::Double(_)
            | ExprKind::Bool(_)
            | ExprKind::Char(_)
            | ExprKind::Str(_)
            | ExprKind::Null
            | ExprKind::Ident(_)
            | ExprKind::This
            | ExprKind::Lambda { .. }
            | ExprKind::Block(_)
            | ExprKind::Error => PREC_PRIMARY,
            ExprKind::Field { .. } | ExprKind::Call { .. } | ExprKind::Index { .. } => {
                PREC_POSTFIX
            }
            ExprKind::Unary { .. } => PREC_PREFIX,
            ExprKind::Cast { .. } => PREC_AS,
            ExprKind::Pair { .. } => PREC_INFIX,
            ExprKind::Is { .. } => PREC_IS,
            ExprKind::Binary { op, .. } => op.precedence(),
            ExprKind::If { .. }
            | ExprKind::When { .. }
            | ExprKind::Let { .. }
            | ExprKind::Return(_) => PREC_LOWEST,
        }
    }

    /// Emit `id`, parenthesized if it binds looser than `min`.
    fn emit_expr(&self, out: &mut StringEmitter, id: ExprId, min: u8, indent: usize) {
        if self.precedence(id) < min {
            out.emit("(");
            self.emit_bare(out, id, indent);
            out.emit(")");
        } else {
            self.emit_bare(out, id, indent);
        }
    }

    fn emit_bare(&self, out: &mut StringEmitter, id: ExprId, indent: usize) {
        match self.arena.kind(id) {
            ExprKind::Int(n) => out.emit(&n.to_string()),
            ExprKind::Double(bits) => out.emit(&format!("{:?}", f64::from_bits(*bits))),
            ExprKind::Bool(b) => out.emit(if *b { "true" } else { "false" }),
            ExprKind::Char(c) => out.emit(&quote_char(*c)),
            ExprKind::Str(s) => out.emit(&quote_str(self.name(*s))),
            ExprKind::Null => out.emit("null"),
            ExprKind::Ident(name) => out.emit(self.name(*name)),
            ExprKind::This => out.emit("this"),
            ExprKind::Field {
                receiver,
                name,
                safe,
            } => {
                self.emit_expr(out, *receiver, PREC_POSTFIX, indent);
                out.emit(if *safe { "?." } else { "." });
                out.emit(self.name(*name));
            }
            ExprKind::Call { callee, args } => {
                self.emit_expr(out, *callee, PREC_POSTFIX, indent);
                self.emit_call_args(out, self.arena.call_args(*args), indent);
            }
            ExprKind::Index { receiver, index } => {
                self.emit_expr(out, *receiver, PREC_POSTFIX, indent);
                out.emit("[");
                self.emit_expr(out, *index, PREC_LOWEST, indent);
                out.emit("]");
            }
            ExprKind::Binary { op, lhs, rhs } => {
                let prec = op.precedence();
                self.emit_expr(out, *lhs, prec, indent);
                out.emit_space();
                out.emit(op.as_symbol());
                out.emit_space();
                self.emit_expr(out, *rhs, prec + 1, indent);
            }
            ExprKind::Unary { op, operand } => {
                out.emit(match op {
                    UnaryOp::Not => "!",
                    UnaryOp::Neg => "-",
                });
                self.emit_expr(out, *operand, PREC_PREFIX, indent);
            }
            ExprKind::Pair { first, second } => {
                self.emit_expr(out, *first, PREC_INFIX, indent);
                out.emit(" to ");
                self.emit_expr(out, *second, PREC_INFIX + 1, indent);
            }
            ExprKind::Lambda { params, body } => {
                out.emit("{ ");
                let params = self.arena.lambda_params(*params);
                if !params.is_empty() {
                    for (i, param) in params.iter().enumerate() {
                        if i > 0 {
                            out.emit(", ");
                        }
                        out.emit(self.name(param.name));
                        if let Some(ty) = &param.ty {
                            out.emit(": ");
                            self.emit_type(out, ty);
                        }
                    }
                    out.emit(" -> ");
                }
                if let ExprKind::Block(stmts) = self.arena.kind(*body) {
                    for (i, &stmt) in self.arena.expr_list(*stmts).iter().enumerate() {
                        if i > 0 {
                            out.emit("; ");
                        }
                        self.emit_expr(out, stmt, PREC_LOWEST, indent);
                    }
                } else {
                    self.emit_expr(out, *body, PREC_LOWEST, indent);
                }
                out.emit(" }");
            }
            ExprKind::Cast { expr, ty } => {
                self.emit_expr(out, *expr, PREC_AS, indent);
                out.emit(" as ");
                self.emit_type(out, ty);
            }
            ExprKind::Is { expr, ty, negated } => {
                self.emit_expr(out, *expr, PREC_INFIX, indent);
                out.emit(if *negated { " !is " } else { " is " });
                self.emit_type(out, ty);
            }
            ExprKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                out.emit("if (");
                self.emit_expr(out, *cond, PREC_LOWEST, indent);
                out.emit(") ");
                self.emit_expr(out, *then_branch, PREC_LOWEST, indent);
                if else_branch.is_valid() {
                    out.emit(" else ");
                    self.emit_expr(out, *else_branch, PREC_LOWEST, indent);
                }
            }
            ExprKind::When { subject, arms } => {
                out.emit("when ");
                if subject.is_valid() {
                    out.emit("(");
                    self.emit_expr(out, *subject, PREC_LOWEST, indent);
                    out.emit(") ");
                }
                out.emit("{");
                out.emit_newline();
                for arm in self.arena.when_arms(*arms) {
                    out.emit_indent(indent + 1);
                    match &arm.condition {
                        WhenCondition::Is(ty) => {
                            out.emit("is ");
                            self.emit_type(out, ty);
                        }
                        WhenCondition::Value(value) => {
                            self.emit_expr(out, *value, PREC_LOWEST, indent + 1);
                        }
                        WhenCondition::Else => out.emit("else"),
                    }
                    out.emit(" -> ");
                    self.emit_expr(out, arm.body, PREC_LOWEST, indent + 1);
                    out.emit_newline();
                }
                out.emit_indent(indent);
                out.emit("}");
            }
            ExprKind::Block(stmts) => {
                out.emit("{");
                out.emit_newline();
                for &stmt in self.arena.expr_list(*stmts) {
                    out.emit_indent(indent + 1);
                    self.emit_expr(out, stmt, PREC_LOWEST, indent + 1);
                    out.emit_newline();
                }
                out.emit_indent(indent);
                out.emit("}");
            }
            ExprKind::Let {
                name,
                ty,
                init,
                mutable,
            } => {
                out.emit(if *mutable { "var " } else { "val " });
                out.emit(self.name(*name));
                self.emit_declared_type(out, ty.as_ref());
                out.emit(" = ");
                self.emit_expr(out, *init, PREC_LOWEST, indent);
            }
            ExprKind::Return(value) => {
                out.emit("return");
                if value.is_valid() {
                    out.emit_space();
                    self.emit_expr(out, *value, PREC_LOWEST, indent);
                }
            }
            ExprKind::Error => out.emit("<error>"),
        }
    }

    /// `(a, b)`, with a final unnamed lambda moved after the parentheses.
    fn emit_call_args(&self, out: &mut StringEmitter, args: &[CallArg], indent: usize) {
        let trailing = args.last().filter(|arg| {
            arg.name.is_none() && matches!(self.arena.kind(arg.value), ExprKind::Lambda { .. })
        });
        let inside = if trailing.is_some() {
            &args[..args.len() - 1]
        } else {
            args
        };
        if !inside.is_empty() || trailing.is_none() {
            out.emit("(");
            for (i, arg) in inside.iter().enumerate() {
                if i > 0 {
                    out.emit(", ");
                }
                if let Some(name) = arg.name {
                    out.emit(self.name(name));
                    out.emit(" = ");
                }
                self.emit_expr(out, arg.value, PREC_LOWEST, indent);
            }
            out.emit(")");
        }
        if let Some(lambda) = trailing {
            out.emit_space();
            self.emit_expr(out, lambda.value, PREC_LOWEST, indent);
        }
    }
}

/// Quote and escape a string literal.
pub fn quote_str(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for c in text.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '$' => quoted.push_str("\\$"),
            other => push_escaped(&mut quoted, other),
        }
    }
    quoted.push('"');
    quoted
}

fn quote_char(c: char) -> String {
    let mut quoted = String::from("'");
    if c == '\'' {
        quoted.push_str("\\'");
    } else {
        push_escaped(&mut quoted, c);
    }
    quoted.push('\'');
    quoted
}

fn push_escaped(out: &mut String, c: char) {
    match c {
        '\\' => out.push_str("\\\\"),
        '\n' => out.push_str("\\n"),
        '\t' => out.push_str("\\t"),
        '\r' => out.push_str("\\r"),
        other => out.push(other),
    }
}

#[cfg(test)]
mod tests;
