//! Expression evaluation.

use std::cmp::Ordering;
use std::sync::Arc;

use reflect_ir::{BinaryOp, ExprId, ExprKind, Name, Span, UnaryOp, WhenArmRange, WhenCondition};
use reflect_stack::ensure_sufficient_stack;

use super::Interpreter;
use crate::error::{EvalError, EvalErrorKind, EvalResult, Flow, FlowResult};
use crate::interceptor::BuiltinInterceptor;
use crate::value::{Closure, Value};

impl Interpreter<'_> {
    pub(crate) fn eval(&mut self, id: ExprId) -> FlowResult {
        ensure_sufficient_stack(|| self.eval_inner(id))
    }

    fn eval_inner(&mut self, id: ExprId) -> FlowResult {
        let unit = self.unit;
        let expr = unit.arena.get(id);
        let span = expr.span;
        match &expr.kind {
            ExprKind::Int(n) => Ok(Value::Int(*n)),
            ExprKind::Double(bits) => Ok(Value::Double(f64::from_bits(*bits))),
            ExprKind::Bool(b) => Ok(Value::Bool(*b)),
            ExprKind::Char(c) => Ok(Value::Char(*c)),
            ExprKind::Str(text) => Ok(Value::string(self.name(*text))),
            ExprKind::Null => Ok(Value::Null),
            ExprKind::Ident(name) => Ok(self.eval_ident(*name, span)?),
            ExprKind::This => self
                .this
                .clone()
                .ok_or_else(|| EvalError::new(EvalErrorKind::NoReceiver, span).into()),
            ExprKind::Field {
                receiver,
                name,
                safe,
            } => {
                let receiver = self.eval(*receiver)?;
                Ok(self.get_field(receiver, *name, *safe, span)?)
            }
            ExprKind::Call { callee, args } => self.eval_call(*callee, *args, span),
            ExprKind::Index { receiver, index } => {
                let receiver = self.eval(*receiver)?;
                let index = self.eval(*index)?;
                Ok(self.index_value(&receiver, &index, span)?)
            }
            ExprKind::Binary { op, lhs, rhs } => self.eval_binary(*op, *lhs, *rhs, span),
            ExprKind::Unary { op, operand } => {
                let operand = self.eval(*operand)?;
                Ok(self.unary(*op, operand, span)?)
            }
            ExprKind::Pair { first, second } => {
                let first = self.eval(*first)?;
                let second = self.eval(*second)?;
                Ok(Value::pair(first, second))
            }
            ExprKind::Lambda { params, body } => {
                let params = unit
                    .arena
                    .lambda_params(*params)
                    .iter()
                    .map(|param| param.name)
                    .collect();
                Ok(Value::Closure(Arc::new(Closure {
                    params,
                    body: *body,
                    captured: self.env.capture(),
                    this: self.this.clone(),
                    owner: self.owner,
                })))
            }
            ExprKind::Cast { expr, ty } => {
                let value = self.eval(*expr)?;
                if self.type_test(&value, ty) {
                    Ok(value)
                } else {
                    Err(EvalError::new(
                        EvalErrorKind::CastFailed {
                            ty: self.render_type(ty),
                            found: value.type_name(self.interner),
                        },
                        span,
                    )
                    .into())
                }
            }
            ExprKind::Is { expr, ty, negated } => {
                let value = self.eval(*expr)?;
                Ok(Value::Bool(self.type_test(&value, ty) != *negated))
            }
            ExprKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                let cond = self.eval(*cond)?;
                if self.condition(&cond, span)? {
                    self.eval(*then_branch)
                } else if else_branch.is_valid() {
                    self.eval(*else_branch)
                } else {
                    Ok(Value::Unit)
                }
            }
            ExprKind::When { subject, arms } => self.eval_when(*subject, *arms, span),
            ExprKind::Block(stmts) => {
                self.env.push_scope();
                let mut result = Ok(Value::Unit);
                for &stmt in unit.arena.expr_list(*stmts) {
                    result = self.eval(stmt);
                    if result.is_err() {
                        break;
                    }
                }
                self.env.pop_scope();
                result
            }
            ExprKind::Let { name, init, .. } => {
                let value = self.eval(*init)?;
                self.env.define(*name, value);
                Ok(Value::Unit)
            }
            ExprKind::Return(value) => {
                let value = if value.is_valid() {
                    self.eval(*value)?
                } else {
                    Value::Unit
                };
                Err(Flow::Return(value))
            }
            ExprKind::Error => Err(EvalError::new(EvalErrorKind::Malformed, span).into()),
        }
    }

    /// A bare name: a local, a property of `this`, a top-level property,
    /// a class or object, or a builtin interceptor.
    pub(crate) fn eval_ident(&mut self, name: Name, span: Span) -> EvalResult {
        if let Some(value) = self.env.lookup(name) {
            return Ok(value);
        }
        if let Some(this) = self.this.clone() {
            if let Some(value) = self.member_value(&this, name, span)? {
                return Ok(value);
            }
        }
        if let Some(&property) = self.properties.get(&name) {
            return self.cached_global(name, property, span);
        }
        if let Some(class) = self.unit.decls.find_class(name) {
            return Ok(self.class_value(class));
        }
        if let Some(kind) = BuiltinInterceptor::from_name(self.name(name)) {
            return Ok(Value::Interceptor(kind));
        }
        if name == Name::UNIT {
            return Ok(Value::Unit);
        }
        Err(EvalError::new(
            EvalErrorKind::UndefinedVariable {
                name: self.name(name).to_owned(),
            },
            span,
        ))
    }

    /// `receiver.name` / `receiver?.name`
    fn get_field(&mut self, receiver: Value, name: Name, safe: bool, span: Span) -> EvalResult {
        let names = self.names;
        match &receiver {
            Value::Null if safe => return Ok(Value::Null),
            Value::Null => return Err(EvalError::new(EvalErrorKind::NullDereference, span)),
            Value::Class(class) => {
                let nested = self
                    .unit
                    .decls
                    .children_of(*class)
                    .find(|child| child.is_class_like() && child.name == name)
                    .map(|child| child.id);
                return match nested {
                    Some(id) => Ok(self.class_value(id)),
                    None => Err(self.no_member(&receiver, name, span)),
                };
            }
            Value::List(items) if name == Name::SIZE => return Ok(Value::Int(len(items.len()))),
            Value::Map(entries) if name == Name::SIZE => {
                return Ok(Value::Int(len(entries.len())));
            }
            Value::Str(text) if name == names.length => {
                return Ok(Value::Int(len(text.chars().count())));
            }
            Value::Pair(pair) if name == names.first => return Ok(pair.0.clone()),
            Value::Pair(pair) if name == names.second => return Ok(pair.1.clone()),
            _ => {}
        }
        match self.member_value(&receiver, name, span)? {
            Some(value) => Ok(value),
            None => Err(self.no_member(&receiver, name, span)),
        }
    }

    fn index_value(&self, receiver: &Value, index: &Value, span: Span) -> EvalResult {
        match receiver {
            Value::List(items) => self.index_list(items, index, span),
            Value::Map(entries) => Ok(entries
                .iter()
                .find(|(key, _)| key == index)
                .map_or(Value::Null, |(_, value)| value.clone())),
            Value::Str(text) => {
                let chars: Vec<Value> = text.chars().map(Value::Char).collect();
                self.index_list(&chars, index, span)
            }
            Value::Null => Err(EvalError::new(EvalErrorKind::NullDereference, span)),
            other => Err(self.type_mismatch("List", other, span)),
        }
    }

    fn condition(&self, value: &Value, span: Span) -> EvalResult<bool> {
        value
            .as_bool()
            .ok_or_else(|| self.type_mismatch("Boolean", value, span))
    }

    /// First matching arm wins; a `when` with no matching arm is a
    /// statement and yields `Unit`.
    fn eval_when(&mut self, subject: ExprId, arms: WhenArmRange, span: Span) -> FlowResult {
        let subject = if subject.is_valid() {
            Some(self.eval(subject)?)
        } else {
            None
        };
        let unit = self.unit;
        for arm in unit.arena.when_arms(arms) {
            let matched = match (&arm.condition, &subject) {
                (WhenCondition::Else, _) => true,
                (WhenCondition::Is(ty), Some(subject)) => self.type_test(subject, ty),
                (WhenCondition::Is(_), None) => false,
                (WhenCondition::Value(expected), Some(subject)) => self.eval(*expected)? == *subject,
                (WhenCondition::Value(cond), None) => {
                    let cond = self.eval(*cond)?;
                    self.condition(&cond, span)?
                }
            };
            if matched {
                return self.eval(arm.body);
            }
        }
        Ok(Value::Unit)
    }

    fn eval_binary(&mut self, op: BinaryOp, lhs: ExprId, rhs: ExprId, span: Span) -> FlowResult {
        match op {
            BinaryOp::And | BinaryOp::Or => {
                let left = self.eval(lhs)?;
                let left = self.condition(&left, span)?;
                if left == (op == BinaryOp::Or) {
                    return Ok(Value::Bool(left));
                }
                let right = self.eval(rhs)?;
                Ok(Value::Bool(self.condition(&right, span)?))
            }
            _ => {
                let left = self.eval(lhs)?;
                let right = self.eval(rhs)?;
                Ok(self.binary(op, left, right, span)?)
            }
        }
    }

    pub(crate) fn binary(&self, op: BinaryOp, left: Value, right: Value, span: Span) -> EvalResult {
        match op {
            BinaryOp::Eq => Ok(Value::Bool(left == right)),
            BinaryOp::NotEq => Ok(Value::Bool(left != right)),
            BinaryOp::Add => match (&left, &right) {
                (Value::Str(text), other) => Ok(Value::string(format!(
                    "{text}{}",
                    other.display(self.interner)
                ))),
                (Value::List(items), Value::List(more)) => {
                    let mut joined = (**items).clone();
                    joined.extend(more.iter().cloned());
                    Ok(Value::list(joined))
                }
                (Value::List(items), single) => {
                    let mut joined = (**items).clone();
                    joined.push(single.clone());
                    Ok(Value::list(joined))
                }
                _ => self.arithmetic(op, &left, &right, span),
            },
            BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => {
                self.arithmetic(op, &left, &right, span)
            }
            BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => {
                let ordering = self.compare(&left, &right, span)?;
                Ok(Value::Bool(match op {
                    BinaryOp::Lt => ordering == Ordering::Less,
                    BinaryOp::LtEq => ordering != Ordering::Greater,
                    BinaryOp::Gt => ordering == Ordering::Greater,
                    _ => ordering != Ordering::Less,
                }))
            }
            BinaryOp::And | BinaryOp::Or => {
                let left = self.condition(&left, span)?;
                let right = self.condition(&right, span)?;
                Ok(Value::Bool(if op == BinaryOp::And {
                    left && right
                } else {
                    left || right
                }))
            }
        }
    }

    /// Int arithmetic wraps like the JVM; mixing in a Double promotes.
    fn arithmetic(&self, op: BinaryOp, left: &Value, right: &Value, span: Span) -> EvalResult {
        match (left, right) {
            (Value::Int(a), Value::Int(b)) => {
                let (a, b) = (*a, *b);
                let value = match op {
                    BinaryOp::Add => a.wrapping_add(b),
                    BinaryOp::Sub => a.wrapping_sub(b),
                    BinaryOp::Mul => a.wrapping_mul(b),
                    BinaryOp::Div | BinaryOp::Rem if b == 0 => {
                        return Err(EvalError::new(EvalErrorKind::DivisionByZero, span));
                    }
                    BinaryOp::Div => a.wrapping_div(b),
                    _ => a.wrapping_rem(b),
                };
                Ok(Value::Int(value))
            }
            _ => {
                let (Some(a), Some(b)) = (as_double(left), as_double(right)) else {
                    let culprit = if as_double(left).is_some() { right } else { left };
                    return Err(self.type_mismatch("a number", culprit, span));
                };
                let value = match op {
                    BinaryOp::Add => a + b,
                    BinaryOp::Sub => a - b,
                    BinaryOp::Mul => a * b,
                    BinaryOp::Div => a / b,
                    _ => a % b,
                };
                Ok(Value::Double(value))
            }
        }
    }

    fn compare(&self, left: &Value, right: &Value, span: Span) -> EvalResult<Ordering> {
        let ordering = match (left, right) {
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
            (Value::Char(a), Value::Char(b)) => Some(a.cmp(b)),
            _ => match (as_double(left), as_double(right)) {
                (Some(a), Some(b)) => a.partial_cmp(&b),
                _ => None,
            },
        };
        ordering.ok_or_else(|| {
            EvalError::new(
                EvalErrorKind::TypeMismatch {
                    expected: left.type_name(self.interner),
                    found: right.type_name(self.interner),
                },
                span,
            )
        })
    }

    fn unary(&self, op: UnaryOp, operand: Value, span: Span) -> EvalResult {
        match (op, &operand) {
            (UnaryOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
            (UnaryOp::Neg, Value::Int(n)) => Ok(Value::Int(n.wrapping_neg())),
            (UnaryOp::Neg, Value::Double(d)) => Ok(Value::Double(-d)),
            (UnaryOp::Not, other) => Err(self.type_mismatch("Boolean", other, span)),
            (UnaryOp::Neg, other) => Err(self.type_mismatch("a number", other, span)),
        }
    }
}

#[allow(clippy::cast_precision_loss, reason = "Kotlin widens Int to Double the same way")]
fn as_double(value: &Value) -> Option<f64> {
    match value {
        Value::Int(n) => Some(*n as f64),
        Value::Double(d) => Some(*d),
        _ => None,
    }
}

fn len(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}
