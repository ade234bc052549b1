//! Optic paths the runtime composes itself.
//!
//! `outer.compose(inner)` works over lens and optional records and over
//! earlier compositions. Two lenses compose to a lens; anything involving
//! an optional composes to an optional. A null part way down a path makes
//! reads yield `null` and writes return the source unchanged.

use std::sync::Arc;

use reflect_ir::{Name, Span};

use super::Interpreter;
use crate::error::EvalResult;
use crate::value::{ComposedOptic, Value};

/// `Lens` or `Optional` when `value` is one.
pub(crate) fn optic_kind(value: &Value) -> Option<Name> {
    match value {
        Value::Record(record) if matches!(record.type_name, Name::LENS | Name::OPTIONAL) => {
            Some(record.type_name)
        }
        Value::Composed(optic) => Some(optic.kind),
        _ => None,
    }
}

impl Interpreter<'_> {
    /// `get`, `getOrNull`, `set`, `modify` and `compose` on any optic.
    pub(crate) fn optic_method(
        &mut self,
        optic: &Value,
        name: Name,
        args: Vec<Value>,
        span: Span,
    ) -> EvalResult {
        let found = args.len();
        let mut args = args.into_iter();
        match (name, args.next(), args.next()) {
            (Name::GET | Name::GET_OR_NULL, Some(source), None) => {
                Ok(self.focus(optic, source, span)?.unwrap_or(Value::Null))
            }
            (Name::SET_FN, Some(source), Some(value)) if found == 2 => {
                self.replace(optic, source, value, span)
            }
            (Name::MODIFY, Some(source), Some(f)) if found == 2 => {
                match self.focus(optic, source.clone(), span)? {
                    Some(focus) => {
                        let value = self.call_value(&f, vec![focus], span)?;
                        self.replace(optic, source, value, span)
                    }
                    None => Ok(source),
                }
            }
            (Name::COMPOSE, Some(inner), None) => self.compose(optic, inner, span),
            (Name::GET | Name::GET_OR_NULL | Name::COMPOSE, ..) => {
                Err(self.arity(self.name(name), 1, found, span))
            }
            (Name::SET_FN | Name::MODIFY, ..) => Err(self.arity(self.name(name), 2, found, span)),
            _ => Err(self.no_member(optic, name, span)),
        }
    }

    fn compose(&self, outer: &Value, inner: Value, span: Span) -> EvalResult {
        let Some(inner_kind) = optic_kind(&inner) else {
            return Err(self.type_mismatch("Lens", &inner, span));
        };
        let kind = match optic_kind(outer) {
            Some(Name::LENS) if inner_kind == Name::LENS => Name::LENS,
            _ => Name::OPTIONAL,
        };
        Ok(Value::Composed(Arc::new(ComposedOptic {
            outer: outer.clone(),
            inner,
            kind,
        })))
    }

    /// What `optic` focuses on in `source`; `None` when the path runs into
    /// `null` or an optional finds nothing.
    fn focus(&mut self, optic: &Value, source: Value, span: Span) -> EvalResult<Option<Value>> {
        if let Value::Composed(path) = optic {
            return match self.focus(&path.outer, source, span)? {
                Some(middle) if !middle.is_null() => self.focus(&path.inner, middle, span),
                _ => Ok(None),
            };
        }
        let optional = optic_kind(optic) == Some(Name::OPTIONAL);
        let read = if optional { Name::GET_OR_NULL } else { Name::GET };
        let getter = self.optic_field(optic, read, span)?;
        let focus = self.call_value(&getter, vec![source], span)?;
        Ok((!(optional && focus.is_null())).then_some(focus))
    }

    /// `source` with the focus of `optic` replaced by `value`.
    fn replace(&mut self, optic: &Value, source: Value, value: Value, span: Span) -> EvalResult {
        if let Value::Composed(path) = optic {
            return match self.focus(&path.outer, source.clone(), span)? {
                Some(middle) if !middle.is_null() => {
                    let middle = self.replace(&path.inner, middle, value, span)?;
                    self.replace(&path.outer, source, middle, span)
                }
                _ => Ok(source),
            };
        }
        let setter = self.optic_field(optic, Name::SET_FN, span)?;
        self.call_value(&setter, vec![source, value], span)
    }

    fn optic_field(&self, optic: &Value, field: Name, span: Span) -> EvalResult<Value> {
        let found = match optic {
            Value::Record(record) => record.field(field).cloned(),
            _ => None,
        };
        found.ok_or_else(|| self.no_member(optic, field, span))
    }
}
