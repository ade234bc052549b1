//! Runtime values.
//!
//! Values are cheap to clone: everything beyond a scalar sits behind an
//! `Arc`. Equality is Kotlin's `==`: structural for data classes, lists,
//! pairs and records built from data, identity for other objects.

use std::fmt::Write as _;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use reflect_ir::{DeclId, ExprId, Name, StringLookup};

use crate::interceptor::BuiltinInterceptor;
use crate::interpreter::FnRef;

/// An instance of a class declared in the unit.
#[derive(Clone, Debug)]
pub struct ObjectValue {
    pub class: DeclId,
    pub name: Name,
    /// `data class`: structural equality and `copy`.
    pub data: bool,
    /// Constructor parameters in declaration order.
    pub fields: Vec<(Name, Value)>,
}

impl ObjectValue {
    pub fn field(&self, name: Name) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value)
    }
}

/// Runtime-provided records such as `Lens(get = ..., set = ...)`.
#[derive(Clone, Debug)]
pub struct RecordValue {
    pub type_name: Name,
    pub fields: Vec<(Name, Value)>,
}

impl RecordValue {
    pub fn field(&self, name: Name) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value)
    }
}

/// `outer.compose(inner)`; `kind` is `Lens` or `Optional`.
#[derive(Clone, Debug)]
pub struct ComposedOptic {
    pub outer: Value,
    pub inner: Value,
    pub kind: Name,
}

/// A lambda together with what it closed over.
#[derive(Clone, Debug)]
pub struct Closure {
    pub params: Vec<Name>,
    pub body: ExprId,
    pub captured: Arc<FxHashMap<Name, Value>>,
    pub this: Option<Value>,
    /// Function the lambda was written in.
    pub owner: Option<FnRef>,
}

#[derive(Clone, Debug)]
pub enum Value {
    Int(i64),
    Double(f64),
    Bool(bool),
    Char(char),
    Str(Arc<str>),
    Null,
    Unit,
    List(Arc<Vec<Value>>),
    Map(Arc<Vec<(Value, Value)>>),
    Pair(Arc<(Value, Value)>),
    Object(Arc<ObjectValue>),
    /// An `object` declaration or an enum entry.
    Singleton { decl: DeclId, name: Name },
    /// A class named in expression position, as in `Dir.NORTH`.
    Class(DeclId),
    Record(Arc<RecordValue>),
    Composed(Arc<ComposedOptic>),
    Closure(Arc<Closure>),
    Interceptor(BuiltinInterceptor),
}

impl Value {
    pub fn string(text: impl Into<Arc<str>>) -> Value {
        Value::Str(text.into())
    }

    pub fn list(values: Vec<Value>) -> Value {
        Value::List(Arc::new(values))
    }

    pub fn pair(first: Value, second: Value) -> Value {
        Value::Pair(Arc::new((first, second)))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Name used in type errors.
    pub fn type_name(&self, interner: &dyn StringLookup) -> String {
        match self {
            Value::Int(_) => "Int".to_owned(),
            Value::Double(_) => "Double".to_owned(),
            Value::Bool(_) => "Boolean".to_owned(),
            Value::Char(_) => "Char".to_owned(),
            Value::Str(_) => "String".to_owned(),
            Value::Null => "Nothing?".to_owned(),
            Value::Unit => "Unit".to_owned(),
            Value::List(_) => "List".to_owned(),
            Value::Map(_) => "Map".to_owned(),
            Value::Pair(_) => "Pair".to_owned(),
            Value::Object(object) => interner.lookup(object.name).to_owned(),
            Value::Singleton { name, .. } => interner.lookup(*name).to_owned(),
            Value::Class(_) => "class reference".to_owned(),
            Value::Record(record) => interner.lookup(record.type_name).to_owned(),
            Value::Composed(optic) => interner.lookup(optic.kind).to_owned(),
            Value::Closure(_) => "function".to_owned(),
            Value::Interceptor(kind) => kind.as_str().to_owned(),
        }
    }

    /// Kotlin `toString()`.
    pub fn display(&self, interner: &dyn StringLookup) -> String {
        let mut out = String::new();
        self.write_display(&mut out, interner);
        out
    }

    fn write_display(&self, out: &mut String, interner: &dyn StringLookup) {
        match self {
            Value::Int(n) => {
                let _ = write!(out, "{n}");
            }
            Value::Double(d) => {
                let _ = write!(out, "{d:?}");
            }
            Value::Bool(b) => {
                let _ = write!(out, "{b}");
            }
            Value::Char(c) => out.push(*c),
            Value::Str(s) => out.push_str(s),
            Value::Null => out.push_str("null"),
            Value::Unit => out.push_str("kotlin.Unit"),
            Value::List(items) => {
                out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    item.write_display(out, interner);
                }
                out.push(']');
            }
            Value::Map(entries) => {
                out.push('{');
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    key.write_display(out, interner);
                    out.push('=');
                    value.write_display(out, interner);
                }
                out.push('}');
            }
            Value::Pair(pair) => {
                out.push('(');
                pair.0.write_display(out, interner);
                out.push_str(", ");
                pair.1.write_display(out, interner);
                out.push(')');
            }
            Value::Object(object) => {
                out.push_str(interner.lookup(object.name));
                if object.data {
                    write_fields(out, &object.fields, interner);
                } else {
                    out.push_str("@object");
                }
            }
            Value::Record(record) => {
                out.push_str(interner.lookup(record.type_name));
                out.push_str("(...)");
            }
            Value::Composed(optic) => {
                out.push_str(interner.lookup(optic.kind));
                out.push_str("(...)");
            }
            Value::Singleton { name, .. } => out.push_str(interner.lookup(*name)),
            Value::Class(_) => out.push_str("class"),
            Value::Closure(_) => out.push_str("(lambda)"),
            Value::Interceptor(kind) => out.push_str(kind.as_str()),
        }
    }
}

fn write_fields(out: &mut String, fields: &[(Name, Value)], interner: &dyn StringLookup) {
    out.push('(');
    for (i, (name, value)) in fields.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(interner.lookup(*name));
        out.push('=');
        value.write_display(out, interner);
    }
    out.push(')');
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            #[allow(clippy::float_cmp, reason = "Kotlin `==` on doubles is exact")]
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Null, Value::Null) | (Value::Unit, Value::Unit) => true,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Pair(a), Value::Pair(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => {
                if a.data && b.data {
                    a.class == b.class && a.fields == b.fields
                } else {
                    Arc::ptr_eq(a, b)
                }
            }
            (Value::Singleton { decl: a, .. }, Value::Singleton { decl: b, .. })
            | (Value::Class(a), Value::Class(b)) => a == b,
            (Value::Record(a), Value::Record(b)) => Arc::ptr_eq(a, b),
            (Value::Composed(a), Value::Composed(b)) => Arc::ptr_eq(a, b),
            (Value::Closure(a), Value::Closure(b)) => Arc::ptr_eq(a, b),
            (Value::Interceptor(a), Value::Interceptor(b)) => a == b,
            _ => false,
        }
    }
}
