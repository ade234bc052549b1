//! Calls: argument binding, function and lambda activations, constructors,
//! method dispatch and the runtime's builtin functions.

use std::sync::Arc;

use reflect_ir::{
    CallArg, CallArgRange, DeclFlags, DeclId, DeclKind, ExprId, ExprKind, Name, Span,
};

use super::optics::optic_kind;
use super::{FnRef, Interpreter};
use crate::environment::Environment;
use crate::error::{EvalError, EvalErrorKind, EvalResult, FlowResult};
use crate::value::{ObjectValue, RecordValue, Value};

/// An evaluated call argument.
#[derive(Clone, Debug)]
pub struct Arg {
    pub name: Option<Name>,
    pub value: Value,
}

impl Arg {
    pub fn positional(value: Value) -> Self {
        Arg { name: None, value }
    }
}

fn values(args: Vec<Arg>) -> Vec<Value> {
    args.into_iter().map(|arg| arg.value).collect()
}

impl Interpreter<'_> {
    pub(crate) fn eval_args(&mut self, args: &[CallArg]) -> FlowResult<Vec<Arg>> {
        args.iter()
            .map(|arg| {
                Ok(Arg {
                    name: arg.name,
                    value: self.eval(arg.value)?,
                })
            })
            .collect()
    }

    /// `callee(args)` where `callee` is any expression.
    pub(crate) fn eval_call(
        &mut self,
        callee: ExprId,
        args: CallArgRange,
        span: Span,
    ) -> FlowResult {
        let unit = self.unit;
        let call_args = unit.arena.call_args(args);
        match &unit.arena.get(callee).kind {
            ExprKind::Ident(name) => {
                let args = self.eval_args(call_args)?;
                Ok(self.call_named(*name, args, span)?)
            }
            ExprKind::Field {
                receiver,
                name,
                safe,
            } => {
                let receiver = self.eval(*receiver)?;
                if receiver.is_null() && *safe {
                    return Ok(Value::Null);
                }
                let args = self.eval_args(call_args)?;
                Ok(self.call_method(receiver, *name, args, span)?)
            }
            _ => {
                let function = self.eval(callee)?;
                let args = self.eval_args(call_args)?;
                Ok(self.call_value(&function, values(args), span)?)
            }
        }
    }

    /// A call by bare name: a local callable, a decorator wrapper, a member
    /// of `this`, a top-level function, a constructor, then a builtin.
    pub(crate) fn call_named(&mut self, name: Name, args: Vec<Arg>, span: Span) -> EvalResult {
        if let Some(local) = self.env.lookup(name) {
            return self.call_value(&local, values(args), span);
        }
        if let Some(wrapper) = self.redirect(name, |decl| {
            decl.parent.is_none() && decl.receiver.is_none()
        }) {
            return self.call_function(wrapper, None, args, span);
        }
        if let Some(this) = self.this.clone() {
            if let Some(method) = self.find_method(&this, name) {
                return self.call_function(method, Some(this), args, span);
            }
            if let Some(Value::Closure(closure)) = self.member_value(&this, name, span)? {
                return self.call_value(&Value::Closure(closure), values(args), span);
            }
        }
        if let Some(&f) = self.functions.get(&name).and_then(|candidates| candidates.first()) {
            return self.call_function(f, None, args, span);
        }
        if let Some(class) = self.unit.decls.find_class(name) {
            return self.construct(class, args, span);
        }
        self.call_builtin(name, args, span)
    }

    /// `receiver.name(args)`
    pub(crate) fn call_method(
        &mut self,
        receiver: Value,
        name: Name,
        args: Vec<Arg>,
        span: Span,
    ) -> EvalResult {
        if let Value::Interceptor(kind) = receiver {
            if name == Name::INTERCEPT {
                let found = args.len();
                let mut args = values(args).into_iter();
                return match (args.next(), args.next()) {
                    (Some(list), Some(proceed)) if found == 2 => {
                        self.run_interceptor(kind, list, proceed, span)
                    }
                    _ => Err(self.arity("intercept", 2, found, span)),
                };
            }
        }
        if receiver.is_null() {
            return Err(EvalError::new(EvalErrorKind::NullDereference, span));
        }
        if let Value::Composed(_) = receiver {
            return self.optic_method(&receiver, name, values(args), span);
        }
        if let Some(method) = self.find_method(&receiver, name) {
            return self.call_function(method, Some(receiver), args, span);
        }
        if let Some(callable @ Value::Closure(_)) = self.member_value(&receiver, name, span)? {
            return self.call_value(&callable, values(args), span);
        }
        self.builtin_method(receiver, name, args, span)
    }

    pub(crate) fn call_function(
        &mut self,
        f: FnRef,
        this: Option<Value>,
        args: Vec<Arg>,
        span: Span,
    ) -> EvalResult {
        let decl = self.decl(f);
        let params: Vec<_> = decl.params.iter().map(|p| (p.name, p.default)).collect();
        self.activate(
            Environment::new(),
            this,
            Some(f),
            Some(decl.name),
            span,
            |interp| {
                interp.bind_args(decl.name, &params, args, span)?;
                match decl.body {
                    Some(body) => interp.eval(body),
                    None => Ok(Value::Unit),
                }
            },
        )
    }

    /// Invoke a function value with positional arguments.
    pub(crate) fn call_value(&mut self, callee: &Value, args: Vec<Value>, span: Span) -> EvalResult {
        let Value::Closure(closure) = callee else {
            return Err(EvalError::new(
                EvalErrorKind::NotCallable {
                    type_name: callee.type_name(self.interner),
                },
                span,
            ));
        };
        let mut env = Environment::from_captured(&closure.captured);
        if closure.params.is_empty() && args.len() <= 1 {
            if let Some(it) = args.into_iter().next() {
                env.define(Name::IT, it);
            }
        } else if closure.params.len() == args.len() {
            for (&param, arg) in closure.params.iter().zip(args) {
                env.define(param, arg);
            }
        } else {
            return Err(EvalError::new(
                EvalErrorKind::ArityMismatch {
                    callee: "lambda".to_owned(),
                    expected: closure.params.len(),
                    found: args.len(),
                },
                span,
            ));
        }
        let body = closure.body;
        self.activate(env, closure.this.clone(), closure.owner, None, span, |interp| {
            interp.eval(body)
        })
    }

    /// Match arguments to parameters and define them in the current scope.
    ///
    /// Positional arguments fill parameters in order, named ones by name,
    /// and missing ones fall back to their default, which may refer to
    /// earlier parameters.
    fn bind_args(
        &mut self,
        callee: Name,
        params: &[(Name, Option<ExprId>)],
        args: Vec<Arg>,
        span: Span,
    ) -> FlowResult<Vec<Value>> {
        let mut slots: Vec<Option<Value>> = vec![None; params.len()];
        let supplied = args.len();
        let mut next = 0;
        for arg in args {
            let index = match arg.name {
                Some(name) => params
                    .iter()
                    .position(|(param, _)| *param == name)
                    .ok_or_else(|| {
                        EvalError::new(
                            EvalErrorKind::UnknownArgument {
                                callee: self.name(callee).to_owned(),
                                param: self.name(name).to_owned(),
                            },
                            span,
                        )
                    })?,
                None => {
                    next += 1;
                    next - 1
                }
            };
            let Some(slot) = slots.get_mut(index) else {
                return Err(EvalError::new(
                    EvalErrorKind::ArityMismatch {
                        callee: self.name(callee).to_owned(),
                        expected: params.len(),
                        found: supplied,
                    },
                    span,
                )
                .into());
            };
            *slot = Some(arg.value);
        }

        let mut bound = Vec::with_capacity(params.len());
        for (&(name, default), slot) in params.iter().zip(slots) {
            let value = match (slot, default) {
                (Some(value), _) => value,
                (None, Some(default)) => self.eval(default)?,
                (None, None) => {
                    return Err(EvalError::new(
                        EvalErrorKind::MissingArgument {
                            callee: self.name(callee).to_owned(),
                            param: self.name(name).to_owned(),
                        },
                        span,
                    )
                    .into());
                }
            };
            self.env.define(name, value.clone());
            bound.push(value);
        }
        Ok(bound)
    }

    /// `Class(args)`
    pub(crate) fn construct(&mut self, class: DeclId, args: Vec<Arg>, span: Span) -> EvalResult {
        let decl = self.unit.decls.get(class);
        if decl
            .flags
            .intersects(DeclFlags::OBJECT | DeclFlags::ENUM_ENTRY)
        {
            return Ok(self.class_value(class));
        }
        if decl
            .flags
            .intersects(DeclFlags::ABSTRACT | DeclFlags::INTERFACE | DeclFlags::SEALED)
        {
            return Err(EvalError::new(
                EvalErrorKind::NotCallable {
                    type_name: self.name(decl.name).to_owned(),
                },
                span,
            ));
        }
        let params: Vec<_> = decl.members.iter().map(|m| (m.name, m.default)).collect();
        let mut fields = Vec::new();
        self.activate(Environment::new(), None, None, Some(decl.name), span, |interp| {
            let bound = interp.bind_args(decl.name, &params, args, span)?;
            fields = params.iter().map(|&(name, _)| name).zip(bound).collect();
            Ok(Value::Unit)
        })?;
        Ok(Value::Object(Arc::new(ObjectValue {
            class,
            name: decl.name,
            data: decl.flags.contains(DeclFlags::DATA),
            fields,
        })))
    }

    /// A stored field or body property of `receiver`, if it has one.
    pub(crate) fn member_value(
        &mut self,
        receiver: &Value,
        name: Name,
        span: Span,
    ) -> EvalResult<Option<Value>> {
        match receiver {
            Value::Object(object) => {
                if let Some(value) = object.field(name) {
                    return Ok(Some(value.clone()));
                }
            }
            Value::Record(record) => return Ok(record.field(name).cloned()),
            Value::Singleton { decl, .. } => {
                if let Some(value) = self.enum_entry_field(*decl, name, span)? {
                    return Ok(Some(value));
                }
            }
            _ => return Ok(None),
        }
        let Some(class) = Self::class_of(receiver) else {
            return Ok(None);
        };
        let Some(property) = self.member_of(class, name, DeclKind::Property) else {
            return Ok(None);
        };
        let decl = self.unit.decls.get(property);
        let Some(init) = decl.body else {
            return Ok(Some(Value::Unit));
        };
        let this = Some(receiver.clone());
        let value = self.activate(
            Environment::new(),
            this,
            Some(FnRef::Decl(property)),
            Some(name),
            span,
            |interp| interp.eval(init),
        )?;
        Ok(Some(value))
    }

    /// `RED("f00")` stores its constructor call as the entry's body.
    fn enum_entry_field(
        &mut self,
        entry: DeclId,
        name: Name,
        span: Span,
    ) -> EvalResult<Option<Value>> {
        let decl = self.unit.decls.get(entry);
        let Some(init) = decl
            .body
            .filter(|_| decl.flags.contains(DeclFlags::ENUM_ENTRY))
        else {
            return Ok(None);
        };
        let label = Some(decl.name);
        let instance = self.activate(Environment::new(), None, None, label, span, |interp| {
            interp.eval(init)
        })?;
        Ok(match instance {
            Value::Object(object) => object.field(name).cloned(),
            _ => None,
        })
    }

    fn call_builtin(&mut self, name: Name, args: Vec<Arg>, span: Span) -> EvalResult {
        let names = self.names;
        match name {
            Name::LIST_OF => Ok(Value::list(values(args))),
            Name::EMPTY_LIST | Name::EMPTY_SET => Ok(Value::list(Vec::new())),
            Name::EMPTY_MAP => Ok(Value::Map(Arc::new(Vec::new()))),
            Name::PAIR => match <[Value; 2]>::try_from(values(args)) {
                Ok([first, second]) => Ok(Value::pair(first, second)),
                Err(args) => Err(self.arity("Pair", 2, args.len(), span)),
            },
            Name::LENS => Ok(self.make_record(Name::LENS, [Name::GET, Name::SET_FN], args)),
            Name::TRAVERSAL => Ok(self.make_record(
                Name::TRAVERSAL,
                [Name::GET_ALL, Name::MODIFY],
                args,
            )),
            Name::OPTIONAL => Ok(self.make_record(
                Name::OPTIONAL,
                [Name::GET_OR_NULL, Name::SET_FN],
                args,
            )),
            n if n == names.set_of => {
                let mut set: Vec<Value> = Vec::new();
                for value in values(args) {
                    if !set.contains(&value) {
                        set.push(value);
                    }
                }
                Ok(Value::list(set))
            }
            n if n == names.map_of => {
                let mut entries = Vec::new();
                for value in values(args) {
                    let Value::Pair(pair) = value else {
                        return Err(self.type_mismatch("Pair", &value, span));
                    };
                    let (key, value) = (*pair).clone();
                    entries.retain(|(existing, _)| *existing != key);
                    entries.push((key, value));
                }
                Ok(Value::Map(Arc::new(entries)))
            }
            n if n == names.println => {
                let line = values(args)
                    .iter()
                    .map(|value| value.display(self.interner))
                    .collect::<Vec<_>>()
                    .join(" ");
                self.output.push(line);
                Ok(Value::Unit)
            }
            _ => Err(EvalError::new(
                EvalErrorKind::UndefinedFunction {
                    name: self.name(name).to_owned(),
                },
                span,
            )),
        }
    }

    /// A runtime record; positional arguments take `fields` in order.
    fn make_record(&self, type_name: Name, fields: [Name; 2], args: Vec<Arg>) -> Value {
        let mut positional = fields.into_iter();
        let fields = args
            .into_iter()
            .filter_map(|arg| Some((arg.name.or_else(|| positional.next())?, arg.value)))
            .collect();
        Value::Record(Arc::new(RecordValue { type_name, fields }))
    }

    pub(crate) fn arity(&self, callee: &str, expected: usize, found: usize, span: Span) -> EvalError {
        EvalError::new(
            EvalErrorKind::ArityMismatch {
                callee: callee.to_owned(),
                expected,
                found,
            },
            span,
        )
    }

    /// Methods the runtime provides on builtin values.
    fn builtin_method(
        &mut self,
        receiver: Value,
        name: Name,
        args: Vec<Arg>,
        span: Span,
    ) -> EvalResult {
        let names = self.names;
        if let Value::Object(object) = &receiver {
            if object.data && name == Name::COPY {
                return self.copy(object, args, span);
            }
        }
        let args = values(args);
        if name == names.to_string && args.is_empty() {
            return Ok(Value::string(receiver.display(self.interner)));
        }
        if name == names.equals && args.len() == 1 {
            return Ok(Value::Bool(receiver == args[0]));
        }
        match &receiver {
            Value::Record(_) if optic_kind(&receiver).is_some() => {
                self.optic_method(&receiver, name, args, span)
            }
            Value::List(items) => self.list_method(items, name, args, span),
            Value::Str(text) => match (name, args.as_slice()) {
                (n, []) if n == names.uppercase => Ok(Value::string(text.to_uppercase())),
                (n, []) if n == names.lowercase => Ok(Value::string(text.to_lowercase())),
                (n, []) if n == names.is_empty => Ok(Value::Bool(text.is_empty())),
                (n, [other]) if n == names.plus => Ok(Value::string(format!(
                    "{text}{}",
                    other.display(self.interner)
                ))),
                _ => Err(self.no_member(&receiver, name, span)),
            },
            Value::Pair(pair) if args.is_empty() => match name {
                n if n == names.first => Ok(pair.0.clone()),
                n if n == names.second => Ok(pair.1.clone()),
                _ => Err(self.no_member(&receiver, name, span)),
            },
            Value::Map(entries) => match (name, args.as_slice()) {
                (Name::GET, [key]) => Ok(entries
                    .iter()
                    .find(|(k, _)| k == key)
                    .map_or(Value::Null, |(_, v)| v.clone())),
                (n, []) if n == names.is_empty => Ok(Value::Bool(entries.is_empty())),
                _ => Err(self.no_member(&receiver, name, span)),
            },
            _ => Err(self.no_member(&receiver, name, span)),
        }
    }

    /// `data.copy(field = value)`; positional arguments replace fields in
    /// declaration order.
    fn copy(&self, object: &ObjectValue, args: Vec<Arg>, span: Span) -> EvalResult {
        let mut fields = object.fields.clone();
        for (position, arg) in args.into_iter().enumerate() {
            let slot = match arg.name {
                Some(name) => fields.iter_mut().find(|(field, _)| *field == name),
                None => fields.get_mut(position),
            };
            let Some(slot) = slot else {
                let param = arg
                    .name
                    .map_or_else(|| format!("#{position}"), |name| self.name(name).to_owned());
                return Err(EvalError::new(
                    EvalErrorKind::UnknownArgument {
                        callee: "copy".to_owned(),
                        param,
                    },
                    span,
                ));
            };
            slot.1 = arg.value;
        }
        Ok(Value::Object(Arc::new(ObjectValue {
            fields,
            ..object.clone()
        })))
    }

    fn list_method(
        &mut self,
        items: &Arc<Vec<Value>>,
        name: Name,
        args: Vec<Value>,
        span: Span,
    ) -> EvalResult {
        let names = self.names;
        match (name, args.as_slice()) {
            (Name::MAP_FN, [f]) => {
                let mut mapped = Vec::with_capacity(items.len());
                for item in items.iter() {
                    mapped.push(self.call_value(f, vec![item.clone()], span)?);
                }
                Ok(Value::list(mapped))
            }
            (n, [f]) if n == names.map_not_null => {
                let mut mapped = Vec::with_capacity(items.len());
                for item in items.iter() {
                    let value = self.call_value(f, vec![item.clone()], span)?;
                    if !value.is_null() {
                        mapped.push(value);
                    }
                }
                Ok(Value::list(mapped))
            }
            (n, [f]) if n == names.filter => {
                let mut kept = Vec::new();
                for item in items.iter() {
                    let keep = self.call_value(f, vec![item.clone()], span)?;
                    match keep {
                        Value::Bool(true) => kept.push(item.clone()),
                        Value::Bool(false) => {}
                        other => return Err(self.type_mismatch("Boolean", &other, span)),
                    }
                }
                Ok(Value::list(kept))
            }
            (n, [f]) if n == names.for_each => {
                for item in items.iter() {
                    self.call_value(f, vec![item.clone()], span)?;
                }
                Ok(Value::Unit)
            }
            (Name::GET, [index]) => self.index_list(items, index, span),
            (n, []) if n == names.first || n == names.last => {
                let item = if n == names.first {
                    items.first()
                } else {
                    items.last()
                };
                item.cloned().ok_or_else(|| {
                    EvalError::new(EvalErrorKind::IndexOutOfBounds { index: 0, len: 0 }, span)
                })
            }
            (n, []) if n == names.is_empty => Ok(Value::Bool(items.is_empty())),
            (n, [needle]) if n == names.contains => Ok(Value::Bool(items.contains(needle))),
            (n, [other]) if n == names.plus => {
                let mut joined = (**items).clone();
                match other {
                    Value::List(more) => joined.extend(more.iter().cloned()),
                    single => joined.push(single.clone()),
                }
                Ok(Value::list(joined))
            }
            (n, []) if n == names.sum => {
                let mut total = 0i64;
                for item in items.iter() {
                    match item {
                        Value::Int(value) => total = total.wrapping_add(*value),
                        other => return Err(self.type_mismatch("Int", other, span)),
                    }
                }
                Ok(Value::Int(total))
            }
            (n, separator) if n == names.join_to_string && separator.len() <= 1 => {
                let separator = match separator.first() {
                    Some(Value::Str(s)) => s.to_string(),
                    Some(other) => return Err(self.type_mismatch("String", other, span)),
                    None => ", ".to_owned(),
                };
                Ok(Value::string(
                    items
                        .iter()
                        .map(|item| item.display(self.interner))
                        .collect::<Vec<_>>()
                        .join(&separator),
                ))
            }
            _ => Err(self.no_member(&Value::List(Arc::clone(items)), name, span)),
        }
    }

    pub(crate) fn index_list(&self, items: &[Value], index: &Value, span: Span) -> EvalResult {
        let Value::Int(index) = *index else {
            return Err(self.type_mismatch("Int", index, span));
        };
        usize::try_from(index)
            .ok()
            .and_then(|i| items.get(i))
            .cloned()
            .ok_or_else(|| {
                EvalError::new(
                    EvalErrorKind::IndexOutOfBounds {
                        index,
                        len: items.len(),
                    },
                    span,
                )
            })
    }

    pub(crate) fn no_member(&self, receiver: &Value, member: Name, span: Span) -> EvalError {
        EvalError::new(
            EvalErrorKind::NoSuchMember {
                type_name: receiver.type_name(self.interner),
                member: self.name(member).to_owned(),
            },
            span,
        )
    }
}
