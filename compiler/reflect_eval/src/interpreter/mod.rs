//! Tree-walking interpreter over a compilation unit.
//!
//! The interpreter runs a unit after the plugin has inserted its
//! declarations, the way the host compiler would run the compiled program.
//! It only understands the Kotlin subset the front-end parses.
//!
//! # Resolution
//!
//! Declarations are looked up in both the user table and the synthesized
//! list; a [`FnRef`] names either. Calls to a decorated function resolve to
//! its wrapper everywhere except inside the wrapper itself (including the
//! lambdas the wrapper hands to its interceptors), which is how the host
//! compiler rewrites call sites.
//!
//! Top-level properties are evaluated on first use and cached.

mod call;
mod expr;
mod names;
mod optics;

use std::mem;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, instrument, trace};

use reflect_ir::{
    BuiltinType, CompilationUnit, DeclFlags, DeclId, DeclKind, Declaration, Name, Renderer, Span,
    StringInterner, TypeRef,
};

use crate::environment::Environment;
use crate::error::{EvalError, EvalErrorKind, EvalResult, Flow, FlowResult};
use crate::value::Value;

pub use call::Arg;
use names::BuiltinNames;

/// Calls nested deeper than this fail with a stack overflow error.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 1024;

/// A function or property, user-written or synthesized.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FnRef {
    Decl(DeclId),
    /// Index into `CompilationUnit::synthesized`.
    Synth(u32),
}

/// Per-activation state swapped in and out around calls.
struct Frame {
    env: Environment,
    this: Option<Value>,
    owner: Option<FnRef>,
}

pub struct Interpreter<'a> {
    pub(crate) unit: &'a CompilationUnit,
    pub(crate) interner: &'a StringInterner,
    pub(crate) names: BuiltinNames,

    /// Top-level functions without a receiver.
    functions: FxHashMap<Name, Vec<FnRef>>,
    /// Extension functions by name.
    extensions: FxHashMap<Name, Vec<FnRef>>,
    /// Top-level properties.
    properties: FxHashMap<Name, FnRef>,
    /// Decorated function name to its wrappers.
    redirects: FxHashMap<Name, Vec<FnRef>>,
    globals: FxHashMap<Name, Value>,

    pub(crate) env: Environment,
    pub(crate) this: Option<Value>,
    /// Function whose body is executing; lambdas run as their creator.
    pub(crate) owner: Option<FnRef>,
    depth: usize,
    max_depth: usize,

    /// `Cached` results keyed by call site and rendered arguments.
    pub(crate) memo: FxHashMap<(usize, String), Value>,
    trace: Vec<String>,
    output: Vec<String>,
}

impl<'a> Interpreter<'a> {
    pub fn new(unit: &'a CompilationUnit, interner: &'a StringInterner) -> Self {
        let mut interpreter = Interpreter {
            unit,
            interner,
            names: BuiltinNames::new(interner),
            functions: FxHashMap::default(),
            extensions: FxHashMap::default(),
            properties: FxHashMap::default(),
            redirects: FxHashMap::default(),
            globals: FxHashMap::default(),
            env: Environment::new(),
            this: None,
            owner: None,
            depth: 0,
            max_depth: DEFAULT_MAX_CALL_DEPTH,
            memo: FxHashMap::default(),
            trace: Vec::new(),
            output: Vec::new(),
        };
        interpreter.index();
        interpreter
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    fn index(&mut self) {
        let unit = self.unit;
        let user = unit.decls.iter().map(|decl| (FnRef::Decl(decl.id), decl));
        let synthesized = unit.synthesized.iter().enumerate().map(|(i, synth)| {
            let index = u32::try_from(i).unwrap_or(u32::MAX);
            (FnRef::Synth(index), &synth.decl)
        });
        for (f, decl) in user.chain(synthesized) {
            if decl.parent.is_some() {
                continue;
            }
            match (decl.kind, &decl.receiver) {
                (DeclKind::Function, None) => self.functions.entry(decl.name).or_default().push(f),
                (DeclKind::Function, Some(_)) => {
                    self.extensions.entry(decl.name).or_default().push(f);
                }
                (DeclKind::Property, None) => {
                    self.properties.entry(decl.name).or_insert(f);
                }
                _ => {}
            }
        }
        for (i, synth) in unit.synthesized.iter().enumerate() {
            if let Some(original) = synth.intercepts {
                let index = u32::try_from(i).unwrap_or(u32::MAX);
                self.redirects
                    .entry(original)
                    .or_default()
                    .push(FnRef::Synth(index));
            }
        }
        debug!(
            functions = self.functions.len(),
            extensions = self.extensions.len(),
            redirects = self.redirects.len(),
            "indexed unit"
        );
    }

    /// Call `box()` and render its result.
    #[instrument(level = "debug", skip(self), fields(unit = %self.unit.source_name))]
    pub fn run_box(&mut self) -> EvalResult<String> {
        let entry = self
            .functions
            .get(&Name::BOX)
            .and_then(|candidates| candidates.first().copied())
            .ok_or_else(|| EvalError::new(EvalErrorKind::NoEntryPoint, Span::DUMMY))?;
        let span = self.decl(entry).span;
        let result = self.call_function(entry, None, Vec::new(), span)?;
        Ok(result.display(self.interner))
    }

    /// Call a top-level function by name with positional arguments.
    pub fn call(&mut self, name: &str, args: Vec<Value>) -> EvalResult {
        let name = self.interner.intern(name);
        let args = args.into_iter().map(Arg::positional).collect();
        self.call_named(name, args, Span::DUMMY)
    }

    /// Value of a top-level property.
    pub fn global(&mut self, name: &str) -> EvalResult {
        let name = self.interner.intern(name);
        self.eval_ident(name, Span::DUMMY)
    }

    /// Interceptor events in the order they happened.
    pub fn trace(&self) -> &[String] {
        &self.trace
    }

    /// Lines written by `println`.
    pub fn output(&self) -> &[String] {
        &self.output
    }

    pub(crate) fn record(&mut self, event: String) {
        trace!(%event, "interceptor");
        self.trace.push(event);
    }

    pub(crate) fn decl(&self, f: FnRef) -> &'a Declaration {
        let unit = self.unit;
        match f {
            FnRef::Decl(id) => unit.decls.get(id),
            FnRef::Synth(index) => &unit.synthesized[index as usize].decl,
        }
    }

    pub(crate) fn name(&self, name: Name) -> &'a str {
        self.interner.lookup(name)
    }

    // Activations

    fn swap_frame(&mut self, frame: Frame) -> Frame {
        Frame {
            env: mem::replace(&mut self.env, frame.env),
            this: mem::replace(&mut self.this, frame.this),
            owner: mem::replace(&mut self.owner, frame.owner),
        }
    }

    /// Run `body` in a fresh activation, restoring the caller's afterwards.
    ///
    /// `return` ends the activation with its value; errors gain `label` in
    /// their backtrace.
    fn activate(
        &mut self,
        env: Environment,
        this: Option<Value>,
        owner: Option<FnRef>,
        label: Option<Name>,
        span: Span,
        body: impl FnOnce(&mut Self) -> FlowResult,
    ) -> EvalResult {
        if self.depth >= self.max_depth {
            return Err(EvalError::new(
                EvalErrorKind::StackOverflow {
                    limit: self.max_depth,
                },
                span,
            ));
        }
        self.depth += 1;
        let saved = self.swap_frame(Frame { env, this, owner });
        let result = body(self);
        self.swap_frame(saved);
        self.depth -= 1;
        match result {
            Ok(value) | Err(Flow::Return(value)) => Ok(value),
            Err(Flow::Error(mut error)) => {
                if let Some(label) = label {
                    error.backtrace.push(self.name(label).to_owned());
                }
                Err(error)
            }
        }
    }

    fn cached_global(&mut self, name: Name, f: FnRef, span: Span) -> EvalResult {
        if let Some(value) = self.globals.get(&name) {
            return Ok(value.clone());
        }
        let decl = self.decl(f);
        let value = match decl.body {
            Some(init) => {
                self.activate(Environment::new(), None, Some(f), Some(name), span, |interp| {
                    interp.eval(init)
                })?
            }
            None => Value::Unit,
        };
        self.globals.insert(name, value.clone());
        Ok(value)
    }

    // Declarations

    pub(crate) fn class_value(&self, id: DeclId) -> Value {
        let decl = self.unit.decls.get(id);
        if decl
            .flags
            .intersects(DeclFlags::OBJECT | DeclFlags::ENUM_ENTRY)
        {
            Value::Singleton {
                decl: id,
                name: decl.name,
            }
        } else {
            Value::Class(id)
        }
    }

    pub(crate) fn class_of(value: &Value) -> Option<DeclId> {
        match value {
            Value::Object(object) => Some(object.class),
            Value::Singleton { decl, .. } => Some(*decl),
            _ => None,
        }
    }

    /// `id` itself, then its supertypes breadth-first.
    fn lineage(&self, id: DeclId) -> Vec<DeclId> {
        let decls = &self.unit.decls;
        let mut order = vec![id];
        let mut seen = FxHashSet::default();
        seen.insert(id);
        let mut next = 0;
        while let Some(&current) = order.get(next) {
            next += 1;
            let decl = decls.get(current);
            let parents = decl
                .supertypes
                .iter()
                .filter_map(|ty| ty.head().and_then(|head| decls.find_class(head)))
                .chain(
                    decl.parent
                        .filter(|_| decl.flags.contains(DeclFlags::ENUM_ENTRY)),
                );
            for parent in parents {
                if seen.insert(parent) {
                    order.push(parent);
                }
            }
        }
        order
    }

    fn is_subclass(&self, id: DeclId, target: Name) -> bool {
        self.lineage(id)
            .into_iter()
            .any(|ancestor| self.unit.decls.get(ancestor).name == target)
    }

    /// Nearest declaration of `kind` named `name` in `class` or its supertypes.
    fn member_of(&self, class: DeclId, name: Name, kind: DeclKind) -> Option<DeclId> {
        let decls = &self.unit.decls;
        self.lineage(class).into_iter().find_map(|ancestor| {
            decls
                .children_of(ancestor)
                .find(|child| child.kind == kind && child.name == name)
                .map(|child| child.id)
        })
    }

    /// A wrapper of `name` applicable here, unless we are inside it.
    fn redirect(&self, name: Name, applies: impl Fn(&Declaration) -> bool) -> Option<FnRef> {
        let wrapper = self
            .redirects
            .get(&name)?
            .iter()
            .copied()
            .find(|&w| Some(w) != self.owner && applies(self.decl(w)))?;
        trace!(name = self.name(name), ?wrapper, "redirected to decorator");
        Some(wrapper)
    }

    /// Function `name` invoked on `receiver`: a member, or an extension
    /// whose receiver type accepts it.
    fn find_method(&self, receiver: &Value, name: Name) -> Option<FnRef> {
        if let Some(class) = Self::class_of(receiver) {
            let lineage = self.lineage(class);
            let wrapper = self.redirect(name, |decl| {
                decl.parent.is_some_and(|parent| lineage.contains(&parent))
            });
            if wrapper.is_some() {
                return wrapper;
            }
            if let Some(member) = self.member_of(class, name, DeclKind::Function) {
                return Some(FnRef::Decl(member));
            }
        }

        let accepts = |decl: &Declaration| {
            decl.receiver
                .as_ref()
                .is_some_and(|ty| self.type_test(receiver, ty))
        };
        if let Some(wrapper) = self.redirect(name, &accepts) {
            return Some(wrapper);
        }
        let candidates = self.extensions.get(&name)?;
        // The most specific receiver wins; an exact class match beats a supertype.
        let exact = Self::class_of(receiver).map(|class| self.unit.decls.get(class).name);
        let receiver_head = |f: FnRef| self.decl(f).receiver.as_ref().and_then(TypeRef::head);
        candidates
            .iter()
            .copied()
            .find(|&f| exact.is_some() && receiver_head(f) == exact)
            .or_else(|| candidates.iter().copied().find(|&f| accepts(self.decl(f))))
    }

    /// Runtime `is` check. Unknown type names are erased type parameters
    /// and accept everything.
    pub(crate) fn type_test(&self, value: &Value, ty: &TypeRef) -> bool {
        match ty {
            TypeRef::Nullable(inner) => value.is_null() || self.type_test(value, inner),
            TypeRef::Star | TypeRef::Infer => true,
            TypeRef::Function { .. } => matches!(value, Value::Closure(_)),
            TypeRef::Named { name, .. } => {
                if value.is_null() {
                    return false;
                }
                if let Some(builtin) = BuiltinType::from_name(*name) {
                    return builtin_test(value, builtin);
                }
                if matches!(*name, Name::LENS | Name::TRAVERSAL | Name::OPTIONAL) {
                    return match value {
                        Value::Record(record) => record.type_name == *name,
                        Value::Composed(optic) => optic.kind == *name,
                        _ => false,
                    };
                }
                if self.unit.decls.find_class(*name).is_none() {
                    return true;
                }
                match value {
                    Value::Object(object) => self.is_subclass(object.class, *name),
                    Value::Singleton { decl, .. } => self.is_subclass(*decl, *name),
                    _ => false,
                }
            }
        }
    }

    pub(crate) fn render_type(&self, ty: &TypeRef) -> String {
        Renderer::new(self.interner, &self.unit.arena).ty(ty)
    }

    pub(crate) fn type_mismatch(&self, expected: &str, found: &Value, span: Span) -> EvalError {
        EvalError::new(
            EvalErrorKind::TypeMismatch {
                expected: expected.to_owned(),
                found: found.type_name(self.interner),
            },
            span,
        )
    }
}

fn builtin_test(value: &Value, builtin: BuiltinType) -> bool {
    match builtin {
        BuiltinType::Any => true,
        BuiltinType::Nothing => false,
        b if b.is_integral() => matches!(value, Value::Int(_)),
        b if b.is_floating() => matches!(value, Value::Double(_)),
        BuiltinType::Boolean => matches!(value, Value::Bool(_)),
        BuiltinType::Char => matches!(value, Value::Char(_)),
        BuiltinType::String => matches!(value, Value::Str(_)),
        BuiltinType::Unit => matches!(value, Value::Unit),
        b if b.is_sequence() => matches!(value, Value::List(_)),
        BuiltinType::Set => matches!(value, Value::List(_)),
        BuiltinType::Map => matches!(value, Value::Map(_)),
        BuiltinType::Pair => matches!(value, Value::Pair(_)),
        _ => false,
    }
}

#[cfg(test)]
mod tests;
