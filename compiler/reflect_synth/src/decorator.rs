//! Decorator wrappers.
//!
//! A decorated function `f` gets a wrapper with the same signature whose
//! body threads the arguments through each decorator's `intercept`:
//!
//! ```text
//! fun fDecorated(p: P) = A.intercept(listOf(p)) { args: List<Any?> ->
//!     B.intercept(args) { args: List<Any?> -> f(args[0] as P) }
//! }
//! ```
//!
//! Call sites of `f` outside the wrapper resolve to the wrapper.

use smallvec::SmallVec;

use reflect_ir::{
    Annotation, AnnotationValue, CallArg, DeclId, DeclTable, Declaration, ExprId, LambdaParam,
    Name, Span, SynthOrigin, SynthesizedDecl, TypeRef,
};

use crate::context::SynthContext;
use crate::error::SynthError;
use crate::naming::scope_of;

/// Which decorator of a chain runs outermost.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum DecoratorOrder {
    /// `@A @B fun f` runs as `A(B(f))`.
    #[default]
    FirstOutermost,
    /// `@A @B fun f` runs as `B(A(f))`.
    LastOutermost,
}

/// The decorators applied to one declaration, in declaration order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecoratorSpec {
    pub decorators: SmallVec<[Annotation; 2]>,
}

impl DecoratorSpec {
    /// Decorators on `decl`, or `None` if it has none.
    ///
    /// An annotation is a decorator when it names an interceptor: one the
    /// runtime provides or an object or class in the unit declaring
    /// `intercept`. Other annotations (`@Suppress`, `@Deprecated`) are left
    /// alone. On non-functions decorators are still collected so that they
    /// are reported rather than ignored.
    pub fn from_decl(decls: &DeclTable, decl: &Declaration) -> Option<DecoratorSpec> {
        let decorators: SmallVec<[Annotation; 2]> = decl
            .annotations
            .iter()
            .filter(|annotation| {
                BUILTIN_INTERCEPTORS.contains(&annotation.name)
                    || is_interceptor(decls, annotation.name)
            })
            .cloned()
            .collect();
        (!decorators.is_empty()).then_some(DecoratorSpec { decorators })
    }

    fn renames(&self) -> impl Iterator<Item = (&Annotation, Name)> {
        self.decorators
            .iter()
            .filter_map(|annotation| match annotation.arg(Name::RENAME) {
                Some(AnnotationValue::Str(name)) => Some((annotation, *name)),
                _ => None,
            })
    }

    fn exclusive(&self) -> Option<&Annotation> {
        self.decorators.iter().find(|annotation| {
            matches!(
                annotation.arg(Name::EXCLUSIVE),
                Some(AnnotationValue::Bool(true))
            )
        })
    }
}

const BUILTIN_INTERCEPTORS: [Name; 3] = [Name::DECORATOR, Name::LOGGED, Name::CACHED];

/// An object or class declaring `intercept`.
fn is_interceptor(decls: &DeclTable, name: Name) -> bool {
    decls.find_class(name).is_some_and(|class| {
        decls
            .children_of(class)
            .any(|child| child.is_function() && child.name == Name::INTERCEPT)
    })
}

impl SynthContext<'_> {
    #[tracing::instrument(level = "debug", skip(self, spec))]
    pub fn rewrite_decorated(
        &mut self,
        id: DeclId,
        spec: &DecoratorSpec,
    ) -> Result<SynthesizedDecl, SynthError> {
        let decls = self.decls;
        let decl = decls.get(id);
        let function = self.interner.lookup(decl.name);
        if !decl.is_function() {
            return Err(SynthError::UnsupportedShape {
                decl: function.to_owned(),
                requested: "a decorator wrapper",
                reason: "decorators apply to functions only".to_owned(),
                span: decl.span,
            });
        }
        self.check_conflicts(function, spec)?;

        let base = match spec.renames().next() {
            Some((_, rename)) => self.interner.lookup(rename).to_owned(),
            None => format!("{function}Decorated"),
        };
        let name = self.reserve(scope_of(decls, decl), &base, decl.span)?;

        let chain: SmallVec<[Name; 2]> = match self.config.decorator_order {
            DecoratorOrder::FirstOutermost => spec.decorators.iter().map(|a| a.name).collect(),
            DecoratorOrder::LastOutermost => {
                spec.decorators.iter().rev().map(|a| a.name).collect()
            }
        };
        let body = self.intercept_chain(decl, &chain, decl.span);

        let mut wrapper = Declaration::function(
            name,
            decl.receiver.clone(),
            decl.params.clone(),
            TypeRef::Infer,
            body,
            decl.span,
        );
        wrapper.type_params = decl.type_params.clone();
        wrapper.parent = decl.parent;
        Ok(SynthesizedDecl::new(wrapper, SynthOrigin::Decorator, id).intercepting(decl.name))
    }

    fn check_conflicts(&self, function: &str, spec: &DecoratorSpec) -> Result<(), SynthError> {
        let conflict = |message: String, at: &Annotation, other: &Annotation| {
            SynthError::DecoratorConflict {
                function: function.to_owned(),
                message,
                span: at.span,
                other: Some(other.span),
            }
        };

        let mut renames = spec.renames();
        if let (Some((first, _)), Some((second, _))) = (renames.next(), renames.next()) {
            return Err(conflict(
                format!(
                    "both `@{}` and `@{}` rename the wrapper",
                    self.interner.lookup(first.name),
                    self.interner.lookup(second.name)
                ),
                second,
                first,
            ));
        }

        if let Some(exclusive) = spec.exclusive() {
            if let Some(other) = spec
                .decorators
                .iter()
                .find(|annotation| !std::ptr::eq(*annotation, exclusive))
            {
                return Err(conflict(
                    format!(
                        "`@{}` is exclusive but is combined with `@{}`",
                        self.interner.lookup(exclusive.name),
                        self.interner.lookup(other.name)
                    ),
                    exclusive,
                    other,
                ));
            }
        }
        Ok(())
    }

    /// `chain[0].intercept(listOf(p..)) { args -> chain[1].intercept(args) { ... f(..) } }`
    fn intercept_chain(&mut self, decl: &Declaration, chain: &[Name], span: Span) -> ExprId {
        let mut body = self.forward_call(decl, span);
        for (depth, &decorator) in chain.iter().enumerate().rev() {
            let input = if depth == 0 {
                let params = decl
                    .params
                    .iter()
                    .map(|param| CallArg::positional(self.arena.ident(param.name, span)))
                    .collect();
                self.arena.call(Name::LIST_OF, params, span)
            } else {
                self.arena.ident(Name::ARGS, span)
            };
            let args_ty = TypeRef::generic(Name::LIST, vec![TypeRef::named(Name::ANY).nullable()]);
            let next = self.arena.lambda(
                vec![LambdaParam {
                    name: Name::ARGS,
                    ty: Some(args_ty),
                }],
                body,
                span,
            );
            let receiver = self.arena.ident(decorator, span);
            body = self.arena.method_call(
                receiver,
                Name::INTERCEPT,
                vec![CallArg::positional(input), CallArg::positional(next)],
                span,
            );
        }
        body
    }

    /// `f(args[0] as P1, ...)`, through `this` for extensions.
    fn forward_call(&mut self, decl: &Declaration, span: Span) -> ExprId {
        let args = decl
            .params
            .iter()
            .zip(0_i64..)
            .map(|(param, i)| {
                let list = self.arena.ident(Name::ARGS, span);
                let index = self.arena.int(i, span);
                let element = self.arena.index(list, index, span);
                CallArg::positional(self.arena.cast(element, param.ty.clone(), span))
            })
            .collect();
        if decl.receiver.is_some() {
            let this = self.arena.this(span);
            self.arena.method_call(this, decl.name, args, span)
        } else {
            self.arena.call(decl.name, args, span)
        }
    }
}
