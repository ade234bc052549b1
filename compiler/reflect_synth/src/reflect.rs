//! Reflection and optics over shapes.
//!
//! For a product, in member order: accessors, the descriptor, lenses,
//! optionals for nullable members, then traversals. For a coproduct: the discriminator, then each variant's own
//! declarations. Output order is a function of the input alone so rendered
//! results diff cleanly.

use tracing::debug;

use reflect_ir::{
    BinaryOp, CallArg, DeclFlags, DeclId, Declaration, ExprId, ExprKind, LambdaParam, Member, Name, Span,
    SynthOrigin, SynthesizedDecl, TypeRef, WhenArm, WhenCondition,
};
use reflect_shape::{CoproductShape, ProductShape, Shape};

use crate::context::SynthContext;
use crate::error::SynthError;
use crate::naming::{capitalize, decapitalize, Scope};
use crate::request::Request;

/// `List<Pair<String, *>>`
fn descriptor_type() -> TypeRef {
    TypeRef::generic(
        Name::LIST,
        vec![TypeRef::generic(
            Name::PAIR,
            vec![TypeRef::named(Name::STRING), TypeRef::Star],
        )],
    )
}

/// Element type of a non-null `List<E>` member.
fn list_element(ty: &TypeRef) -> Option<&TypeRef> {
    match ty {
        TypeRef::Named { name, args } if *name == Name::LIST && args.len() == 1 => Some(&args[0]),
        _ => None,
    }
}

impl SynthContext<'_> {
    /// Reflection and optics for `id`.
    ///
    /// An opaque shape with a non-empty request is an `UnsupportedShape`
    /// error; opaque variants reached through a hierarchy are skipped.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn synthesize(
        &mut self,
        id: DeclId,
        request: Request,
    ) -> Result<Vec<SynthesizedDecl>, SynthError> {
        let request = request & Request::STRUCTURAL;
        if request.is_empty() {
            return Ok(Vec::new());
        }
        let shape = self.shapes.classify(id);
        let mut out = Vec::new();
        self.synthesize_shape(id, id, &shape, request, &mut out)?;
        Ok(out)
    }

    fn synthesize_shape(
        &mut self,
        source: DeclId,
        target: DeclId,
        shape: &Shape,
        request: Request,
        out: &mut Vec<SynthesizedDecl>,
    ) -> Result<(), SynthError> {
        match shape {
            Shape::Opaque(reason) => Err(SynthError::UnsupportedShape {
                decl: self.name_of(target).to_owned(),
                requested: request.describe(),
                reason: reason.describe(self.interner),
                span: self.decls.get(target).span,
            }),
            Shape::Product(product) => {
                // A degraded hierarchy describes its variant, which may ask
                // for some of the same generators itself.
                let request = if product.owner == target {
                    request
                } else {
                    request - Request::from_annotations(self.decls.get(product.owner))
                };
                self.product(source, product, request, out)
            }
            Shape::Coproduct(coproduct) => self.coproduct(source, coproduct, request, out),
        }
    }

    fn product(
        &mut self,
        source: DeclId,
        product: &ProductShape,
        request: Request,
        out: &mut Vec<SynthesizedDecl>,
    ) -> Result<(), SynthError> {
        let decls = self.decls;
        let span = decls.get(source).span;
        let owner = decls.get(product.owner);
        let self_ty = self.self_type(owner.id);
        let scope = Scope::Member(owner.id);

        if request.contains(Request::ACCESSORS) {
            for member in &product.members {
                let base = format!("get{}", capitalize(self.interner.lookup(member.name)));
                let name = self.reserve(scope, &base, span)?;
                let this = self.arena.this(span);
                let body = self.arena.field(this, member.name, span);
                let decl = Declaration::function(
                    name,
                    Some(self_ty.clone()),
                    Vec::new(),
                    member.ty.clone(),
                    body,
                    span,
                );
                out.push(SynthesizedDecl::new(decl, SynthOrigin::Reflection, source));
            }
        }

        if request.contains(Request::DESCRIPTOR) {
            let name = self.reserve(scope, "product", span)?;
            let pairs: Vec<CallArg> = product
                .members
                .iter()
                .map(|member| {
                    let key = self.arena.string(member.name, span);
                    let this = self.arena.this(span);
                    let value = self.arena.field(this, member.name, span);
                    CallArg::positional(self.arena.pair(key, value, span))
                })
                .collect();
            let body = self.arena.call(Name::LIST_OF, pairs, span);
            let decl = Declaration::function(
                name,
                Some(self_ty.clone()),
                Vec::new(),
                descriptor_type(),
                body,
                span,
            );
            out.push(SynthesizedDecl::new(decl, SynthOrigin::Reflection, source));
        }

        if request.contains(Request::OPTICS) && !product.members.is_empty() {
            self.check_rebuildable(owner)?;
            let prefix = decapitalize(self.interner.lookup(owner.name));
            for member in &product.members {
                let base = format!("{prefix}{}", capitalize(self.interner.lookup(member.name)));
                let name = self.reserve(Scope::TopLevel, &base, span)?;
                let decl = self.lens(owner, &self_ty, member.name, &member.ty, name, span);
                out.push(SynthesizedDecl::new(decl, SynthOrigin::Optics, source));
            }
            for member in &product.members {
                let TypeRef::Nullable(focus) = &member.ty else {
                    continue;
                };
                let base = format!(
                    "{prefix}{}Optional",
                    capitalize(self.interner.lookup(member.name))
                );
                let name = self.reserve(Scope::TopLevel, &base, span)?;
                let decl = self.optional(owner, &self_ty, member.name, focus, name, span);
                out.push(SynthesizedDecl::new(decl, SynthOrigin::Optics, source));
            }
            for member in &product.members {
                let Some(element) = list_element(&member.ty) else {
                    continue;
                };
                let base = format!(
                    "{prefix}{}Each",
                    capitalize(self.interner.lookup(member.name))
                );
                let name = self.reserve(Scope::TopLevel, &base, span)?;
                let decl = self.traversal(owner, &self_ty, member.name, element, name, span);
                out.push(SynthesizedDecl::new(decl, SynthOrigin::Optics, source));
            }
        }
        Ok(())
    }

    /// Setters rebuild the value: `copy` for data classes, the constructor
    /// otherwise, which needs every constructor parameter to be readable.
    fn check_rebuildable(&self, owner: &Declaration) -> Result<(), SynthError> {
        if owner.flags.contains(DeclFlags::DATA) {
            return Ok(());
        }
        match owner.members.iter().find(|member| !member.is_property) {
            Some(param) => Err(SynthError::UnsupportedShape {
                decl: self.interner.lookup(owner.name).to_owned(),
                requested: Request::OPTICS.describe(),
                reason: format!(
                    "constructor parameter `{}` is not a property",
                    self.interner.lookup(param.name)
                ),
                span: owner.span,
            }),
            None => Ok(()),
        }
    }

    /// `it` with `member` replaced by `value`.
    fn rebuild(&mut self, owner: &Declaration, member: Name, value: ExprId, span: Span) -> ExprId {
        if owner.flags.contains(DeclFlags::DATA) {
            let it = self.arena.ident(Name::IT, span);
            return self
                .arena
                .method_call(it, Name::COPY, vec![CallArg::named(member, value)], span);
        }
        let args = owner
            .members
            .iter()
            .map(|Member { name, .. }| {
                if *name == member {
                    CallArg::named(*name, value)
                } else {
                    let it = self.arena.ident(Name::IT, span);
                    CallArg::named(*name, self.arena.field(it, *name, span))
                }
            })
            .collect();
        self.arena.call(owner.name, args, span)
    }

    /// `val tX: Lens<T, X> = Lens(get = { it: T -> it.x }, set = { it: T, value: X -> ... })`
    fn lens(
        &mut self,
        owner: &Declaration,
        self_ty: &TypeRef,
        member: Name,
        member_ty: &TypeRef,
        name: Name,
        span: Span,
    ) -> Declaration {
        let it = self.arena.ident(Name::IT, span);
        let read = self.arena.field(it, member, span);
        let get = self.arena.lambda(vec![typed_param(Name::IT, self_ty)], read, span);

        let value = self.arena.ident(Name::VALUE, span);
        let rebuilt = self.rebuild(owner, member, value, span);
        let set = self.arena.lambda(
            vec![
                typed_param(Name::IT, self_ty),
                typed_param(Name::VALUE, member_ty),
            ],
            rebuilt,
            span,
        );

        let init = self.arena.call(
            Name::LENS,
            vec![CallArg::named(Name::GET, get), CallArg::named(Name::SET_FN, set)],
            span,
        );
        let ty = TypeRef::generic(Name::LENS, vec![self_ty.clone(), member_ty.clone()]);
        Declaration::property(name, ty, init, span)
    }

    /// `val tXOptional: Optional<T, X>` for a member `x: X?`; setting through
    /// it leaves a null member alone.
    fn optional(
        &mut self,
        owner: &Declaration,
        self_ty: &TypeRef,
        member: Name,
        focus: &TypeRef,
        name: Name,
        span: Span,
    ) -> Declaration {
        let it = self.arena.ident(Name::IT, span);
        let read = self.arena.field(it, member, span);
        let get_or_null = self.arena.lambda(vec![typed_param(Name::IT, self_ty)], read, span);

        let it = self.arena.ident(Name::IT, span);
        let current = self.arena.field(it, member, span);
        let null = self.arena.alloc(ExprKind::Null, span);
        let cond = self.arena.alloc(
            ExprKind::Binary {
                op: BinaryOp::Eq,
                lhs: current,
                rhs: null,
            },
            span,
        );
        let unchanged = self.arena.ident(Name::IT, span);
        let value = self.arena.ident(Name::VALUE, span);
        let rebuilt = self.rebuild(owner, member, value, span);
        let body = self.arena.alloc(
            ExprKind::If {
                cond,
                then_branch: unchanged,
                else_branch: rebuilt,
            },
            span,
        );
        let set = self.arena.lambda(
            vec![typed_param(Name::IT, self_ty), typed_param(Name::VALUE, focus)],
            body,
            span,
        );

        let init = self.arena.call(
            Name::OPTIONAL,
            vec![
                CallArg::named(Name::GET_OR_NULL, get_or_null),
                CallArg::named(Name::SET_FN, set),
            ],
            span,
        );
        let ty = TypeRef::generic(Name::OPTIONAL, vec![self_ty.clone(), focus.clone()]);
        Declaration::property(name, ty, init, span)
    }

    /// `val tXEach: Traversal<T, E> = Traversal(getAll = ..., modify = ...)`
    fn traversal(
        &mut self,
        owner: &Declaration,
        self_ty: &TypeRef,
        member: Name,
        element: &TypeRef,
        name: Name,
        span: Span,
    ) -> Declaration {
        let it = self.arena.ident(Name::IT, span);
        let read = self.arena.field(it, member, span);
        let get_all = self.arena.lambda(vec![typed_param(Name::IT, self_ty)], read, span);

        let it = self.arena.ident(Name::IT, span);
        let list = self.arena.field(it, member, span);
        let f = self.arena.ident(Name::F, span);
        let mapped = self
            .arena
            .method_call(list, Name::MAP_FN, vec![CallArg::positional(f)], span);
        let rebuilt = self.rebuild(owner, member, mapped, span);
        let endo = TypeRef::function(vec![element.clone()], element.clone());
        let modify = self.arena.lambda(
            vec![typed_param(Name::IT, self_ty), typed_param(Name::F, &endo)],
            rebuilt,
            span,
        );

        let init = self.arena.call(
            Name::TRAVERSAL,
            vec![
                CallArg::named(Name::GET_ALL, get_all),
                CallArg::named(Name::MODIFY, modify),
            ],
            span,
        );
        let ty = TypeRef::generic(Name::TRAVERSAL, vec![self_ty.clone(), element.clone()]);
        Declaration::property(name, ty, init, span)
    }

    fn coproduct(
        &mut self,
        source: DeclId,
        coproduct: &CoproductShape,
        request: Request,
        out: &mut Vec<SynthesizedDecl>,
    ) -> Result<(), SynthError> {
        let decls = self.decls;
        let span = decls.get(source).span;

        if request.intersects(Request::ACCESSORS | Request::DESCRIPTOR) {
            let decl = self.discriminator(coproduct, span)?;
            out.push(SynthesizedDecl::new(decl, SynthOrigin::Reflection, source));
        }

        for &variant in &coproduct.variants {
            let variant_decl = decls.get(variant);
            // Enum entries are values, not types to extend.
            if variant_decl.flags.contains(DeclFlags::ENUM_ENTRY) {
                continue;
            }
            let request = request - Request::from_annotations(variant_decl);
            if request.is_empty() {
                continue;
            }
            let shape = self.shapes.classify(variant);
            if let Shape::Opaque(reason) = &*shape {
                debug!(?variant, ?reason, "skipping opaque variant");
                continue;
            }
            self.synthesize_shape(source, variant, &shape, request, out)?;
        }
        Ok(())
    }

    /// `fun T.discriminator(): String = when (this) { is A -> "A" ... }`
    fn discriminator(
        &mut self,
        coproduct: &CoproductShape,
        span: Span,
    ) -> Result<Declaration, SynthError> {
        let decls = self.decls;
        let root = coproduct.root;
        let name = self.reserve(Scope::Member(root), "discriminator", span)?;

        let arms: Vec<WhenArm> = coproduct
            .variants
            .iter()
            .map(|&variant| {
                let variant_decl = decls.get(variant);
                let condition = if variant_decl.flags.contains(DeclFlags::ENUM_ENTRY) {
                    WhenCondition::Value(self.singleton_ref(variant_decl, span))
                } else {
                    WhenCondition::Is(self.self_type(variant))
                };
                WhenArm {
                    condition,
                    body: self.arena.string(variant_decl.name, span),
                }
            })
            .collect();
        let subject = self.arena.this(span);
        let arms = self.arena.alloc_when_arms(arms);
        let body = self.arena.alloc(ExprKind::When { subject, arms }, span);

        Ok(Declaration::function(
            name,
            Some(self.self_type(root)),
            Vec::new(),
            TypeRef::named(Name::STRING),
            body,
            span,
        ))
    }
}

fn typed_param(name: Name, ty: &TypeRef) -> LambdaParam {
    LambdaParam {
        name,
        ty: Some(ty.clone()),
    }
}

#[cfg(test)]
mod tests;
