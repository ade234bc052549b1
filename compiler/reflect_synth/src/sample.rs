//! Default-valued samples.
//!
//! A sample is an expression built only from leaf defaults, constructor
//! calls and singleton references. It depends on nothing but the unit's
//! declarations, so repeated runs produce identical output.

use rustc_hash::FxHashSet;
use tracing::debug;

use reflect_ir::{
    BuiltinType, CallArg, DeclFlags, DeclId, Declaration, ExprId, ExprKind, Name, Renderer, Span,
    SynthOrigin, SynthesizedDecl, TypeRef,
};
use reflect_shape::Shape;
use reflect_stack::ensure_sufficient_stack;

use crate::context::SynthContext;
use crate::error::SynthError;
use crate::naming::{decapitalize, Scope};

/// Where the generator is while descending through members.
struct Walk {
    /// Root type name, then member names.
    path: Vec<Name>,
    /// Products under construction; meeting one again is a cycle.
    visiting: FxHashSet<DeclId>,
    span: Span,
}

impl SynthContext<'_> {
    /// Sample value of the type `id` declares.
    pub fn generate_sample(&mut self, id: DeclId) -> Result<ExprId, SynthError> {
        let root = self.decls.get(id);
        let mut walk = Walk {
            path: vec![root.name],
            visiting: FxHashSet::default(),
            span: root.span,
        };
        self.sample_decl(id, &mut walk)
    }

    /// `val tSample: T = <sample>`
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn install_sample(&mut self, id: DeclId) -> Result<SynthesizedDecl, SynthError> {
        let init = self.generate_sample(id)?;
        let decls = self.decls;
        let decl = decls.get(id);
        let base = format!("{}Sample", decapitalize(self.interner.lookup(decl.name)));
        let name = self.reserve(Scope::TopLevel, &base, decl.span)?;
        let property = Declaration::property(name, self.self_type(id), init, decl.span);
        Ok(SynthesizedDecl::new(property, SynthOrigin::Sample, id))
    }

    fn sample_decl(&mut self, id: DeclId, walk: &mut Walk) -> Result<ExprId, SynthError> {
        let decls = self.decls;
        let shape = self.shapes.classify(id);
        match &*shape {
            Shape::Product(product) => {
                let owner = decls.get(product.owner);
                if owner
                    .flags
                    .intersects(DeclFlags::OBJECT | DeclFlags::ENUM_ENTRY)
                {
                    return Ok(self.singleton_ref(owner, walk.span));
                }
                if !walk.visiting.insert(owner.id) {
                    return Err(self.no_default(self.interner.lookup(owner.name).to_owned(), walk));
                }
                let mut args = Vec::with_capacity(owner.members.len());
                for member in &owner.members {
                    walk.path.push(member.name);
                    let value = ensure_sufficient_stack(|| self.sample_type(&member.ty, walk))?;
                    walk.path.pop();
                    args.push(CallArg::named(member.name, value));
                }
                walk.visiting.remove(&owner.id);
                Ok(self.arena.call(owner.name, args, walk.span))
            }
            Shape::Coproduct(coproduct) => {
                let first = coproduct.variants[0];
                ensure_sufficient_stack(|| self.sample_decl(first, walk))
            }
            Shape::Opaque(reason) => {
                debug!(?id, ?reason, "no sample for opaque shape");
                Err(self.no_default(self.interner.lookup(decls.get(id).name).to_owned(), walk))
            }
        }
    }

    fn sample_type(&mut self, ty: &TypeRef, walk: &mut Walk) -> Result<ExprId, SynthError> {
        let span = walk.span;
        if ty.is_nullable() {
            return Ok(self.arena.alloc(ExprKind::Null, span));
        }
        let Some(head) = ty.head() else {
            return Err(self.unknown_type(ty, walk));
        };
        let Some(builtin) = ty.builtin() else {
            return match self.decls.find_class(head) {
                Some(class) => self.sample_decl(class, walk),
                None => Err(self.unknown_type(ty, walk)),
            };
        };

        let expr = match builtin {
            b if b.is_integral() => self.arena.int(0, span),
            b if b.is_floating() => self.arena.alloc(ExprKind::Double(0.0f64.to_bits()), span),
            BuiltinType::Boolean => self.arena.alloc(ExprKind::Bool(false), span),
            BuiltinType::Char => self.arena.alloc(ExprKind::Char('a'), span),
            BuiltinType::String => self.arena.string(Name::EMPTY, span),
            BuiltinType::Unit => self.arena.ident(Name::UNIT, span),
            b if b.is_sequence() => self.arena.call(Name::EMPTY_LIST, Vec::new(), span),
            BuiltinType::Set => self.arena.call(Name::EMPTY_SET, Vec::new(), span),
            BuiltinType::Map => self.arena.call(Name::EMPTY_MAP, Vec::new(), span),
            _ => return Err(self.unknown_type(ty, walk)),
        };
        Ok(expr)
    }

    fn unknown_type(&self, ty: &TypeRef, walk: &Walk) -> SynthError {
        let text = Renderer::new(self.interner, &*self.arena).ty(ty);
        self.no_default(text, walk)
    }

    fn no_default(&self, ty: String, walk: &Walk) -> SynthError {
        let path = walk
            .path
            .iter()
            .map(|&segment| self.interner.lookup(segment))
            .collect::<Vec<_>>()
            .join(".");
        SynthError::NoDefaultAvailable {
            ty,
            path,
            span: walk.span,
        }
    }
}

#[cfg(test)]
mod tests;
