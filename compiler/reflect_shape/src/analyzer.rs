//! The shape analyzer.
//!
//! One analyzer lives for one pass over one unit. Results are memoized by
//! `DeclId`; hierarchies are walked with an explicit in-progress set so a
//! hierarchy that reaches itself classifies as `Opaque(Cycle)` instead of
//! recursing forever.

use std::sync::Arc;

use reflect_ir::{DeclFlags, DeclId, DeclTable, Declaration, TypeRef};
use reflect_stack::ensure_sufficient_stack;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::trace;

use crate::shape::{CoproductShape, OpaqueReason, ProductShape, Shape, ShapeMember};

/// Default limit on hierarchy nesting.
pub const DEFAULT_MAX_SHAPE_DEPTH: usize = 64;

/// How a closed hierarchy with exactly one variant is classified.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum SingletonPolicy {
    /// Use the variant's own shape, marked with the hierarchy.
    #[default]
    Degrade,
    /// Keep a one-variant coproduct.
    Keep,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ShapeConfig {
    pub singleton: SingletonPolicy,
    pub max_depth: usize,
}

impl Default for ShapeConfig {
    fn default() -> Self {
        ShapeConfig {
            singleton: SingletonPolicy::default(),
            max_depth: DEFAULT_MAX_SHAPE_DEPTH,
        }
    }
}

/// Classifies declarations of one unit.
pub struct ShapeAnalyzer<'a> {
    decls: &'a DeclTable,
    config: ShapeConfig,
    memo: FxHashMap<DeclId, Arc<Shape>>,
    in_progress: FxHashSet<DeclId>,
}

impl<'a> ShapeAnalyzer<'a> {
    pub fn new(decls: &'a DeclTable, config: ShapeConfig) -> Self {
        ShapeAnalyzer {
            decls,
            config,
            memo: FxHashMap::default(),
            in_progress: FxHashSet::default(),
        }
    }

    pub fn decls(&self) -> &'a DeclTable {
        self.decls
    }

    /// Classify a declaration. Total; never panics on well-formed ids.
    pub fn classify(&mut self, id: DeclId) -> Arc<Shape> {
        self.classify_at(id, 0)
    }

    /// The class-like declaration a member type refers to, if any.
    ///
    /// Builtins and unknown names resolve to `None`.
    pub fn resolve(&self, ty: &TypeRef) -> Option<DeclId> {
        if ty.builtin().is_some() {
            return None;
        }
        ty.head().and_then(|name| self.decls.find_class(name))
    }

    /// Shape of the declaration a type refers to.
    pub fn classify_type(&mut self, ty: &TypeRef) -> Option<Arc<Shape>> {
        self.resolve(ty).map(|id| self.classify(id))
    }

    fn classify_at(&mut self, id: DeclId, depth: usize) -> Arc<Shape> {
        if let Some(shape) = self.memo.get(&id) {
            return Arc::clone(shape);
        }
        if self.in_progress.contains(&id) {
            // Not memoized: the outer classification of `id` decides.
            return Arc::new(Shape::Opaque(OpaqueReason::Cycle));
        }
        if depth > self.config.max_depth {
            return Arc::new(Shape::Opaque(OpaqueReason::DepthExceeded));
        }

        self.in_progress.insert(id);
        let shape = ensure_sufficient_stack(|| self.compute(id, depth));
        self.in_progress.remove(&id);

        trace!(?id, %shape, "classified");
        let shape = Arc::new(shape);
        self.memo.insert(id, Arc::clone(&shape));
        shape
    }

    fn compute(&mut self, id: DeclId, depth: usize) -> Shape {
        let decl = self.decls.get(id);
        if !decl.is_class_like() {
            return Shape::Opaque(OpaqueReason::NotAType);
        }

        let flags = decl.flags;
        if flags.intersects(DeclFlags::OBJECT | DeclFlags::ENUM_ENTRY) {
            return Shape::Product(ProductShape {
                owner: id,
                members: Vec::new(),
                singleton_of: None,
            });
        }
        if flags.intersects(DeclFlags::SEALED | DeclFlags::ENUM) {
            return self.classify_hierarchy(id, depth);
        }
        if flags.intersects(DeclFlags::INTERFACE | DeclFlags::ABSTRACT | DeclFlags::OPEN) {
            return Shape::Opaque(OpaqueReason::OpenHierarchy);
        }
        classify_product(decl)
    }

    fn classify_hierarchy(&mut self, root: DeclId, depth: usize) -> Shape {
        let variants = self.decls.variants_of(root);
        if variants.is_empty() {
            return Shape::Opaque(OpaqueReason::NoVariants);
        }

        let shapes: Vec<Arc<Shape>> = variants
            .iter()
            .map(|&variant| self.classify_at(variant, depth + 1))
            .collect();

        if let Some(reason) = shapes.iter().find_map(|shape| match **shape {
            Shape::Opaque(reason @ (OpaqueReason::Cycle | OpaqueReason::DepthExceeded)) => {
                Some(reason)
            }
            _ => None,
        }) {
            return Shape::Opaque(reason);
        }

        if let ([_], SingletonPolicy::Degrade) = (shapes.as_slice(), self.config.singleton) {
            return (*shapes[0]).clone().singleton_of(root);
        }

        Shape::Coproduct(CoproductShape {
            root,
            variants,
            singleton_of: None,
        })
    }
}

/// Rules for a concrete class: type parameters, constructors, members.
fn classify_product(decl: &Declaration) -> Shape {
    let members: Vec<&reflect_ir::Member> = decl.properties().collect();

    if !decl.type_params.is_empty()
        && members
            .iter()
            .any(|member| member.ty.mentions_any(&decl.type_params))
    {
        return Shape::Opaque(OpaqueReason::Generic);
    }
    if decl.constructors > 1 {
        return Shape::Opaque(OpaqueReason::MultipleConstructors);
    }
    if let Some(member) = members.iter().find(|member| member.ty.has_infer()) {
        return Shape::Opaque(OpaqueReason::UnknownMemberType {
            member: member.name,
        });
    }

    let mut seen = FxHashSet::default();
    for member in &members {
        if !seen.insert(member.name) {
            return Shape::Opaque(OpaqueReason::DuplicateMember {
                member: member.name,
            });
        }
    }

    Shape::Product(ProductShape {
        owner: decl.id,
        members: members
            .into_iter()
            .map(|member| ShapeMember {
                name: member.name,
                ty: member.ty.clone(),
            })
            .collect(),
        singleton_of: None,
    })
}
