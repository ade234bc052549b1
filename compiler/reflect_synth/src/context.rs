//! State shared by the generators during one pass over one unit.

use reflect_ir::{
    DeclFlags, DeclId, DeclTable, Declaration, ExprArena, ExprId, Name, Span, StringInterner,
    SynthesizedDecl, TypeRef,
};
use reflect_shape::{ShapeAnalyzer, ShapeConfig};

use crate::decorator::DecoratorOrder;
use crate::error::SynthError;
use crate::naming::{Scope, SymbolTable, DEFAULT_MAX_NAME_SUFFIX};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SynthConfig {
    pub shapes: ShapeConfig,
    pub decorator_order: DecoratorOrder,
    pub max_name_suffix: u32,
}

impl Default for SynthConfig {
    fn default() -> Self {
        SynthConfig {
            shapes: ShapeConfig::default(),
            decorator_order: DecoratorOrder::default(),
            max_name_suffix: DEFAULT_MAX_NAME_SUFFIX,
        }
    }
}

/// Borrowed view of a unit plus fresh naming and shape state.
///
/// Declarations are read-only; new expressions go to the arena, which the
/// driver checkpoints around each declaration.
pub struct SynthContext<'u> {
    pub(crate) decls: &'u DeclTable,
    pub(crate) arena: &'u mut ExprArena,
    pub(crate) interner: &'u StringInterner,
    pub(crate) names: SymbolTable<'u>,
    pub(crate) shapes: ShapeAnalyzer<'u>,
    pub(crate) config: SynthConfig,
}

impl<'u> SynthContext<'u> {
    pub fn new(
        decls: &'u DeclTable,
        synthesized: &[SynthesizedDecl],
        arena: &'u mut ExprArena,
        interner: &'u StringInterner,
        config: SynthConfig,
    ) -> Self {
        SynthContext {
            decls,
            arena,
            interner,
            names: SymbolTable::seeded(interner, decls, synthesized, config.max_name_suffix),
            shapes: ShapeAnalyzer::new(decls, config.shapes),
            config,
        }
    }

    pub fn arena(&mut self) -> &mut ExprArena {
        &mut *self.arena
    }

    pub fn names(&self) -> &SymbolTable<'u> {
        &self.names
    }

    pub fn shapes(&mut self) -> &mut ShapeAnalyzer<'u> {
        &mut self.shapes
    }

    pub(crate) fn name_of(&self, id: DeclId) -> &'static str {
        self.interner.lookup(self.decls.get(id).name)
    }

    pub(crate) fn reserve(
        &mut self,
        scope: Scope,
        base: &str,
        span: Span,
    ) -> Result<Name, SynthError> {
        self.names
            .reserve(scope, base)
            .map_err(|source| SynthError::naming(source, span))
    }

    /// The type a declaration introduces, with star projections for its
    /// type parameters.
    pub(crate) fn self_type(&self, id: DeclId) -> TypeRef {
        let decl = self.decls.get(id);
        if decl.type_params.is_empty() {
            TypeRef::named(decl.name)
        } else {
            TypeRef::generic(
                decl.name,
                decl.type_params.iter().map(|_| TypeRef::Star).collect(),
            )
        }
    }

    /// Expression denoting the single inhabitant of an object or enum entry.
    pub(crate) fn singleton_ref(&mut self, decl: &Declaration, span: Span) -> ExprId {
        match decl.parent {
            Some(parent) if decl.flags.contains(DeclFlags::ENUM_ENTRY) => {
                let owner = self.arena.ident(self.decls.get(parent).name, span);
                self.arena.field(owner, decl.name, span)
            }
            _ => self.arena.ident(decl.name, span),
        }
    }
}
