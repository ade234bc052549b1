//! Compilation units and their declaration tables.

use crate::arena::to_u32;
use crate::{
    DeclFlags, DeclId, Declaration, ExprArena, Name, Span, StringLookup, SynthesizedDecl,
};

/// Declarations of one unit, indexed by [`DeclId`].
///
/// Declarations are pushed in source order; a parent is always pushed
/// before its nested declarations, so id order is source order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeclTable {
    decls: Vec<Declaration>,
}

impl DeclTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a declaration, assigning its id.
    pub fn push(&mut self, mut decl: Declaration) -> DeclId {
        let id = DeclId::new(to_u32(self.decls.len(), "declarations"));
        decl.id = id;
        self.decls.push(decl);
        id
    }

    #[inline]
    pub fn get(&self, id: DeclId) -> &Declaration {
        &self.decls[id.index()]
    }

    /// Mutable access while the front-end is still building the table.
    #[inline]
    pub fn get_mut(&mut self, id: DeclId) -> &mut Declaration {
        &mut self.decls[id.index()]
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    /// All declarations in source order.
    pub fn iter(&self) -> impl Iterator<Item = &Declaration> {
        self.decls.iter()
    }

    /// Declarations with no enclosing declaration.
    pub fn top_level(&self) -> impl Iterator<Item = &Declaration> {
        self.decls.iter().filter(|d| d.parent.is_none())
    }

    /// Declarations directly nested in `parent`.
    pub fn children_of(&self, parent: DeclId) -> impl Iterator<Item = &Declaration> {
        self.decls.iter().filter(move |d| d.parent == Some(parent))
    }

    /// First class-like declaration with the simple name `name`.
    pub fn find_class(&self, name: Name) -> Option<DeclId> {
        self.decls
            .iter()
            .find(|d| d.is_class_like() && d.name == name)
            .map(|d| d.id)
    }

    /// Members of the closed hierarchy rooted at `root`, in source order.
    ///
    /// Enum entries are the `ENUM_ENTRY` children of the enum; sealed
    /// variants are the class-like declarations naming `root` as a direct
    /// supertype.
    pub fn variants_of(&self, root: DeclId) -> Vec<DeclId> {
        let decl = self.get(root);
        if decl.flags.contains(DeclFlags::ENUM) {
            return self
                .children_of(root)
                .filter(|d| d.flags.contains(DeclFlags::ENUM_ENTRY))
                .map(|d| d.id)
                .collect();
        }
        self.decls
            .iter()
            .filter(|d| d.id != root && d.is_class_like() && d.extends(decl.name))
            .map(|d| d.id)
            .collect()
    }

    /// Dotted name through every enclosing declaration.
    pub fn qualified_name(&self, id: DeclId, interner: &dyn StringLookup) -> String {
        let mut segments = Vec::new();
        let mut current = Some(id);
        while let Some(id) = current {
            let decl = self.get(id);
            segments.push(interner.lookup(decl.name).to_owned());
            current = decl.parent;
        }
        segments.reverse();
        segments.join(".")
    }
}

/// `import a.b.C`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Import {
    pub path: Vec<Name>,
    pub span: Span,
}

/// One source file handed to the plugin.
///
/// The declaration table and the expression arena are separate fields so a
/// pass can read declarations while appending synthesized expressions.
#[derive(Clone, Debug, Default)]
pub struct CompilationUnit {
    pub source_name: String,
    pub package: Vec<Name>,
    pub imports: Vec<Import>,
    pub decls: DeclTable,
    pub arena: ExprArena,
    /// Declarations inserted by completed passes, in insertion order.
    pub synthesized: Vec<SynthesizedDecl>,
}

impl CompilationUnit {
    pub fn new(source_name: impl Into<String>) -> Self {
        CompilationUnit {
            source_name: source_name.into(),
            ..Self::default()
        }
    }

    /// Dotted package name, empty for the default package.
    pub fn package_name(&self, interner: &dyn StringLookup) -> String {
        self.package
            .iter()
            .map(|&segment| interner.lookup(segment))
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Fully qualified name of a declaration, including the package.
    pub fn qualified_name(&self, id: DeclId, interner: &dyn StringLookup) -> String {
        let local = self.decls.qualified_name(id, interner);
        if self.package.is_empty() {
            local
        } else {
            format!("{}.{local}", self.package_name(interner))
        }
    }

    /// Append the output of one pass.
    pub fn insert_synthesized(&mut self, decls: impl IntoIterator<Item = SynthesizedDecl>) {
        self.synthesized.extend(decls);
    }
}

#[cfg(test)]
mod tests;
