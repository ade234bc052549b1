//! Collision-free names for synthesized declarations.
//!
//! A [`SymbolTable`] is seeded with every name the unit already uses, then
//! hands out `base`, `base_1`, `base_2`, ... per scope. A fresh table is
//! built for each pass over each unit; issued names are never revoked.

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::trace;

use reflect_ir::{DeclId, DeclTable, Declaration, Name, StringInterner, SynthesizedDecl};

/// Default upper bound on the numeric suffix.
pub const DEFAULT_MAX_NAME_SUFFIX: u32 = 1024;

/// Where a name must be unique.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Scope {
    TopLevel,
    /// Members, nested declarations and extensions of a type.
    Member(DeclId),
}

/// Every candidate up to the suffix limit is taken.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("no free name for `{base}` after {limit} suffixed candidates")]
pub struct NamingExhausted {
    pub base: String,
    pub limit: u32,
}

/// A name issued by [`SymbolTable::reserve`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct NameBinding {
    pub scope: Scope,
    pub base: Name,
    pub name: Name,
}

/// Scope an existing declaration's name lives in.
///
/// Nested declarations belong to their parent; extensions belong to the
/// class their receiver names when that class is in the unit.
pub fn scope_of(decls: &DeclTable, decl: &Declaration) -> Scope {
    if let Some(parent) = decl.parent {
        return Scope::Member(parent);
    }
    decl.receiver
        .as_ref()
        .and_then(|receiver| receiver.head())
        .and_then(|head| decls.find_class(head))
        .map_or(Scope::TopLevel, Scope::Member)
}

pub struct SymbolTable<'i> {
    interner: &'i StringInterner,
    used: FxHashMap<Scope, FxHashSet<Name>>,
    bindings: Vec<NameBinding>,
    max_suffix: u32,
}

impl<'i> SymbolTable<'i> {
    pub fn new(interner: &'i StringInterner, max_suffix: u32) -> Self {
        SymbolTable {
            interner,
            used: FxHashMap::default(),
            bindings: Vec::new(),
            max_suffix,
        }
    }

    /// A table holding every name declared in `decls` and in earlier
    /// passes' output.
    pub fn seeded(
        interner: &'i StringInterner,
        decls: &DeclTable,
        synthesized: &[SynthesizedDecl],
        max_suffix: u32,
    ) -> Self {
        let mut table = SymbolTable::new(interner, max_suffix);
        for decl in decls.iter() {
            table.mark_used(scope_of(decls, decl), decl.name);
            if decl.is_class_like() {
                for member in &decl.members {
                    table.mark_used(Scope::Member(decl.id), member.name);
                }
            }
        }
        for synth in synthesized {
            table.mark_used(scope_of(decls, &synth.decl), synth.decl.name);
        }
        table
    }

    pub fn mark_used(&mut self, scope: Scope, name: Name) {
        self.used.entry(scope).or_default().insert(name);
    }

    pub fn is_used(&self, scope: Scope, name: Name) -> bool {
        self.used
            .get(&scope)
            .is_some_and(|names| names.contains(&name))
    }

    /// Issue the first free candidate for `base` in `scope`.
    pub fn reserve(&mut self, scope: Scope, base: &str) -> Result<Name, NamingExhausted> {
        let base_name = self.interner.intern(base);
        let mut candidate = base_name;
        let mut suffix = 0;
        while self.is_used(scope, candidate) {
            suffix += 1;
            if suffix > self.max_suffix {
                return Err(NamingExhausted {
                    base: base.to_owned(),
                    limit: self.max_suffix,
                });
            }
            candidate = self.interner.intern(&format!("{base}_{suffix}"));
        }

        trace!(?scope, base, name = self.interner.lookup(candidate), "reserved");
        self.mark_used(scope, candidate);
        self.bindings.push(NameBinding {
            scope,
            base: base_name,
            name: candidate,
        });
        Ok(candidate)
    }

    /// Names issued so far, in issue order.
    pub fn bindings(&self) -> &[NameBinding] {
        &self.bindings
    }
}

/// `x` → `X`
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `Point` → `point`
pub fn decapitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
