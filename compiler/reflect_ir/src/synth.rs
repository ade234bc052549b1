//! Declarations produced by the plugin.

use crate::{DeclId, Declaration, Name};

/// Generator that produced a synthesized declaration.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SynthOrigin {
    Reflection,
    Optics,
    Decorator,
    Sample,
}

impl SynthOrigin {
    pub fn as_str(self) -> &'static str {
        match self {
            SynthOrigin::Reflection => "reflection",
            SynthOrigin::Optics => "optics",
            SynthOrigin::Decorator => "decorator",
            SynthOrigin::Sample => "sample",
        }
    }
}

/// A new function or property together with its provenance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SynthesizedDecl {
    pub decl: Declaration,
    pub origin: SynthOrigin,
    /// The user declaration it was generated for.
    pub source: DeclId,
    /// For decorator wrappers: the function whose call sites now resolve
    /// to this declaration.
    pub intercepts: Option<Name>,
}

impl SynthesizedDecl {
    pub fn new(decl: Declaration, origin: SynthOrigin, source: DeclId) -> Self {
        SynthesizedDecl {
            decl,
            origin,
            source,
            intercepts: None,
        }
    }

    #[must_use]
    pub fn intercepting(mut self, original: Name) -> Self {
        self.intercepts = Some(original);
        self
    }

    pub fn name(&self) -> Name {
        self.decl.name
    }
}
