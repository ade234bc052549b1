//! Declarations of a compilation unit.
//!
//! A [`Declaration`] is immutable once the front-end hands the unit over;
//! the analyzer and generators only read it. Nested declarations point at
//! their parent by [`DeclId`], never by ownership.

use std::fmt;

use bitflags::bitflags;
use smallvec::SmallVec;

use crate::{ExprId, Name, Span, TypeRef};

/// Index of a declaration in its unit's declaration table.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct DeclId(u32);

impl DeclId {
    /// Id of a declaration that is not (yet) part of a declaration table.
    pub const DETACHED: DeclId = DeclId(u32::MAX);

    #[inline]
    pub const fn new(index: u32) -> Self {
        DeclId(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for DeclId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::DETACHED {
            write!(f, "DeclId::DETACHED")
        } else {
            write!(f, "DeclId({})", self.0)
        }
    }
}

/// What a declaration declares.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum DeclKind {
    /// Classes, interfaces, objects, enums and enum entries.
    Class,
    Function,
    Property,
}

bitflags! {
    /// Modifiers relevant to shape classification.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
    pub struct DeclFlags: u16 {
        const DATA = 1 << 0;
        const SEALED = 1 << 1;
        const ABSTRACT = 1 << 2;
        const OPEN = 1 << 3;
        const INTERFACE = 1 << 4;
        const OBJECT = 1 << 5;
        const ENUM = 1 << 6;
        const ENUM_ENTRY = 1 << 7;
        const COMPANION = 1 << 8;
        /// `var` property.
        const MUTABLE = 1 << 9;
    }
}

/// A primary-constructor parameter.
///
/// Only parameters declared `val`/`var` are properties; plain parameters
/// take part in construction but are not structural members.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Member {
    pub name: Name,
    pub ty: TypeRef,
    pub is_property: bool,
    pub mutable: bool,
    pub default: Option<ExprId>,
    pub span: Span,
}

/// A function parameter.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Param {
    pub name: Name,
    pub ty: TypeRef,
    pub default: Option<ExprId>,
    pub span: Span,
}

impl Param {
    pub fn new(name: Name, ty: TypeRef) -> Self {
        Param {
            name,
            ty,
            default: None,
            span: Span::DUMMY,
        }
    }
}

/// Literal value of an annotation argument.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum AnnotationValue {
    Str(Name),
    Int(i64),
    Bool(bool),
    Ident(Name),
}

/// `name = value` or positional `value`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AnnotationArg {
    pub name: Option<Name>,
    pub value: AnnotationValue,
}

/// `@Name(args)`
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Annotation {
    pub name: Name,
    pub args: SmallVec<[AnnotationArg; 2]>,
    pub span: Span,
}

impl Annotation {
    pub fn marker(name: Name, span: Span) -> Self {
        Annotation {
            name,
            args: SmallVec::new(),
            span,
        }
    }

    /// Value of the named argument `key`.
    pub fn arg(&self, key: Name) -> Option<&AnnotationValue> {
        self.args
            .iter()
            .find(|arg| arg.name == Some(key))
            .map(|arg| &arg.value)
    }
}

/// A declaration: class-like, function, or property.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Declaration {
    pub id: DeclId,
    pub name: Name,
    pub kind: DeclKind,
    pub flags: DeclFlags,
    pub type_params: SmallVec<[Name; 2]>,
    /// Primary-constructor parameters in declaration order.
    pub members: Vec<Member>,
    /// Primary plus secondary constructors.
    pub constructors: u32,
    pub supertypes: Vec<TypeRef>,
    pub annotations: Vec<Annotation>,
    /// Receiver of an extension function or property.
    pub receiver: Option<TypeRef>,
    pub params: Vec<Param>,
    /// Return type of a function, declared type of a property.
    pub ret: Option<TypeRef>,
    /// Function body or property initializer.
    pub body: Option<ExprId>,
    pub parent: Option<DeclId>,
    pub span: Span,
}

impl Declaration {
    /// An empty declaration of the given kind; callers fill in the rest.
    pub fn new(kind: DeclKind, name: Name, span: Span) -> Self {
        Declaration {
            id: DeclId::DETACHED,
            name,
            kind,
            flags: DeclFlags::empty(),
            type_params: SmallVec::new(),
            members: Vec::new(),
            constructors: 0,
            supertypes: Vec::new(),
            annotations: Vec::new(),
            receiver: None,
            params: Vec::new(),
            ret: None,
            body: None,
            parent: None,
            span,
        }
    }

    /// `fun [receiver.]name(params): ret = body`
    pub fn function(
        name: Name,
        receiver: Option<TypeRef>,
        params: Vec<Param>,
        ret: TypeRef,
        body: ExprId,
        span: Span,
    ) -> Self {
        Declaration {
            receiver,
            params,
            ret: Some(ret),
            body: Some(body),
            ..Declaration::new(DeclKind::Function, name, span)
        }
    }

    /// `val name: ty = init`
    pub fn property(name: Name, ty: TypeRef, init: ExprId, span: Span) -> Self {
        Declaration {
            ret: Some(ty),
            body: Some(init),
            ..Declaration::new(DeclKind::Property, name, span)
        }
    }

    pub fn is_class_like(&self) -> bool {
        self.kind == DeclKind::Class
    }

    pub fn is_function(&self) -> bool {
        self.kind == DeclKind::Function
    }

    pub fn has_annotation(&self, name: Name) -> bool {
        self.annotations.iter().any(|a| a.name == name)
    }

    /// Whether any supertype has head `name`.
    pub fn extends(&self, name: Name) -> bool {
        self.supertypes.iter().any(|s| s.head() == Some(name))
    }

    /// Primary-constructor properties.
    pub fn properties(&self) -> impl Iterator<Item = &Member> {
        self.members.iter().filter(|m| m.is_property)
    }
}
