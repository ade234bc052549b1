//! Shape values.

use std::fmt;

use reflect_ir::{DeclId, Name, StringLookup, TypeRef};

/// A structural member of a product: `(name, type)` in declaration order.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ShapeMember {
    pub name: Name,
    pub ty: TypeRef,
}

/// A product of named members.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProductShape {
    /// Declaration the members belong to. Differs from the classified
    /// declaration when a one-variant hierarchy degrades to its variant.
    pub owner: DeclId,
    pub members: Vec<ShapeMember>,
    /// Hierarchy this product stands in for, if degraded.
    pub singleton_of: Option<DeclId>,
}

impl ProductShape {
    /// Objects and enum entries: no members, one inhabitant.
    pub fn is_unit(&self) -> bool {
        self.members.is_empty()
    }
}

/// A closed sum over variants of a sealed hierarchy or enum.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoproductShape {
    pub root: DeclId,
    /// Variants in source order.
    pub variants: Vec<DeclId>,
    pub singleton_of: Option<DeclId>,
}

/// Why a declaration has no usable shape.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum OpaqueReason {
    /// Functions and properties.
    NotAType,
    /// Sealed or enum declaration with no variants in the unit.
    NoVariants,
    /// Interfaces, abstract and open classes that are not sealed.
    OpenHierarchy,
    /// A member's type mentions a type parameter.
    Generic,
    /// More than one constructor.
    MultipleConstructors,
    /// A member's type is not written down.
    UnknownMemberType { member: Name },
    /// Two members share a name.
    DuplicateMember { member: Name },
    /// The hierarchy reaches itself.
    Cycle,
    /// Hierarchy nesting exceeds the configured depth.
    DepthExceeded,
}

impl OpaqueReason {
    /// Human-readable explanation for diagnostics.
    pub fn describe(&self, interner: &dyn StringLookup) -> String {
        match self {
            OpaqueReason::NotAType => "it is not a type declaration".to_owned(),
            OpaqueReason::NoVariants => "the closed hierarchy has no variants".to_owned(),
            OpaqueReason::OpenHierarchy => {
                "open, abstract and interface types have no fixed structure".to_owned()
            }
            OpaqueReason::Generic => "its members depend on type parameters".to_owned(),
            OpaqueReason::MultipleConstructors => "it has more than one constructor".to_owned(),
            OpaqueReason::UnknownMemberType { member } => format!(
                "the type of member `{}` is not known",
                interner.lookup(*member)
            ),
            OpaqueReason::DuplicateMember { member } => format!(
                "member `{}` is declared more than once",
                interner.lookup(*member)
            ),
            OpaqueReason::Cycle => "its hierarchy is cyclic".to_owned(),
            OpaqueReason::DepthExceeded => "its hierarchy is nested too deeply".to_owned(),
        }
    }
}

/// The statically determined shape of a declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Shape {
    Product(ProductShape),
    Coproduct(CoproductShape),
    Opaque(OpaqueReason),
}

impl Shape {
    pub fn is_opaque(&self) -> bool {
        matches!(self, Shape::Opaque(_))
    }

    pub fn as_product(&self) -> Option<&ProductShape> {
        match self {
            Shape::Product(product) => Some(product),
            _ => None,
        }
    }

    pub fn as_coproduct(&self) -> Option<&CoproductShape> {
        match self {
            Shape::Coproduct(coproduct) => Some(coproduct),
            _ => None,
        }
    }

    /// The same shape marked as standing in for `hierarchy`.
    #[must_use]
    pub(crate) fn singleton_of(mut self, hierarchy: DeclId) -> Self {
        match &mut self {
            Shape::Product(product) => product.singleton_of = Some(hierarchy),
            Shape::Coproduct(coproduct) => coproduct.singleton_of = Some(hierarchy),
            Shape::Opaque(_) => {}
        }
        self
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Product(product) => write!(f, "product of {} member(s)", product.members.len()),
            Shape::Coproduct(coproduct) => {
                write!(f, "coproduct of {} variant(s)", coproduct.variants.len())
            }
            Shape::Opaque(reason) => write!(f, "opaque ({reason:?})"),
        }
    }
}
