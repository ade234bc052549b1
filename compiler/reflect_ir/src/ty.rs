//! Type references as written in declarations.
//!
//! The plugin runs before the host's type checker has to agree with it, so
//! types are kept syntactic: a head name with arguments, nullability, and
//! function types. `Infer` marks a type that was not written down (and so is
//! not statically known to the analyzer).

use crate::Name;

/// A syntactic type reference.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeRef {
    /// `Head<Args...>`; qualified heads keep only the last segment.
    Named { name: Name, args: Vec<TypeRef> },
    /// `T?`
    Nullable(Box<TypeRef>),
    /// `(A, B) -> R`
    Function { params: Vec<TypeRef>, ret: Box<TypeRef> },
    /// `*` projection in a type argument position.
    Star,
    /// No type was written.
    Infer,
}

impl TypeRef {
    /// A type with no arguments.
    pub fn named(name: Name) -> Self {
        TypeRef::Named {
            name,
            args: Vec::new(),
        }
    }

    /// A generic type instantiation.
    pub fn generic(name: Name, args: Vec<TypeRef>) -> Self {
        TypeRef::Named { name, args }
    }

    /// Wrap in `?` unless already nullable.
    #[must_use]
    pub fn nullable(self) -> Self {
        match self {
            TypeRef::Nullable(_) => self,
            other => TypeRef::Nullable(Box::new(other)),
        }
    }

    /// `(A, ...) -> R`
    pub fn function(params: Vec<TypeRef>, ret: TypeRef) -> Self {
        TypeRef::Function {
            params,
            ret: Box::new(ret),
        }
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self, TypeRef::Nullable(_))
    }

    /// The type with one level of nullability removed.
    pub fn non_null(&self) -> &TypeRef {
        match self {
            TypeRef::Nullable(inner) => inner,
            other => other,
        }
    }

    /// Head name of a named type (looking through nullability).
    pub fn head(&self) -> Option<Name> {
        match self.non_null() {
            TypeRef::Named { name, .. } => Some(*name),
            _ => None,
        }
    }

    /// Type arguments of a named type (looking through nullability).
    pub fn args(&self) -> &[TypeRef] {
        match self.non_null() {
            TypeRef::Named { args, .. } => args,
            _ => &[],
        }
    }

    /// Builtin classification of the head name.
    pub fn builtin(&self) -> Option<BuiltinType> {
        self.head().and_then(BuiltinType::from_name)
    }

    /// Whether any part of this type is `Infer`.
    pub fn has_infer(&self) -> bool {
        match self {
            TypeRef::Infer => true,
            TypeRef::Star => false,
            TypeRef::Nullable(inner) => inner.has_infer(),
            TypeRef::Named { args, .. } => args.iter().any(TypeRef::has_infer),
            TypeRef::Function { params, ret } => {
                params.iter().any(TypeRef::has_infer) || ret.has_infer()
            }
        }
    }

    /// Whether any head name in this type is one of `params`.
    pub fn mentions_any(&self, params: &[Name]) -> bool {
        match self {
            TypeRef::Infer | TypeRef::Star => false,
            TypeRef::Nullable(inner) => inner.mentions_any(params),
            TypeRef::Named { name, args } => {
                params.contains(name) || args.iter().any(|a| a.mentions_any(params))
            }
            TypeRef::Function { params: ps, ret } => {
                ps.iter().any(|p| p.mentions_any(params)) || ret.mentions_any(params)
            }
        }
    }
}

/// Types the plugin knows without a declaration in the unit.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BuiltinType {
    Int,
    Long,
    Short,
    Byte,
    Double,
    Float,
    Boolean,
    Char,
    String,
    Unit,
    Any,
    List,
    Collection,
    Iterable,
    Set,
    Map,
    Pair,
    Nothing,
}

impl BuiltinType {
    /// Classify a head name.
    pub fn from_name(name: Name) -> Option<BuiltinType> {
        let builtin = match name {
            Name::INT => BuiltinType::Int,
            Name::LONG => BuiltinType::Long,
            Name::SHORT => BuiltinType::Short,
            Name::BYTE => BuiltinType::Byte,
            Name::DOUBLE => BuiltinType::Double,
            Name::FLOAT => BuiltinType::Float,
            Name::BOOLEAN => BuiltinType::Boolean,
            Name::CHAR => BuiltinType::Char,
            Name::STRING => BuiltinType::String,
            Name::UNIT => BuiltinType::Unit,
            Name::ANY => BuiltinType::Any,
            Name::LIST => BuiltinType::List,
            Name::COLLECTION => BuiltinType::Collection,
            Name::ITERABLE => BuiltinType::Iterable,
            Name::SET => BuiltinType::Set,
            Name::MAP => BuiltinType::Map,
            Name::PAIR => BuiltinType::Pair,
            Name::NOTHING => BuiltinType::Nothing,
            _ => return None,
        };
        Some(builtin)
    }

    /// Integral numeric types.
    pub fn is_integral(self) -> bool {
        matches!(
            self,
            BuiltinType::Int | BuiltinType::Long | BuiltinType::Short | BuiltinType::Byte
        )
    }

    /// Floating-point numeric types.
    pub fn is_floating(self) -> bool {
        matches!(self, BuiltinType::Double | BuiltinType::Float)
    }

    /// Sequence types that admit `List`-style traversal.
    pub fn is_sequence(self) -> bool {
        matches!(
            self,
            BuiltinType::List | BuiltinType::Collection | BuiltinType::Iterable
        )
    }
}
