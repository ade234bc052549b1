//! Interned string identifier.
//!
//! A `Name` is a 32-bit index into a [`StringInterner`](crate::StringInterner).
//! The first indices are reserved for well-known names that the analyzer and
//! synthesizers compare against; every interner pre-interns them in the same
//! order, so the constants below are valid for any interner.

use std::fmt;

/// Interned string identifier.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct Name(u32);

impl Name {
    /// Create from raw u32 value.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Name(raw)
    }

    /// Get raw u32 value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Index into the interner's string table.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Declares the well-known names as `Name` constants together with the
/// table the interner uses to pre-intern them.
macro_rules! known_names {
    ($($idx:literal => $konst:ident = $text:literal,)*) => {
        impl Name {
            $(
                #[doc = concat!("Pre-interned `", $text, "`.")]
                pub const $konst: Name = Name($idx);
            )*
        }

        /// Well-known strings, indexed by their reserved `Name`.
        pub(crate) const KNOWN_NAMES: &[&str] = &[$($text,)*];
    };
}

known_names! {
    0 => EMPTY = "",
    // Builtin types
    1 => INT = "Int",
    2 => LONG = "Long",
    3 => SHORT = "Short",
    4 => BYTE = "Byte",
    5 => DOUBLE = "Double",
    6 => FLOAT = "Float",
    7 => BOOLEAN = "Boolean",
    8 => CHAR = "Char",
    9 => STRING = "String",
    10 => UNIT = "Unit",
    11 => ANY = "Any",
    12 => LIST = "List",
    13 => COLLECTION = "Collection",
    14 => ITERABLE = "Iterable",
    15 => SET = "Set",
    16 => MAP = "Map",
    17 => PAIR = "Pair",
    18 => NOTHING = "Nothing",
    // Optics runtime types
    19 => LENS = "Lens",
    20 => TRAVERSAL = "Traversal",
    // Generation markers
    21 => REFLECT = "Reflect",
    22 => PRODUCT = "Product",
    23 => OPTICS = "Optics",
    24 => SAMPLE = "Sample",
    // Identifiers used by generated code
    25 => IT = "it",
    26 => VALUE = "value",
    27 => ARGS = "args",
    28 => F = "f",
    29 => COPY = "copy",
    30 => LIST_OF = "listOf",
    31 => EMPTY_LIST = "emptyList",
    32 => EMPTY_SET = "emptySet",
    33 => EMPTY_MAP = "emptyMap",
    34 => INTERCEPT = "intercept",
    35 => MAP_FN = "map",
    36 => PRODUCT_FN = "product",
    37 => DISCRIMINATOR = "discriminator",
    38 => GET = "get",
    39 => SET_FN = "set",
    40 => GET_ALL = "getAll",
    41 => MODIFY = "modify",
    42 => BOX = "box",
    // Decorator arguments
    43 => RENAME = "rename",
    44 => EXCLUSIVE = "exclusive",
    // Misc
    45 => THIS = "this",
    46 => TO = "to",
    47 => SIZE = "size",
    // Interceptors the runtime provides
    48 => DECORATOR = "Decorator",
    49 => LOGGED = "Logged",
    50 => CACHED = "Cached",
    // Optics composition
    51 => OPTIONAL = "Optional",
    52 => GET_OR_NULL = "getOrNull",
    53 => COMPOSE = "compose",
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({})", self.0)
    }
}

impl Default for Name {
    fn default() -> Self {
        Self::EMPTY
    }
}

#[cfg(test)]
mod tests;
