//! Names of runtime builtins, interned once per interpreter so dispatch
//! compares `Name`s instead of strings.

use reflect_ir::{Name, StringInterner};

#[derive(Clone, Copy)]
pub(crate) struct BuiltinNames {
    pub(crate) set_of: Name,
    pub(crate) map_of: Name,
    pub(crate) println: Name,
    pub(crate) filter: Name,
    pub(crate) map_not_null: Name,
    pub(crate) for_each: Name,
    pub(crate) first: Name,
    pub(crate) second: Name,
    pub(crate) last: Name,
    pub(crate) is_empty: Name,
    pub(crate) contains: Name,
    pub(crate) join_to_string: Name,
    pub(crate) sum: Name,
    pub(crate) plus: Name,
    pub(crate) length: Name,
    pub(crate) uppercase: Name,
    pub(crate) lowercase: Name,
    pub(crate) to_string: Name,
    pub(crate) equals: Name,
}

impl BuiltinNames {
    pub(crate) fn new(interner: &StringInterner) -> Self {
        BuiltinNames {
            set_of: interner.intern("setOf"),
            map_of: interner.intern("mapOf"),
            println: interner.intern("println"),
            filter: interner.intern("filter"),
            map_not_null: interner.intern("mapNotNull"),
            for_each: interner.intern("forEach"),
            first: interner.intern("first"),
            second: interner.intern("second"),
            last: interner.intern("last"),
            is_empty: interner.intern("isEmpty"),
            contains: interner.intern("contains"),
            join_to_string: interner.intern("joinToString"),
            sum: interner.intern("sum"),
            plus: interner.intern("plus"),
            length: interner.intern("length"),
            uppercase: interner.intern("uppercase"),
            lowercase: interner.intern("lowercase"),
            to_string: interner.intern("toString"),
            equals: interner.intern("equals"),
        }
    }
}
