use super::*;
use crate::StringInterner;

#[test]
fn known_names_match_interner_order() {
    let interner = StringInterner::new();
    for (index, text) in KNOWN_NAMES.iter().enumerate() {
        let name = interner.intern(text);
        assert_eq!(name.index(), index, "`{text}` interned out of order");
    }
}

#[test]
fn known_constants_resolve() {
    let interner = StringInterner::new();
    assert_eq!(interner.lookup(Name::EMPTY), "");
    assert_eq!(interner.lookup(Name::INT), "Int");
    assert_eq!(interner.lookup(Name::LENS), "Lens");
    assert_eq!(interner.lookup(Name::INTERCEPT), "intercept");
    assert_eq!(interner.lookup(Name::SIZE), "size");
    assert_eq!(interner.lookup(Name::CACHED), "Cached");
    assert_eq!(interner.lookup(Name::COMPOSE), "compose");
}

#[test]
fn default_is_empty() {
    assert_eq!(Name::default(), Name::EMPTY);
}
