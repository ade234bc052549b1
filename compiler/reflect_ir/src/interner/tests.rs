use super::*;

#[test]
fn intern_is_idempotent() {
    let interner = StringInterner::new();
    let a = interner.intern("Point");
    let b = interner.intern("Point");
    assert_eq!(a, b);
    assert_eq!(interner.lookup(a), "Point");
}

#[test]
fn distinct_strings_get_distinct_names() {
    let interner = StringInterner::new();
    let a = interner.intern("x");
    let b = interner.intern("y");
    assert_ne!(a, b);
}

#[test]
fn get_does_not_intern() {
    let interner = StringInterner::new();
    let before = interner.len();
    assert_eq!(interner.get("never_seen"), None);
    assert_eq!(interner.len(), before);
    assert_eq!(interner.get("Int"), Some(Name::INT));
}

#[test]
fn shared_interner_across_threads() {
    let interner = StringInterner::shared();
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let interner = Arc::clone(&interner);
            std::thread::spawn(move || interner.intern(&format!("name{}", i % 2)))
        })
        .collect();
    let names: Vec<Name> = handles
        .into_iter()
        .map(|h| h.join().unwrap_or_else(|_| panic!("thread panicked")))
        .collect();
    assert_eq!(names[0], names[2]);
    assert_eq!(names[1], names[3]);
}
