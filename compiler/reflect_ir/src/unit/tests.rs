use pretty_assertions::assert_eq;

use super::*;
use crate::{DeclKind, StringInterner, TypeRef};

fn class(interner: &StringInterner, name: &str) -> Declaration {
    Declaration::new(DeclKind::Class, interner.intern(name), Span::DUMMY)
}

#[test]
fn push_assigns_ids_in_order() {
    let interner = StringInterner::new();
    let mut table = DeclTable::new();
    let a = table.push(class(&interner, "A"));
    let b = table.push(class(&interner, "B"));
    assert_eq!(a, DeclId::new(0));
    assert_eq!(b, DeclId::new(1));
    assert_eq!(table.get(b).id, b);
    assert_eq!(table.find_class(interner.intern("B")), Some(b));
    assert_eq!(table.find_class(interner.intern("C")), None);
}

#[test]
fn sealed_variants_follow_source_order() {
    let interner = StringInterner::new();
    let mut table = DeclTable::new();
    let mut root = class(&interner, "Color");
    root.flags = DeclFlags::SEALED;
    let root = table.push(root);

    let mut unrelated = class(&interner, "Other");
    unrelated.supertypes = vec![TypeRef::named(interner.intern("Any"))];
    table.push(unrelated);

    let mut red = class(&interner, "Red");
    red.flags = DeclFlags::OBJECT;
    red.supertypes = vec![TypeRef::named(interner.intern("Color"))];
    let red = table.push(red);

    let mut blue = class(&interner, "Blue");
    blue.flags = DeclFlags::OBJECT;
    blue.parent = Some(root);
    blue.supertypes = vec![TypeRef::named(interner.intern("Color"))];
    let blue = table.push(blue);

    assert_eq!(table.variants_of(root), vec![red, blue]);
    assert_eq!(table.qualified_name(blue, &interner), "Color.Blue");
}

#[test]
fn enum_variants_are_entries() {
    let interner = StringInterner::new();
    let mut table = DeclTable::new();
    let mut root = class(&interner, "Dir");
    root.flags = DeclFlags::ENUM;
    let root = table.push(root);
    let mut ids = Vec::new();
    for entry in ["North", "South"] {
        let mut decl = class(&interner, entry);
        decl.flags = DeclFlags::ENUM_ENTRY;
        decl.parent = Some(root);
        ids.push(table.push(decl));
    }
    assert_eq!(table.variants_of(root), ids);
}

#[test]
fn qualified_name_includes_package() {
    let interner = StringInterner::new();
    let mut unit = CompilationUnit::new("a_test.kt");
    unit.package = vec![interner.intern("foo"), interner.intern("bar")];
    let id = unit.decls.push(class(&interner, "Point"));
    assert_eq!(unit.qualified_name(id, &interner), "foo.bar.Point");
}
