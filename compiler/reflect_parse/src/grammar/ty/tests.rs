#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;
use reflect_ir::{Name, Renderer, StringInterner, TypeRef};

use crate::parse;

/// Declared type of the single property in `val p: <ty>`.
fn property_type(ty: &str) -> (TypeRef, String) {
    let interner = StringInterner::new();
    let output = parse("ty_test.kt", &format!("val p: {ty}\n"), &interner);
    assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
    let decl = output.unit.decls.iter().next().unwrap();
    let ty = decl.ret.clone().unwrap();
    let rendered = Renderer::new(&interner, &output.unit.arena).ty(&ty);
    (ty, rendered)
}

#[test]
fn generic_and_nullable() {
    let (ty, rendered) = property_type("Map<String, List<Int>>?");
    assert!(ty.is_nullable());
    assert_eq!(ty.head(), Some(Name::MAP));
    assert_eq!(rendered, "Map<String, List<Int>>?");
}

#[test]
fn qualified_heads_keep_last_segment() {
    let (ty, _) = property_type("kotlin.collections.List<Int>");
    assert_eq!(ty.head(), Some(Name::LIST));
}

#[test]
fn function_types() {
    let (ty, rendered) = property_type("((Int, String) -> Unit)?");
    assert!(matches!(ty.non_null(), TypeRef::Function { params, .. } if params.len() == 2));
    assert_eq!(rendered, "((Int, String) -> Unit)?");
}

#[test]
fn star_and_variance() {
    let (_, rendered) = property_type("Pair<out String, *>");
    assert_eq!(rendered, "Pair<String, *>");
}
