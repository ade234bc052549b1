#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;
use reflect_diagnostic::ErrorCode;

use crate::error::SynthError;
use crate::test_support::Fixture;

fn sample(source: &str, name: &str) -> Result<String, SynthError> {
    let mut fx = Fixture::parse(source);
    let id = fx.id(name);
    let expr = fx.run(|cx| cx.generate_sample(id))?;
    Ok(fx.render_expr(expr))
}

#[test]
fn leaf_defaults() {
    let out = sample(
        "data class All(val i: Int, val l: Long, val d: Double, val b: Boolean, val c: Char, \
         val s: String, val u: Unit, val xs: List<Int>, val set: Set<String>, \
         val m: Map<String, Int>, val n: Any?)",
        "All",
    )
    .unwrap();
    assert_eq!(
        out,
        "All(i = 0, l = 0, d = 0.0, b = false, c = 'a', s = \"\", u = Unit, \
         xs = emptyList(), set = emptySet(), m = emptyMap(), n = null)"
    );
}

#[test]
fn nested_products_and_plain_parameters() {
    let out = sample(
        "data class Address(val street: String)\n\
         class Company(val name: String, val address: Address, seed: Int)\n",
        "Company",
    )
    .unwrap();
    assert_eq!(
        out,
        "Company(name = \"\", address = Address(street = \"\"), seed = 0)"
    );
}

#[test]
fn coproduct_uses_first_variant() {
    let out = sample(
        "sealed class Color\nobject Red : Color()\nobject Blue : Color()\n",
        "Color",
    )
    .unwrap();
    assert_eq!(out, "Red");
}

#[test]
fn enums_use_first_entry() {
    let out = sample("enum class Dir { NORTH, SOUTH }", "Dir").unwrap();
    assert_eq!(out, "Dir.NORTH");
}

#[test]
fn nullable_self_reference_is_fine() {
    let out = sample("data class Node(val value: Int, val next: Node?)", "Node").unwrap();
    assert_eq!(out, "Node(value = 0, next = null)");
}

#[test]
fn non_nullable_cycle_has_no_default() {
    let err = sample("data class Node(val next: Node)", "Node").unwrap_err();
    assert_eq!(err.code(), ErrorCode::E5001);
    assert_eq!(err.to_string(), "no default value for `Node` at `Node.next`");
}

#[test]
fn unknown_leaf_names_the_member_path() {
    let err = sample(
        "data class Inner(val handler: (Int) -> Int)\ndata class Outer(val inner: Inner)\n",
        "Outer",
    )
    .unwrap_err();
    assert_eq!(
        err.to_string(),
        "no default value for `(Int) -> Int` at `Outer.inner.handler`"
    );

    let err = sample("data class Holder(val value: Any)", "Holder").unwrap_err();
    assert_eq!(err.to_string(), "no default value for `Any` at `Holder.value`");
}

#[test]
fn install_sample_declares_a_property() {
    let mut fx = Fixture::parse("data class Point(val x: Int, val y: Int)");
    let id = fx.id("Point");
    let installed = fx.run(|cx| cx.install_sample(id)).unwrap();
    assert_eq!(
        fx.render(&[installed]),
        vec!["val pointSample: Point = Point(x = 0, y = 0)"]
    );
}

#[test]
fn samples_are_deterministic() {
    let source = "data class Address(val street: String, val zip: Int?)\n\
                  data class Person(val name: String, val home: Address, val tags: List<String>)\n";
    let first = sample(source, "Person").unwrap();
    let second = sample(source, "Person").unwrap();
    assert_eq!(first, second);
}
