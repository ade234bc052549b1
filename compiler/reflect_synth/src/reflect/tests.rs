#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;

use crate::context::SynthConfig;
use crate::error::SynthError;
use crate::request::Request;
use crate::test_support::Fixture;

/// Synthesize for the declaration `name` as its annotations ask.
fn synth(source: &str, name: &str) -> Result<Vec<String>, SynthError> {
    synth_with(source, name, SynthConfig::default())
}

fn synth_with(source: &str, name: &str, config: SynthConfig) -> Result<Vec<String>, SynthError> {
    let mut fx = Fixture::parse(source);
    let id = fx.id(name);
    let request = Request::from_annotations(fx.unit.decls.get(id));
    let decls = fx.run_with(config, |cx| cx.synthesize(id, request))?;
    Ok(fx.render(&decls))
}

#[test]
fn point_accessors_and_descriptor() {
    let out = synth("@Reflect data class Point(val x: Int, val y: Int)", "Point").unwrap();
    assert_eq!(
        out,
        vec![
            "fun Point.getX(): Int = this.x",
            "fun Point.getY(): Int = this.y",
            r#"fun Point.product(): List<Pair<String, *>> = listOf("x" to this.x, "y" to this.y)"#,
        ]
    );
}

#[test]
fn zero_member_descriptor_is_empty() {
    let out = synth("@Product class Empty", "Empty").unwrap();
    assert_eq!(
        out,
        vec!["fun Empty.product(): List<Pair<String, *>> = listOf()"]
    );
}

#[test]
fn lenses_for_data_classes_use_copy() {
    let out = synth("@Optics data class Point(val x: Int, val y: Int)", "Point").unwrap();
    assert_eq!(
        out,
        vec![
            "val pointX: Lens<Point, Int> = Lens(get = { it: Point -> it.x }, \
             set = { it: Point, value: Int -> it.copy(x = value) })",
            "val pointY: Lens<Point, Int> = Lens(get = { it: Point -> it.y }, \
             set = { it: Point, value: Int -> it.copy(y = value) })",
        ]
    );
}

#[test]
fn lenses_for_plain_classes_use_the_constructor() {
    let out = synth("@Optics class Pos(val x: Int, val y: Int)", "Pos").unwrap();
    assert_eq!(
        out[0],
        "val posX: Lens<Pos, Int> = Lens(get = { it: Pos -> it.x }, \
         set = { it: Pos, value: Int -> Pos(x = value, y = it.y) })"
    );
}

#[test]
fn optics_need_readable_constructor_parameters() {
    let err = synth("@Optics class Config(val name: String, seed: Int)", "Config").unwrap_err();
    assert_eq!(
        err.to_string(),
        "cannot generate optics for `Config`: constructor parameter `seed` is not a property"
    );
}

#[test]
fn list_members_get_traversals_after_lenses() {
    let out = synth(
        "@Optics data class Team(val name: String, val members: List<String>)",
        "Team",
    )
    .unwrap();
    assert_eq!(out.len(), 3);
    assert!(out[0].starts_with("val teamName: Lens<Team, String>"));
    assert!(out[1].starts_with("val teamMembers: Lens<Team, List<String>>"));
    assert_eq!(
        out[2],
        "val teamMembersEach: Traversal<Team, String> = Traversal(\
         getAll = { it: Team -> it.members }, \
         modify = { it: Team, f: (String) -> String -> it.copy(members = it.members.map(f)) })"
    );
}

#[test]
fn nullable_members_get_optionals_after_lenses() {
    let out = synth(
        "@Optics data class Employee(val name: String, val company: Company?, val tags: List<String>)\n\
         data class Company(val name: String)",
        "Employee",
    )
    .unwrap();
    assert_eq!(out.len(), 5);
    assert_eq!(
        out[1],
        "val employeeCompany: Lens<Employee, Company?> = Lens(\
         get = { it: Employee -> it.company }, \
         set = { it: Employee, value: Company? -> it.copy(company = value) })"
    );
    assert_eq!(
        out[3],
        "val employeeCompanyOptional: Optional<Employee, Company> = Optional(\
         getOrNull = { it: Employee -> it.company }, \
         set = { it: Employee, value: Company -> \
         if (it.company == null) it else it.copy(company = value) })"
    );
    assert!(out[4].starts_with("val employeeTagsEach: Traversal<Employee, String>"));
}

#[test]
fn optionals_for_plain_classes_use_the_constructor() {
    let out = synth("@Optics class Slot(val id: Int, val label: String?)", "Slot").unwrap();
    assert_eq!(
        out[2],
        "val slotLabelOptional: Optional<Slot, String> = Optional(\
         getOrNull = { it: Slot -> it.label }, \
         set = { it: Slot, value: String -> \
         if (it.label == null) it else Slot(id = it.id, label = value) })"
    );
}

#[test]
fn sealed_discriminator_then_variants() {
    let out = synth(
        "@Reflect sealed class Color\nobject Red : Color()\nobject Blue : Color()\n",
        "Color",
    )
    .unwrap();
    assert_eq!(
        out,
        vec![
            "fun Color.discriminator(): String = when (this) {\n    is Red -> \"Red\"\n    is Blue -> \"Blue\"\n}",
            "fun Red.product(): List<Pair<String, *>> = listOf()",
            "fun Blue.product(): List<Pair<String, *>> = listOf()",
        ]
    );
}

#[test]
fn enum_discriminator_compares_entries() {
    let out = synth("@Reflect enum class Dir { NORTH, SOUTH }", "Dir").unwrap();
    assert_eq!(
        out,
        vec![
            "fun Dir.discriminator(): String = when (this) {\n    Dir.NORTH -> \"NORTH\"\n    Dir.SOUTH -> \"SOUTH\"\n}"
        ]
    );
}

#[test]
fn annotated_variants_are_left_to_themselves() {
    let out = synth(
        "@Reflect sealed class S\n@Reflect data class A(val a: Int) : S()\nobject B : S()\n",
        "S",
    )
    .unwrap();
    assert_eq!(out.len(), 2);
    assert!(out[0].starts_with("fun S.discriminator()"));
    assert_eq!(out[1], "fun B.product(): List<Pair<String, *>> = listOf()");
}

#[test]
fn singleton_hierarchy_describes_its_variant() {
    let out = synth(
        "@Reflect sealed class Only\ndata class Leaf(val v: Int) : Only()\n",
        "Only",
    )
    .unwrap();
    assert_eq!(
        out,
        vec![
            "fun Leaf.getV(): Int = this.v",
            r#"fun Leaf.product(): List<Pair<String, *>> = listOf("v" to this.v)"#,
        ]
    );
}

#[test]
fn existing_names_are_not_reused() {
    let out = synth(
        "@Reflect data class P(val x: Int)\nfun P.getX(): Int = 1\n",
        "P",
    )
    .unwrap();
    assert_eq!(out[0], "fun P.getX_1(): Int = this.x");
}

#[test]
fn opaque_shapes_are_unsupported() {
    let err = synth("@Reflect interface Shape", "Shape").unwrap_err();
    assert_eq!(err.code(), reflect_diagnostic::ErrorCode::E2001);
    assert_eq!(
        err.to_string(),
        "cannot generate reflection for `Shape`: \
         open, abstract and interface types have no fixed structure"
    );
}

#[test]
fn empty_requests_generate_nothing() {
    let out = synth("data class Point(val x: Int)", "Point").unwrap();
    assert!(out.is_empty());
}

#[test]
fn exhausted_names_are_fatal() {
    let config = SynthConfig {
        max_name_suffix: 0,
        ..SynthConfig::default()
    };
    let err = synth_with(
        "@Reflect data class P(val x: Int)\nfun P.getX(): Int = 1\n",
        "P",
        config,
    )
    .unwrap_err();
    assert!(err.is_fatal());
    assert_eq!(err.code(), reflect_diagnostic::ErrorCode::E4001);
}
