//! End-to-end behavior of the pass as seen from evaluated code.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;

use reflect_eval::{Interpreter, Value};
use reflect_ir::{CompilationUnit, Renderer, StringInterner};
use reflectc::{PluginConfig, PluginDriver};

fn expand(source: &str, interner: &StringInterner) -> CompilationUnit {
    let parsed = reflect_parse::parse("scenario_test.kt", source, interner);
    assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);
    let mut unit = parsed.unit;
    let output = PluginDriver::new(interner, PluginConfig::default()).run(&mut unit);
    assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
    unit
}

fn display(interp: &mut Interpreter<'_>, interner: &StringInterner, call: &str) -> String {
    interp.call(call, Vec::new()).unwrap().display(interner)
}

#[test]
fn point_gets_accessors_descriptor_and_lenses() {
    let interner = StringInterner::new();
    let unit = expand(
        "@Reflect @Optics\ndata class Point(val x: Int, val y: Int)\n\
         fun origin(): Point = Point(0, 0)\n\
         fun accessors(): List<Int> = listOf(Point(3, 4).getX(), Point(3, 4).getY())\n\
         fun descriptor(): List<Pair<String, *>> = origin().product()\n\
         fun identityX(): Boolean = pointX.set(origin(), pointX.get(origin())) == origin()\n\
         fun identityY(): Boolean = pointY.set(origin(), pointY.get(origin())) == origin()\n",
        &interner,
    );
    let mut interp = Interpreter::new(&unit, &interner);

    assert_eq!(display(&mut interp, &interner, "accessors"), "[3, 4]");
    assert_eq!(display(&mut interp, &interner, "descriptor"), "[(x, 0), (y, 0)]");
    assert_eq!(interp.call("identityX", Vec::new()).unwrap(), Value::Bool(true));
    assert_eq!(interp.call("identityY", Vec::new()).unwrap(), Value::Bool(true));
}

#[test]
fn memberless_products_describe_nothing() {
    let interner = StringInterner::new();
    let unit = expand(
        "@Product\nclass Marker\nfun describe(): List<Pair<String, *>> = Marker().product()\n",
        &interner,
    );
    let mut interp = Interpreter::new(&unit, &interner);
    assert_eq!(display(&mut interp, &interner, "describe"), "[]");
}

#[test]
fn closed_hierarchies_discriminate_and_sample_their_first_variant() {
    let interner = StringInterner::new();
    let unit = expand(
        "@Reflect @Sample\nsealed class Color\nobject Red : Color()\nobject Blue : Color()\n\
         fun names(): List<String> = listOf(Red.discriminator(), Blue.discriminator())\n",
        &interner,
    );
    let mut interp = Interpreter::new(&unit, &interner);
    assert_eq!(display(&mut interp, &interner, "names"), "[Red, Blue]");
    let sample = interp.global("colorSample").unwrap();
    assert_eq!(sample.display(&interner), "Red");
}

#[test]
fn stacked_decorators_trace_outermost_first() {
    let interner = StringInterner::new();
    let unit = expand(
        "@Logged @Cached\nfun square(n: Int): Int = n * n\n\
         fun twice(): Int = square(3) + square(3)\n",
        &interner,
    );
    let mut interp = Interpreter::new(&unit, &interner);
    assert_eq!(interp.call("twice", Vec::new()).unwrap(), Value::Int(18));
    assert_eq!(
        interp.trace(),
        [
            "enter [3]",
            "cache miss [3]",
            "exit 9",
            "enter [3]",
            "cache hit [3]",
            "exit 9",
        ]
    );
}

#[test]
fn samples_are_deterministic() {
    let source = "@Sample\ndata class Person(val name: String, val age: Int, val tags: List<String>)\n\
                  @Sample\nenum class Level { LOW, HIGH }\n";
    let render = || {
        let interner = StringInterner::new();
        let unit = expand(source, &interner);
        let renderer = Renderer::new(&interner, &unit.arena);
        unit.synthesized
            .iter()
            .map(|s| renderer.decl(&s.decl))
            .collect::<Vec<_>>()
    };

    let first = render();
    assert_eq!(
        first,
        [
            "val personSample: Person = Person(name = \"\", age = 0, tags = emptyList())",
            "val levelSample: Level = Level.LOW",
        ]
    );
    assert_eq!(first, render());
}
