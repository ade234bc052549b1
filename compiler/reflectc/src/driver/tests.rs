#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;
use reflect_ir::{CompilationUnit, Renderer, StringInterner, SynthOrigin};
use reflect_synth::DecoratorOrder;

use super::*;

fn parse(source: &str, interner: &StringInterner) -> CompilationUnit {
    let output = reflect_parse::parse("driver_test.kt", source, interner);
    assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
    output.unit
}

fn names(output: &PassOutput, interner: &StringInterner) -> Vec<&'static str> {
    output
        .synthesized
        .iter()
        .map(|s| interner.lookup(s.name()))
        .collect()
}

fn codes(output: &PassOutput) -> Vec<ErrorCode> {
    output.diagnostics.iter().map(|d| d.code).collect()
}

#[test]
fn every_requested_generator_runs_in_source_order() {
    let interner = StringInterner::new();
    let mut unit = parse(
        "@Reflect @Optics @Sample\ndata class Point(val x: Int, val y: Int)\n\
         @Decorator\nfun foo(value: Int): Int = value + 41\n",
        &interner,
    );
    let output = PluginDriver::new(&interner, PluginConfig::default()).run(&mut unit);

    assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
    assert!(!output.aborted);
    assert_eq!(
        names(&output, &interner),
        ["getX", "getY", "product", "pointX", "pointY", "pointSample", "fooDecorated"]
    );
    let origins: Vec<SynthOrigin> = output.synthesized.iter().map(|s| s.origin).collect();
    assert_eq!(
        origins,
        [
            SynthOrigin::Reflection,
            SynthOrigin::Reflection,
            SynthOrigin::Reflection,
            SynthOrigin::Optics,
            SynthOrigin::Optics,
            SynthOrigin::Sample,
            SynthOrigin::Decorator,
        ]
    );
    assert_eq!(unit.synthesized, output.synthesized);
}

#[test]
fn unannotated_units_are_left_alone() {
    let interner = StringInterner::new();
    let mut unit = parse(
        "data class Point(val x: Int)\nfun box(): String = \"OK\"\n",
        &interner,
    );
    let before = unit.arena.len();
    let output = PluginDriver::new(&interner, PluginConfig::default()).run(&mut unit);
    assert!(output.synthesized.is_empty());
    assert!(output.has_errors().is_none());
    assert_eq!(unit.arena.len(), before);
}

#[test]
fn failed_declarations_are_rolled_back_and_the_pass_continues() {
    let interner = StringInterner::new();
    let mut unit = parse(
        "@Reflect\ninterface Shape\n\
         @Sample\ndata class Holder(val name: String, val value: Any)\n\
         @Product\ndata class P(val x: Int)\n",
        &interner,
    );
    let output = PluginDriver::new(&interner, PluginConfig::default()).run(&mut unit);

    assert_eq!(codes(&output), [ErrorCode::E2001, ErrorCode::E5001]);
    assert!(output.has_errors().is_some());
    assert!(!output.aborted);
    assert_eq!(names(&output, &interner), ["product"]);

    // Only P's descriptor survives in the arena.
    let mut alone = parse("@Product\ndata class P(val x: Int)\n", &interner);
    let before = alone.arena.len();
    PluginDriver::new(&interner, PluginConfig::default()).run(&mut alone);
    let per_product = alone.arena.len() - before;

    let mut failing = parse(
        "@Reflect\ninterface Shape\n\
         @Sample\ndata class Holder(val name: String, val value: Any)\n\
         @Product\ndata class P(val x: Int)\n",
        &interner,
    );
    let parsed = failing.arena.len();
    PluginDriver::new(&interner, PluginConfig::default()).run(&mut failing);
    assert_eq!(failing.arena.len() - parsed, per_product);
}

#[test]
fn naming_exhaustion_aborts_the_whole_pass() {
    let interner = StringInterner::new();
    let mut unit = parse(
        "@Product\ndata class Q(val a: Int)\n\
         @Reflect\ndata class P(val x: Int)\n\
         fun P.getX(): Int = 1\n",
        &interner,
    );
    let before = unit.arena.len();
    let config = PluginConfig {
        max_name_suffix: 0,
        ..PluginConfig::default()
    };
    let output = PluginDriver::new(&interner, config).run(&mut unit);

    assert!(output.aborted);
    assert!(output.synthesized.is_empty());
    assert!(unit.synthesized.is_empty());
    assert_eq!(unit.arena.len(), before);
    assert_eq!(codes(&output), [ErrorCode::E4001]);
}

#[test]
fn the_same_collision_is_fine_with_suffixes() {
    let interner = StringInterner::new();
    let mut unit = parse(
        "@Reflect\ndata class P(val x: Int)\nfun P.getX(): Int = 1\n",
        &interner,
    );
    let output = PluginDriver::new(&interner, PluginConfig::default()).run(&mut unit);
    assert_eq!(names(&output, &interner), ["getX_1", "product"]);
}

#[test]
fn cancellation_aborts_before_the_next_declaration() {
    let interner = StringInterner::new();
    let mut unit = parse("@Reflect\ndata class P(val x: Int)\n", &interner);
    let control = PassControl::new();
    control.cancel();

    let output = PluginDriver::new(&interner, PluginConfig::default())
        .with_control(control.clone())
        .run(&mut unit);

    assert!(control.is_cancelled());
    assert!(output.aborted);
    assert!(unit.synthesized.is_empty());
    assert_eq!(codes(&output), [ErrorCode::E9001]);
}

#[test]
fn decorator_order_follows_the_config() {
    let interner = StringInterner::new();
    let source = "@Logged @Cached\nfun f(): Int = 1\n";

    let mut unit = parse(source, &interner);
    let output = PluginDriver::new(&interner, PluginConfig::default()).run(&mut unit);
    let rendered = Renderer::new(&interner, &unit.arena).decl(&output.synthesized[0].decl);
    assert_eq!(
        rendered,
        "fun fDecorated() = Logged.intercept(listOf()) { args: List<Any?> -> \
         Cached.intercept(args) { args: List<Any?> -> f() } }"
    );

    let mut unit = parse(source, &interner);
    let config = PluginConfig {
        decorator_order: DecoratorOrder::LastOutermost,
        ..PluginConfig::default()
    };
    let output = PluginDriver::new(&interner, config).run(&mut unit);
    let rendered = Renderer::new(&interner, &unit.arena).decl(&output.synthesized[0].decl);
    assert!(
        rendered.starts_with("fun fDecorated() = Cached.intercept(listOf())"),
        "{rendered}"
    );
}

#[test]
fn decorator_conflicts_do_not_block_other_functions() {
    let interner = StringInterner::new();
    let mut unit = parse(
        "object A {\n    fun intercept(args: List<Any?>, f: (List<Any?>) -> Any?): Any? = f(args)\n}\n\
         object B {\n    fun intercept(args: List<Any?>, f: (List<Any?>) -> Any?): Any? = f(args)\n}\n\
         @A(rename = \"x\") @B(rename = \"y\")\nfun f(): Int = 1\n\
         @Logged\nfun g(): Int = 2\n",
        &interner,
    );
    let output = PluginDriver::new(&interner, PluginConfig::default()).run(&mut unit);
    assert_eq!(codes(&output), [ErrorCode::E3001]);
    assert_eq!(names(&output, &interner), ["gDecorated"]);
    assert_eq!(output.synthesized[0].intercepts, Some(interner.intern("g")));
}

#[test]
fn a_second_pass_sees_the_first_passes_output() {
    let interner = StringInterner::new();
    let mut unit = parse("@Reflect\ndata class P(val x: Int)\n", &interner);
    let driver = PluginDriver::new(&interner, PluginConfig::default());
    let first = driver.run(&mut unit);
    let second = driver.run(&mut unit);
    assert_eq!(names(&first, &interner), ["getX", "product"]);
    assert_eq!(names(&second, &interner), ["getX_1", "product_1"]);
    assert_eq!(unit.synthesized.len(), 4);
}

#[test]
fn units_run_in_parallel_with_independent_naming() {
    let interner = StringInterner::new();
    let mut units: Vec<CompilationUnit> = (0..8)
        .map(|_| parse("@Reflect\ndata class P(val x: Int)\n", &interner))
        .collect();
    let outputs =
        PluginDriver::new(&interner, PluginConfig::default()).run_units(&mut units);

    assert_eq!(outputs.len(), 8);
    for (unit, output) in units.iter().zip(&outputs) {
        assert_eq!(names(output, &interner), ["getX", "product"]);
        assert_eq!(unit.synthesized.len(), 2);
    }
}
