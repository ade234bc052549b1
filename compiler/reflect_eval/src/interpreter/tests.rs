#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;
use reflect_ir::{CompilationUnit, DeclId, StringInterner};
use reflect_synth::{DecoratorSpec, Request, SynthConfig, SynthContext};

use super::*;
use crate::error::EvalErrorKind;

/// A parsed unit with every generator applied, the way the driver would.
struct Expanded {
    interner: StringInterner,
    unit: CompilationUnit,
}

impl Expanded {
    fn new(source: &str) -> Self {
        let interner = StringInterner::new();
        let output = reflect_parse::parse("eval_test.kt", source, &interner);
        assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
        let mut unit = output.unit;

        let ids: Vec<DeclId> = unit.decls.iter().map(|d| d.id).collect();
        for id in ids {
            let decl = unit.decls.get(id);
            let request = Request::from_annotations(decl);
            let spec = DecoratorSpec::from_decl(&unit.decls, decl);
            let is_class = decl.is_class_like();
            let mut cx = SynthContext::new(
                &unit.decls,
                &unit.synthesized,
                &mut unit.arena,
                &interner,
                SynthConfig::default(),
            );
            let mut out = Vec::new();
            if is_class && !request.is_empty() {
                out.extend(cx.synthesize(id, request).unwrap());
                if request.contains(Request::SAMPLE) {
                    out.push(cx.install_sample(id).unwrap());
                }
            }
            if let Some(spec) = spec {
                out.push(cx.rewrite_decorated(id, &spec).unwrap());
            }
            drop(cx);
            unit.insert_synthesized(out);
        }
        Expanded { interner, unit }
    }

    fn interpreter(&self) -> Interpreter<'_> {
        Interpreter::new(&self.unit, &self.interner)
    }

    fn run_box(&self) -> EvalResult<String> {
        self.interpreter().run_box()
    }
}

fn run_box(source: &str) -> String {
    Expanded::new(source).run_box().unwrap()
}

// Core language

#[test]
fn arithmetic_strings_and_conditionals() {
    assert_eq!(
        run_box("fun box(): String = if (1 + 2 * 3 == 7 && 7 % 4 == 3) \"OK\" else \"fail\""),
        "OK"
    );
    assert_eq!(run_box("fun box(): String = \"O\" + \"K\""), "OK");
    assert_eq!(run_box("fun box(): Double = 1 + 0.5"), "1.5");
}

#[test]
fn blocks_locals_and_early_return() {
    let source = "fun pick(flag: Boolean): String {\n\
                  \x20   val a = \"O\"\n\
                  \x20   if (flag) return a + \"K\"\n\
                  \x20   return \"fail\"\n\
                  }\n\
                  fun box(): String = pick(true)\n";
    assert_eq!(run_box(source), "OK");
}

#[test]
fn default_and_named_arguments() {
    let source = "fun greet(name: String, greeting: String = \"Hello\", tail: String = greeting + \"!\"): String = greeting + \" \" + name + tail\n\
                  fun box(): String = greet(greeting = \"Hi\", name = \"Ann\")\n";
    assert_eq!(run_box(source), "Hi AnnHi!");
}

#[test]
fn when_matches_values_types_and_null() {
    let source = "fun describe(x: Any?): String = when (x) {\n\
                  \x20   null -> \"null\"\n\
                  \x20   1 -> \"one\"\n\
                  \x20   is Int -> \"int\"\n\
                  \x20   is String -> \"string\"\n\
                  \x20   else -> \"other\"\n\
                  }\n\
                  fun box(): String = describe(null) + describe(1) + describe(2) + describe(\"s\") + describe(true)\n";
    assert_eq!(run_box(source), "nulloneintstringother");
}

#[test]
fn safe_calls_short_circuit_on_null() {
    let source = "fun len(s: String?): Int? = s?.length\n\
                  fun box(): String = if (len(null) == null && len(\"abc\") == 3) \"OK\" else \"fail\"\n";
    assert_eq!(run_box(source), "OK");
}

#[test]
fn lambdas_capture_and_use_it() {
    let source = "fun box(): String {\n\
                  \x20   val suffix = \"!\"\n\
                  \x20   val xs = listOf(1, 2, 3).map { it * 2 }.filter { x: Int -> x > 2 }\n\
                  \x20   return xs.joinToString(\",\") + suffix\n\
                  }\n";
    assert_eq!(run_box(source), "4,6!");
}

#[test]
fn classes_members_and_inheritance() {
    let source = "abstract class Animal {\n\
                  \x20   abstract fun sound(): String\n\
                  \x20   fun greet(): String = \"I say \" + sound()\n\
                  }\n\
                  class Dog : Animal() {\n\
                  \x20   override fun sound(): String = \"woof\"\n\
                  }\n\
                  class Counter(val start: Int) {\n\
                  \x20   val next: Int = start + 1\n\
                  \x20   fun twice(): Int = next * 2\n\
                  }\n\
                  fun box(): String = Dog().greet() + \" \" + Counter(2).twice()\n";
    assert_eq!(run_box(source), "I say woof 6");
}

#[test]
fn enum_entries_carry_constructor_arguments() {
    let source = "enum class Color(val hex: String) { RED(\"f00\"), GREEN(\"0f0\") }\n\
                  fun box(): String = Color.GREEN.hex\n";
    assert_eq!(run_box(source), "0f0");
}

#[test]
fn data_classes_copy_and_compare() {
    let source = "data class Point(val x: Int, val y: Int)\n\
                  fun box(): String {\n\
                  \x20   val p = Point(1, 2)\n\
                  \x20   val q = p.copy(y = 5)\n\
                  \x20   return if (p == Point(1, 2) && q.y == 5 && q.x == 1) q.toString() else \"fail\"\n\
                  }\n";
    assert_eq!(run_box(source), "Point(x=1, y=5)");
}

#[test]
fn enums_and_objects_are_singletons() {
    let source = "enum class Dir { NORTH, SOUTH }\n\
                  object Registry {\n\
                  \x20   val size: Int = 3\n\
                  }\n\
                  fun box(): String = if (Dir.NORTH == Dir.NORTH && Dir.NORTH != Dir.SOUTH && Registry.size == 3) \"OK\" else \"fail\"\n";
    assert_eq!(run_box(source), "OK");
}

#[test]
fn top_level_properties_are_cached() {
    let source = "val greeting: String = \"O\" + \"K\"\nfun box(): String = greeting\n";
    let expanded = Expanded::new(source);
    let mut interp = expanded.interpreter();
    assert_eq!(interp.global("greeting").unwrap(), Value::string("OK"));
    assert_eq!(interp.run_box().unwrap(), "OK");
}

#[test]
fn println_is_captured() {
    let expanded = Expanded::new("fun box(): String {\n    println(\"hi\", 1)\n    return \"OK\"\n}\n");
    let mut interp = expanded.interpreter();
    assert_eq!(interp.run_box().unwrap(), "OK");
    assert_eq!(interp.output(), ["hi 1"]);
}

// Generated declarations

#[test]
fn product_descriptor_lists_members() {
    let source = "@Product\ndata class Sample(val foo: Int, val bar: String)\n\
                  fun box(): String = if (Sample(foo = 0, bar = \"abc\").product() == listOf(\"foo\" to 0, \"bar\" to \"abc\")) \"OK\" else \"fail\"\n";
    assert_eq!(run_box(source), "OK");
}

#[test]
fn accessors_read_members() {
    let source = "@Reflect\ndata class Point(val x: Int, val y: Int)\n\
                  fun box(): String = if (Point(1, 2).getX() + Point(1, 2).getY() == 3) \"OK\" else \"fail\"\n";
    assert_eq!(run_box(source), "OK");
}

#[test]
fn lenses_get_and_set() {
    let source = "@Optics\ndata class Person(val name: String, val age: Int)\n\
                  fun box(): String {\n\
                  \x20   val p = Person(\"Ann\", 30)\n\
                  \x20   val older = personAge.set(p, 31)\n\
                  \x20   return if (personAge.get(p) == 30 && older.age == 31 && older.name == \"Ann\") \"OK\" else \"fail\"\n\
                  }\n";
    assert_eq!(run_box(source), "OK");
}

#[test]
fn lenses_rebuild_plain_classes_through_the_constructor() {
    let source = "@Optics\nclass Box(val width: Int, val height: Int)\n\
                  fun box(): String {\n\
                  \x20   val b = boxWidth.set(Box(1, 2), 7)\n\
                  \x20   return \"\" + b.width + b.height\n\
                  }\n";
    assert_eq!(run_box(source), "72");
}

#[test]
fn traversals_modify_every_element() {
    let source = "@Optics\ndata class Team(val members: List<String>)\n\
                  fun box(): String {\n\
                  \x20   val team = Team(listOf(\"a\", \"b\"))\n\
                  \x20   val loud = teamMembersEach.modify(team) { it.uppercase() }\n\
                  \x20   return loud.members.joinToString(\"\") + teamMembersEach.getAll(team).size\n\
                  }\n";
    assert_eq!(run_box(source), "AB2");
}

const NESTED: &str = "@Optics\ndata class Inner(val n: Int)\n\
                      @Optics\ndata class Middle(val inner: Inner)\n\
                      @Optics\ndata class Outer(val middle: Middle?, val label: String)\n";

#[test]
fn composed_lenses_read_and_write_through_the_path() {
    let source = format!(
        "{NESTED}fun box(): String {{\n\
         \x20   val path = middleInner.compose(innerN)\n\
         \x20   val m = path.set(Middle(Inner(1)), 5)\n\
         \x20   return \"\" + path.get(m) + path.modify(m, {{ it * 2 }}).inner.n\n\
         }}\n"
    );
    assert_eq!(run_box(&source), "510");
}

#[test]
fn optional_paths_skip_missing_links() {
    let source = format!(
        "{NESTED}fun box(): String {{\n\
         \x20   val path = outerMiddleOptional.compose(middleInner).compose(innerN)\n\
         \x20   val full = Outer(Middle(Inner(1)), \"x\")\n\
         \x20   val empty = Outer(null, \"y\")\n\
         \x20   return \"\" + path.getOrNull(full) + path.getOrNull(empty) + \n\
         \x20       path.set(full, 7).middle?.inner?.n + (path.set(empty, 7) == empty) + \n\
         \x20       path.modify(empty, {{ it + 1 }}).label\n\
         }}\n"
    );
    assert_eq!(run_box(&source), "1null7truey");
}

#[test]
fn composition_kind_follows_its_parts() {
    let source = format!(
        "{NESTED}fun box(): String {{\n\
         \x20   val viaLens = outerMiddle.compose(middleInner)\n\
         \x20   val viaOptional = outerMiddleOptional.compose(middleInner)\n\
         \x20   return \"\" + (viaLens is Lens<Outer, Inner>) + (viaOptional is Lens<Outer, Inner>) + \n\
         \x20       (viaOptional is Optional<Outer, Inner>) + viaLens.getOrNull(Outer(null, \"z\"))\n\
         }}\n"
    );
    assert_eq!(run_box(&source), "truefalsetruenull");
}

#[test]
fn composing_with_a_non_optic_fails() {
    let source = format!("{NESTED}fun box(): String = \"\" + innerN.compose(3)\n");
    let err = Expanded::new(&source).run_box().unwrap_err();
    assert!(
        matches!(err.kind, EvalErrorKind::TypeMismatch { .. }),
        "{:?}",
        err.kind
    );
}

#[test]
fn sealed_discriminators() {
    let source = "@Reflect\nsealed class Shape\n\
                  data class Circle(val r: Int) : Shape()\n\
                  object Empty : Shape()\n\
                  fun box(): String = Circle(1).discriminator() + \"/\" + Empty.discriminator()\n";
    assert_eq!(run_box(source), "Circle/Empty");
}

#[test]
fn enum_discriminators() {
    let source = "@Reflect\nenum class Dir { NORTH, SOUTH }\n\
                  fun box(): String = Dir.SOUTH.discriminator()\n";
    assert_eq!(run_box(source), "SOUTH");
}

#[test]
fn samples_build_default_instances() {
    let source = "@Sample\ndata class Point(val x: Int, val label: String, val tags: List<String>)\n\
                  fun box(): String = if (pointSample == Point(0, \"\", emptyList())) \"OK\" else \"fail\"\n";
    assert_eq!(run_box(source), "OK");
}

// Decorators

#[test]
fn decorator_increments_int_arguments() {
    let source = "@Decorator\nfun foo(value: Int): Int = value + 41\n\
                  fun box(): String = if (foo(0) == 42) \"OK\" else \"fail\"\n";
    assert_eq!(run_box(source), "OK");
}

#[test]
fn logged_records_entry_and_exit() {
    let source = "@Logged\nfun add(a: Int, b: Int): Int = a + b\n\
                  fun box(): Int = add(1, 2)\n";
    let expanded = Expanded::new(source);
    let mut interp = expanded.interpreter();
    assert_eq!(interp.run_box().unwrap(), "3");
    assert_eq!(interp.trace(), ["enter [1, 2]", "exit 3"]);
}

#[test]
fn cached_memoizes_per_argument_list() {
    let source = "@Cached\nfun square(n: Int): Int = n * n\n\
                  fun box(): Int = square(3) + square(3) + square(4)\n";
    let expanded = Expanded::new(source);
    let mut interp = expanded.interpreter();
    assert_eq!(interp.run_box().unwrap(), "34");
    assert_eq!(
        interp.trace(),
        ["cache miss [3]", "cache hit [3]", "cache miss [4]"]
    );
}

#[test]
fn indexing_hand_built_lenses_and_cache_hits() {
    let source = "data class Cell(val v: Int)\n\
                  val cellV: Lens<Cell, Int> = Lens(get = { it: Cell -> it.v }, set = { it: Cell, value: Int -> it.copy(v = value) })\n\
                  @Cached\nfun pick(i: Int): Int = listOf(10, 20, 30)[i] + (mapOf(\"a\" to 1)[\"a\"] as Int)\n\
                  fun box(): Int = cellV.get(cellV.set(Cell(0), pick(1))) + pick(1) + \"xy\"[1].toString().length\n";
    let expanded = Expanded::new(source);
    let mut interp = expanded.interpreter();
    assert_eq!(interp.run_box().unwrap(), "43");
    assert_eq!(interp.trace(), ["cache miss [1]", "cache hit [1]"]);
}

#[test]
fn ordinary_annotations_leave_functions_alone() {
    let source = "@Suppress(\"unused\")\nfun one(): Int = 1\n\
                  fun box(): String = if (one() == 1) \"OK\" else \"fail\"\n";
    let expanded = Expanded::new(source);
    assert!(expanded.unit.synthesized.is_empty());
    assert_eq!(expanded.run_box().unwrap(), "OK");
}

#[test]
fn stacked_decorators_run_outermost_first() {
    let source = "@Logged @Decorator\nfun id(n: Int): Int = n\n\
                  fun box(): Int = id(1)\n";
    let expanded = Expanded::new(source);
    let mut interp = expanded.interpreter();
    assert_eq!(interp.run_box().unwrap(), "2");
    assert_eq!(interp.trace(), ["enter [1]", "exit 2"]);
}

#[test]
fn user_interceptors_take_priority() {
    let source = "object Twice {\n\
                  \x20   fun intercept(args: List<Any?>, f: (List<Any?>) -> Any?): Any? = f(args) as Int * 2\n\
                  }\n\
                  @Twice\nfun five(): Int = 5\n\
                  fun box(): Int = five()\n";
    assert_eq!(run_box(source), "10");
}

#[test]
fn renamed_wrappers_leave_the_original_name_routed() {
    let source = "@Decorator(rename = \"bumped\")\nfun add(a: Int, b: Int): Int = a + b\n\
                  fun box(): String = \"\" + add(1, 1) + bumped(1, 1)\n";
    assert_eq!(run_box(source), "44");
}

#[test]
fn recursion_goes_through_the_wrapper() {
    let source = "@Cached\nfun fib(n: Int): Int = if (n < 2) n else fib(n - 1) + fib(n - 2)\n\
                  fun box(): Int = fib(20)\n";
    let expanded = Expanded::new(source);
    let mut interp = expanded.interpreter();
    assert_eq!(interp.run_box().unwrap(), "6765");
    assert_eq!(
        interp.trace().iter().filter(|e| e.starts_with("cache miss")).count(),
        21
    );
}

// Failures

#[test]
fn errors_carry_a_backtrace() {
    let expanded = Expanded::new(
        "fun half(n: Int): Int = n / 0\nfun box(): String = \"\" + half(2)\n",
    );
    let err = expanded.run_box().unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::DivisionByZero);
    assert_eq!(err.backtrace, ["half", "box"]);
}

#[test]
fn failed_casts() {
    let expanded =
        Expanded::new("fun f(x: Any): Int = x as Int\nfun box(): String = \"\" + f(\"s\")\n");
    let err = expanded.run_box().unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::CastFailed {
            ty: "Int".to_owned(),
            found: "String".to_owned(),
        }
    );
}

#[test]
fn runaway_recursion_is_reported() {
    let expanded =
        Expanded::new("fun spin(n: Int): Int = spin(n + 1)\nfun box(): Int = spin(0)\n");
    let err = expanded
        .interpreter()
        .with_max_depth(64)
        .run_box()
        .unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::StackOverflow { limit: 64 });
}

#[test]
fn missing_entry_point() {
    let err = Expanded::new("fun main(): Int = 0\n").run_box().unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::NoEntryPoint);
}

#[test]
fn unresolved_names_and_arguments() {
    let err = Expanded::new("fun box(): Int = nope\n").run_box().unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::UndefinedVariable {
            name: "nope".to_owned()
        }
    );

    let err = Expanded::new("fun f(a: Int): Int = a\nfun box(): Int = f()\n")
        .run_box()
        .unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::MissingArgument {
            callee: "f".to_owned(),
            param: "a".to_owned(),
        }
    );
}

#[allow(clippy::disallowed_types, reason = "proptest macros internally use Arc")]
mod proptest_arithmetic {
    use proptest::prelude::*;

    use super::*;

    proptest! {
        #[test]
        fn int_arithmetic_wraps(a in any::<i64>(), b in any::<i64>()) {
            let expanded = Expanded::new("fun f(a: Int, b: Int): Int = a + b * 2 - a % 7\n");
            let mut interp = expanded.interpreter();
            let result = interp.call("f", vec![Value::Int(a), Value::Int(b)]).unwrap();
            let expected = a.wrapping_add(b.wrapping_mul(2)).wrapping_sub(a.wrapping_rem(7));
            prop_assert_eq!(result, Value::Int(expected));
        }
    }
}
