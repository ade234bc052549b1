//! Lens laws for generated optics, checked by evaluating them.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use reflect_eval::{Interpreter, Value};
use reflect_ir::{CompilationUnit, StringInterner};
use reflectc::{PluginConfig, PluginDriver};

const SOURCE: &str = "\
@Optics
data class Person(val name: String, val age: Int)

fun getSetAge(name: String, age: Int, value: Int): Boolean =
  personAge.get(personAge.set(Person(name, age), value)) == value

fun setGetAge(name: String, age: Int): Boolean =
  personAge.set(Person(name, age), personAge.get(Person(name, age))) == Person(name, age)

fun getSetName(name: String, age: Int, value: String): Boolean =
  personName.get(personName.set(Person(name, age), value)) == value

fun setGetName(name: String, age: Int): Boolean =
  personName.set(Person(name, age), personName.get(Person(name, age))) == Person(name, age)

fun untouched(name: String, age: Int, value: Int): Boolean =
  personAge.set(Person(name, age), value).name == name
";

fn expand(interner: &StringInterner) -> CompilationUnit {
    let parsed = reflect_parse::parse("laws_test.kt", SOURCE, interner);
    assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);
    let mut unit = parsed.unit;
    let output = PluginDriver::new(interner, PluginConfig::default()).run(&mut unit);
    assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
    unit
}

fn holds(law: &str, args: Vec<Value>) -> bool {
    let interner = StringInterner::new();
    let unit = expand(&interner);
    let mut interp = Interpreter::new(&unit, &interner);
    interp.call(law, args).unwrap() == Value::Bool(true)
}

#[allow(clippy::disallowed_types, reason = "proptest macros internally use Arc")]
mod proptest_lens_laws {
    use proptest::prelude::*;

    use super::{holds, Value};

    proptest! {
        #[test]
        fn get_after_set_returns_the_new_int(name in "\\PC{0,12}", age: i32, value: i32) {
            prop_assert!(holds(
                "getSetAge",
                vec![Value::string(name), Value::Int(age.into()), Value::Int(value.into())],
            ));
        }

        #[test]
        fn setting_the_current_int_changes_nothing(name in "\\PC{0,12}", age: i32) {
            prop_assert!(holds("setGetAge", vec![Value::string(name), Value::Int(age.into())]));
        }

        #[test]
        fn get_after_set_returns_the_new_string(
            name in "\\PC{0,12}",
            age: i32,
            value in "\\PC{0,12}",
        ) {
            prop_assert!(holds(
                "getSetName",
                vec![Value::string(name), Value::Int(age.into()), Value::string(value)],
            ));
        }

        #[test]
        fn setting_the_current_string_changes_nothing(name in "\\PC{0,12}", age: i32) {
            prop_assert!(holds("setGetName", vec![Value::string(name), Value::Int(age.into())]));
        }

        #[test]
        fn setting_one_field_keeps_the_others(name in "\\PC{0,12}", age: i32, value: i32) {
            prop_assert!(holds(
                "untouched",
                vec![Value::string(name), Value::Int(age.into()), Value::Int(value.into())],
            ));
        }
    }
}
