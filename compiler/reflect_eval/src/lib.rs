//! Evaluator for expanded compilation units.
//!
//! Runs a unit after the plugin's passes the way the compiled program would
//! run: user code and synthesized declarations side by side, with call
//! sites of decorated functions routed through their wrappers. The test
//! harness uses it to execute a fixture's `box()` entry point.

mod environment;
mod error;
mod interceptor;
mod interpreter;
mod value;

pub use environment::Environment;
pub use error::{EvalError, EvalErrorKind, EvalResult};
pub use interceptor::BuiltinInterceptor;
pub use interpreter::{Arg, FnRef, Interpreter, DEFAULT_MAX_CALL_DEPTH};
pub use value::{Closure, ComposedOptic, ObjectValue, RecordValue, Value};

use reflect_ir::{CompilationUnit, StringInterner};

/// Run `box()` of `unit` and render what it returns.
pub fn run_box(unit: &CompilationUnit, interner: &StringInterner) -> EvalResult<String> {
    Interpreter::new(unit, interner).run_box()
}
