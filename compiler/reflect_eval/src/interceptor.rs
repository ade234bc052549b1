//! Interceptors the runtime provides out of the box.
//!
//! A decorator wrapper calls `D.intercept(args) { args -> original(...) }`.
//! When the unit declares `object D` with an `intercept` member that object
//! is used; otherwise the names below resolve to these builtins.

use reflect_ir::Span;
use tracing::trace;

use crate::error::EvalResult;
use crate::interpreter::Interpreter;
use crate::value::Value;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BuiltinInterceptor {
    /// Adds one to every `Int` argument before proceeding.
    Decorator,
    /// Records entry and exit in the interpreter trace.
    Logged,
    /// Memoizes results per wrapped function and argument list.
    Cached,
}

impl BuiltinInterceptor {
    pub const ALL: [BuiltinInterceptor; 3] = [
        BuiltinInterceptor::Decorator,
        BuiltinInterceptor::Logged,
        BuiltinInterceptor::Cached,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BuiltinInterceptor::Decorator => "Decorator",
            BuiltinInterceptor::Logged => "Logged",
            BuiltinInterceptor::Cached => "Cached",
        }
    }
}

impl Interpreter<'_> {
    /// `kind.intercept(args, proceed)`
    pub(crate) fn run_interceptor(
        &mut self,
        kind: BuiltinInterceptor,
        args: Value,
        proceed: Value,
        span: Span,
    ) -> EvalResult {
        let Value::List(items) = &args else {
            return Err(self.type_mismatch("List", &args, span));
        };
        match kind {
            BuiltinInterceptor::Decorator => {
                let bumped = items
                    .iter()
                    .map(|arg| match arg {
                        Value::Int(n) => Value::Int(n.wrapping_add(1)),
                        other => other.clone(),
                    })
                    .collect();
                self.call_value(&proceed, vec![Value::list(bumped)], span)
            }
            BuiltinInterceptor::Logged => {
                let shown = args.display(self.interner);
                self.record(format!("enter {shown}"));
                let result = self.call_value(&proceed, vec![args], span)?;
                let shown = result.display(self.interner);
                self.record(format!("exit {shown}"));
                Ok(result)
            }
            BuiltinInterceptor::Cached => {
                // The continuation's body identifies the wrapped function.
                let site = match &proceed {
                    Value::Closure(closure) => closure.body.index(),
                    _ => usize::MAX,
                };
                let key = (site, args.display(self.interner));
                if let Some(hit) = self.memo.get(&key).cloned() {
                    trace!(key = %key.1, "cache hit");
                    self.record(format!("cache hit {}", key.1));
                    return Ok(hit);
                }
                self.record(format!("cache miss {}", key.1));
                let result = self.call_value(&proceed, vec![args], span)?;
                self.memo.insert(key, result.clone());
                Ok(result)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for kind in BuiltinInterceptor::ALL {
            assert_eq!(BuiltinInterceptor::from_name(kind.as_str()), Some(kind));
        }
        assert_eq!(BuiltinInterceptor::from_name("Audit"), None);
    }
}
