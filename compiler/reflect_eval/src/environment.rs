//! Lexical scopes of one function activation.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use reflect_ir::Name;

use crate::value::Value;

/// Stack of block scopes; the innermost scope is last.
///
/// A fresh environment is created per call, so lookups never see the
/// caller's locals. Lambdas start from what they captured.
#[derive(Clone, Debug)]
pub struct Environment {
    scopes: Vec<FxHashMap<Name, Value>>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            scopes: vec![FxHashMap::default()],
        }
    }

    /// Environment of a lambda body: the captured bindings, then an empty
    /// scope for its parameters.
    pub fn from_captured(captured: &FxHashMap<Name, Value>) -> Self {
        Environment {
            scopes: vec![captured.clone(), FxHashMap::default()],
        }
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    /// The outermost scope is never popped.
    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Bind in the innermost scope, shadowing outer bindings.
    pub fn define(&mut self, name: Name, value: Value) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name, value);
        }
    }

    pub fn lookup(&self, name: Name) -> Option<Value> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(&name))
            .cloned()
    }

    /// Flatten every visible binding for a closure.
    pub fn capture(&self) -> Arc<FxHashMap<Name, Value>> {
        let mut captured = FxHashMap::default();
        for scope in &self.scopes {
            captured.extend(scope.iter().map(|(name, value)| (*name, value.clone())));
        }
        Arc::new(captured)
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inner_scopes_shadow_and_unwind() {
        let x = Name::VALUE;
        let mut env = Environment::new();
        env.define(x, Value::Int(1));
        env.push_scope();
        env.define(x, Value::Int(2));
        assert_eq!(env.lookup(x), Some(Value::Int(2)));
        env.pop_scope();
        assert_eq!(env.lookup(x), Some(Value::Int(1)));
        env.pop_scope();
        assert_eq!(env.depth(), 1);
    }

    #[test]
    fn capture_keeps_the_innermost_binding() {
        let x = Name::VALUE;
        let mut env = Environment::new();
        env.define(x, Value::Int(1));
        env.push_scope();
        env.define(x, Value::Int(2));
        env.define(Name::IT, Value::Bool(true));

        let captured = env.capture();
        let lambda = Environment::from_captured(&captured);
        assert_eq!(lambda.lookup(x), Some(Value::Int(2)));
        assert_eq!(lambda.lookup(Name::IT), Some(Value::Bool(true)));
        assert_eq!(lambda.depth(), 2);
    }
}
