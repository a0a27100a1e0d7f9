use crate::primitives;
use crate::types::{Primitive, PrimitiveFunc, Value};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use thiserror::Error;

// --- Environment Error ---
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EnvError {
    #[error("Unbound name: '{0}'")]
    UnboundName(String),
    #[error("Cannot remove built-in binding '{0}'")]
    ReadOnly(String),
}

/// Shared handle to a frame. Closures and call frames hold these.
pub type EnvRef = Rc<RefCell<Environment>>;

// --- Environment Definition ---

#[derive(Debug, Default)]
pub struct Environment {
    // Shared so closures can keep their defining frame alive after the call returns.
    outer: Option<EnvRef>,
    bindings: HashMap<String, Value>,
    sealed: bool, // Set on the builtin root only
}

impl Environment {
    /// Creates a new, empty root environment.
    pub fn new() -> EnvRef {
        Rc::new(RefCell::new(Environment::default()))
    }

    /// Creates the sealed root holding the boolean aliases and the primitive table.
    pub fn new_builtins() -> EnvRef {
        let mut env = Environment::default();

        env.bind("#t", Value::Boolean(true));
        env.bind("#nil", Value::Boolean(false));

        env.add_primitive("car", primitives::prim_car);
        env.add_primitive("cdr", primitives::prim_cdr);
        env.add_primitive("+", primitives::prim_add);
        env.add_primitive("-", primitives::prim_sub);
        env.add_primitive("*", primitives::prim_mul);
        env.add_primitive("/", primitives::prim_div);
        env.add_primitive("equal?", primitives::prim_equal);

        env.sealed = true;
        Rc::new(RefCell::new(env))
    }

    /// Creates a new environment enclosed within an outer one.
    pub fn new_enclosed(outer_env: EnvRef) -> EnvRef {
        Rc::new(RefCell::new(Environment {
            outer: Some(outer_env),
            ..Environment::default()
        }))
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Binds `name` in *this* frame, replacing any binding it already holds here.
    /// Parent frames are never written.
    pub fn bind(&mut self, name: impl Into<String>, value: Value) {
        self.bindings.insert(name.into(), value);
    }

    /// Looks up a name, checking this frame first and then walking up the outer chain.
    pub fn lookup(&self, name: &str) -> Result<Value, EnvError> {
        if let Some(value) = self.bindings.get(name) {
            Ok(value.clone())
        } else {
            match &self.outer {
                Some(outer_env) => outer_env.borrow().lookup(name),
                None => Err(EnvError::UnboundName(name.to_string())),
            }
        }
    }

    /// Like `lookup`, but falls back to `default` when the name is unbound.
    pub fn get_or(&self, name: &str, default: Value) -> Value {
        self.lookup(name).unwrap_or(default)
    }

    /// Deletes `name` from the nearest frame that holds it and returns the old value.
    pub fn remove(&mut self, name: &str) -> Result<Value, EnvError> {
        if self.sealed && self.bindings.contains_key(name) {
            return Err(EnvError::ReadOnly(name.to_string()));
        }
        if let Some(value) = self.bindings.remove(name) {
            return Ok(value);
        }
        match &self.outer {
            Some(outer_env) => outer_env.borrow_mut().remove(name),
            None => Err(EnvError::UnboundName(name.to_string())),
        }
    }

    /// True if `name` is bound anywhere in the chain.
    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
            || self
                .outer
                .as_ref()
                .is_some_and(|outer_env| outer_env.borrow().contains(name))
    }

    /// Names bound in this frame only, sorted.
    pub fn local_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.bindings.keys().cloned().collect();
        names.sort();
        names
    }

    fn add_primitive(&mut self, name: &'static str, func: PrimitiveFunc) {
        self.bind(name, Value::Primitive(Primitive { name, func }));
    }
}
