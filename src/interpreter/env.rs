use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::builtins::Builtin;

use super::error::RuntimeError;
use super::value::Value;

/// Shared handle to a scope. Children hold a strong reference to their
/// parent, so a closure's captured scope outlives the frame that created it.
pub type EnvRef = Rc<RefCell<Environment>>;

/// A lexical scope: name-to-value bindings plus a link to the enclosing
/// scope. The chain only ever points parent-ward.
#[derive(Debug, Default)]
pub struct Environment {
    parent: Option<EnvRef>,
    variables: HashMap<String, Value>,
    constants: HashSet<String>,
}

impl Environment {
    pub fn new(parent: Option<EnvRef>) -> EnvRef {
        Rc::new(RefCell::new(Self {
            parent,
            variables: HashMap::new(),
            constants: HashSet::new(),
        }))
    }

    /// Fresh global scope with the built-in bindings. Invoked once per run;
    /// there is no process-wide singleton.
    pub fn base() -> EnvRef {
        let env = Self::new(None);
        {
            let mut scope = env.borrow_mut();
            scope.insert_builtin("null", Value::Null);
            scope.insert_builtin("true", Value::Boolean(true));
            scope.insert_builtin("false", Value::Boolean(false));
            for builtin in Builtin::all() {
                scope.insert_builtin(builtin.name(), Value::Builtin(builtin));
            }
        }
        env
    }

    fn insert_builtin(&mut self, name: &str, value: Value) {
        self.variables.insert(name.to_string(), value);
        self.constants.insert(name.to_string());
    }

    /// Declares a new binding in this scope. Shadowing an outer binding is
    /// fine; redeclaring within the same scope is not.
    pub fn declare(
        &mut self,
        name: &str,
        value: Value,
        constant: bool,
    ) -> Result<(), RuntimeError> {
        if self.variables.contains_key(name) {
            return Err(RuntimeError::AlreadyDeclared {
                name: name.to_string(),
            });
        }
        self.variables.insert(name.to_string(), value);
        if constant {
            self.constants.insert(name.to_string());
        }
        Ok(())
    }

    pub fn lookup(env: &EnvRef, name: &str) -> Result<Value, RuntimeError> {
        let owner = Self::resolve(env, name)?;
        let value = owner.borrow().variables.get(name).cloned();
        value.ok_or_else(|| RuntimeError::UnresolvedIdentifier {
            name: name.to_string(),
        })
    }

    /// Overwrites an existing binding in whichever scope owns it.
    pub fn assign(env: &EnvRef, name: &str, value: Value) -> Result<Value, RuntimeError> {
        let owner = Self::resolve(env, name)?;
        let mut scope = owner.borrow_mut();
        if scope.constants.contains(name) {
            return Err(RuntimeError::ConstantReassignment {
                name: name.to_string(),
            });
        }
        scope.variables.insert(name.to_string(), value.clone());
        Ok(value)
    }

    /// Walks the scope chain to the scope owning `name`.
    fn resolve(env: &EnvRef, name: &str) -> Result<EnvRef, RuntimeError> {
        let mut current = Rc::clone(env);
        loop {
            if current.borrow().variables.contains_key(name) {
                return Ok(current);
            }
            let parent = current.borrow().parent.clone();
            match parent {
                Some(parent) => current = parent,
                None => {
                    return Err(RuntimeError::UnresolvedIdentifier {
                        name: name.to_string(),
                    });
                }
            }
        }
    }
}
