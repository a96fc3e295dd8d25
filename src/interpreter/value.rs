use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::ast::Statement;
use crate::builtins::Builtin;

use super::env::EnvRef;

pub type ObjectRef = Rc<RefCell<HashMap<String, Value>>>;

/// Runtime values. Scalars compare by content; `Object` and `Function` are
/// the only values with identity and compare by reference.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Number(i64),
    Boolean(bool),
    String(String),
    Object(ObjectRef),
    Builtin(Builtin),
    Function(Rc<Function>),
}

/// A user-defined function paired with the environment that was active at
/// its declaration site.
pub struct Function {
    pub name: String,
    pub parameters: Vec<String>,
    pub closure: EnvRef,
    pub body: Vec<Statement>,
}

impl fmt::Debug for Function {
    // The captured environment is omitted: it routinely contains the
    // function itself under its own name.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Number(left), Value::Number(right)) => left == right,
            (Value::Boolean(left), Value::Boolean(right)) => left == right,
            (Value::String(left), Value::String(right)) => left == right,
            (Value::Object(left), Value::Object(right)) => Rc::ptr_eq(left, right),
            (Value::Builtin(left), Value::Builtin(right)) => left == right,
            (Value::Function(left), Value::Function(right)) => Rc::ptr_eq(left, right),
            _ => false,
        }
    }
}

impl Value {
    pub fn object(properties: HashMap<String, Value>) -> Self {
        Value::Object(Rc::new(RefCell::new(properties)))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Number(_) => "number",
            Value::Boolean(_) => "boolean",
            Value::String(_) => "string",
            Value::Object(_) => "object",
            Value::Builtin(_) => "native fun",
            Value::Function(_) => "fun",
        }
    }

    /// Textual form used by `print`, `input` and `throw`.
    pub fn render(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Number(value) => value.to_string(),
            Value::Boolean(value) => value.to_string(),
            Value::String(value) => value.clone(),
            Value::Object(properties) => {
                let properties = properties.borrow();
                let mut keys = properties.keys().collect::<Vec<_>>();
                keys.sort_unstable();
                let rendered = keys
                    .iter()
                    .map(|key| format!("{key}: {}", properties[key.as_str()].render()))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{{ {rendered} }}")
            }
            Value::Builtin(_) => "<native fun>".to_string(),
            Value::Function(function) => format!("<fun {}>", function.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalars_compare_by_content() {
        assert_eq!(Value::Number(4), Value::Number(4));
        assert_ne!(Value::Number(4), Value::Number(5));
        assert_eq!(Value::String("a".to_string()), Value::String("a".to_string()));
        assert_ne!(Value::Number(0), Value::Null);
    }

    #[test]
    fn objects_compare_by_identity() {
        let first = Value::object(HashMap::from([("a".to_string(), Value::Number(1))]));
        let second = Value::object(HashMap::from([("a".to_string(), Value::Number(1))]));
        assert_eq!(first, first.clone());
        assert_ne!(first, second);
    }

    #[test]
    fn renders_values_for_output() {
        assert_eq!(Value::Null.render(), "null");
        assert_eq!(Value::Number(-3).render(), "-3");
        assert_eq!(Value::Boolean(true).render(), "true");
        assert_eq!(Value::String("hi".to_string()).render(), "hi");
        assert_eq!(Value::Builtin(Builtin::Print).render(), "<native fun>");

        let object = Value::object(HashMap::from([
            ("b".to_string(), Value::Number(2)),
            ("a".to_string(), Value::Number(1)),
        ]));
        assert_eq!(object.render(), "{ a: 1, b: 2 }");
    }
}
