pub mod ast;
pub mod builtins;
pub mod error;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod token;

#[cfg(test)]
mod harness;

pub use error::Error;

use interpreter::{Interpreter, Value};

/// Runs a source program against the process standard streams, returning the
/// value of its last top-level statement.
pub fn run(source: &str) -> Result<Value, Error> {
    let tokens = lexer::tokenize(source)?;
    let program = parser::parse(tokens)?;
    let mut interpreter = Interpreter::new();
    Ok(interpreter.run(&program)?)
}
