use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use std::rc::Rc;

use crate::ast::{BinaryOperator, ComparisonOperator, Expression, Program, Statement};
use crate::builtins::Builtin;

mod env;
mod error;
mod value;

pub use env::{EnvRef, Environment};
pub use error::RuntimeError;
pub use value::{Function, Value};

/// Control-flow marker for statement execution. `break` travels as a
/// returned outcome, never as an unwinding mechanism, and is consumed by the
/// nearest enclosing `while`.
enum ExecResult {
    Value(Value),
    Break,
}

/// Tree-walking evaluator with pluggable standard streams, so tests can
/// capture `print` output and feed `input` without touching process stdio.
pub struct Interpreter<'io> {
    stdout: Box<dyn Write + 'io>,
    stdin: Box<dyn BufRead + 'io>,
}

impl Interpreter<'static> {
    pub fn new() -> Self {
        Self {
            stdout: Box::new(io::stdout()),
            stdin: Box::new(io::BufReader::new(io::stdin())),
        }
    }
}

impl Default for Interpreter<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'io> Interpreter<'io> {
    pub fn with_io(stdout: impl Write + 'io, stdin: impl BufRead + 'io) -> Self {
        Self {
            stdout: Box::new(stdout),
            stdin: Box::new(stdin),
        }
    }

    /// Evaluates a program against a fresh global environment, returning the
    /// value of its last top-level statement.
    pub fn run(&mut self, program: &Program) -> Result<Value, RuntimeError> {
        let globals = Environment::base();
        match self.exec_block(&program.body, &globals)? {
            ExecResult::Value(value) => Ok(value),
            ExecResult::Break => Err(RuntimeError::BreakOutsideLoop),
        }
    }

    fn exec_block(
        &mut self,
        body: &[Statement],
        env: &EnvRef,
    ) -> Result<ExecResult, RuntimeError> {
        let mut last = Value::Null;
        for statement in body {
            match self.exec_statement(statement, env)? {
                ExecResult::Value(value) => last = value,
                ExecResult::Break => return Ok(ExecResult::Break),
            }
        }
        Ok(ExecResult::Value(last))
    }

    fn exec_statement(
        &mut self,
        statement: &Statement,
        env: &EnvRef,
    ) -> Result<ExecResult, RuntimeError> {
        match statement {
            Statement::VarDeclare {
                identifier,
                constant,
                value,
            } => {
                let value = match value {
                    Some(expr) => self.eval_expression(expr, env)?,
                    None => Value::Null,
                };
                env.borrow_mut().declare(identifier, value.clone(), *constant)?;
                Ok(ExecResult::Value(value))
            }
            Statement::FunctionDeclaration {
                name,
                parameters,
                body,
            } => {
                // The current scope is captured by reference, so the function
                // sees later declarations and mutations in that scope.
                let function = Value::Function(Rc::new(Function {
                    name: name.clone(),
                    parameters: parameters.clone(),
                    closure: Rc::clone(env),
                    body: body.clone(),
                }));
                env.borrow_mut().declare(name, function.clone(), true)?;
                Ok(ExecResult::Value(function))
            }
            Statement::If {
                condition,
                body,
                else_branch,
                ..
            } => {
                // Branch bodies run in the enclosing scope; declarations leak
                // out by design.
                if self.eval_condition(condition, env)? {
                    self.exec_block(body, env)
                } else if let Some(branch) = else_branch {
                    self.exec_block(&branch.body, env)
                } else {
                    Ok(ExecResult::Value(Value::Null))
                }
            }
            Statement::While {
                condition, body, ..
            } => {
                while self.eval_condition(condition, env)? {
                    if let ExecResult::Break = self.exec_block(body, env)? {
                        break;
                    }
                }
                Ok(ExecResult::Value(Value::Null))
            }
            Statement::Break => Ok(ExecResult::Break),
            Statement::Expr(expr) => Ok(ExecResult::Value(self.eval_expression(expr, env)?)),
        }
    }

    fn eval_condition(
        &mut self,
        condition: &Expression,
        env: &EnvRef,
    ) -> Result<bool, RuntimeError> {
        match self.eval_expression(condition, env)? {
            Value::Boolean(value) => Ok(value),
            other => Err(RuntimeError::ExpectedBooleanCondition {
                type_name: other.type_name(),
            }),
        }
    }

    fn eval_expression(
        &mut self,
        expr: &Expression,
        env: &EnvRef,
    ) -> Result<Value, RuntimeError> {
        match expr {
            Expression::NumericLiteral(value) => Ok(Value::Number(*value)),
            Expression::StringLiteral(value) => Ok(Value::String(value.clone())),
            Expression::Identifier(symbol) => Environment::lookup(env, symbol),
            Expression::Binary { left, op, right } => {
                let lhs = self.eval_expression(left, env)?;
                let rhs = self.eval_expression(right, env)?;
                eval_binary(&lhs, *op, &rhs)
            }
            Expression::Comparison { left, op, right } => {
                let lhs = self.eval_expression(left, env)?;
                let rhs = self.eval_expression(right, env)?;
                eval_comparison(&lhs, *op, &rhs)
            }
            Expression::Assignment { target, value } => {
                let Expression::Identifier(name) = target.as_ref() else {
                    return Err(RuntimeError::InvalidAssignmentTarget);
                };
                let value = self.eval_expression(value, env)?;
                Environment::assign(env, name, value)
            }
            Expression::Object(properties) => {
                let mut map = HashMap::with_capacity(properties.len());
                for property in properties {
                    let value = match &property.value {
                        Some(expr) => self.eval_expression(expr, env)?,
                        // Shorthand without a synthesized value resolves to
                        // the variable named by the key.
                        None => Environment::lookup(env, &property.key)?,
                    };
                    map.insert(property.key.clone(), value);
                }
                Ok(Value::object(map))
            }
            Expression::Member { object, property } => {
                match self.eval_expression(object, env)? {
                    Value::Object(map) => {
                        let entry = map.borrow().get(property).cloned();
                        entry.ok_or_else(|| RuntimeError::MissingProperty {
                            property: property.clone(),
                        })
                    }
                    other => Err(RuntimeError::NotAnObject {
                        property: property.clone(),
                        type_name: other.type_name(),
                    }),
                }
            }
            Expression::Call { caller, args } => {
                let callee = self.eval_expression(caller, env)?;
                let mut evaluated = Vec::with_capacity(args.len());
                for arg in args {
                    evaluated.push(self.eval_expression(arg, env)?);
                }
                self.call_value(callee, evaluated)
            }
        }
    }

    fn call_value(&mut self, callee: Value, args: Vec<Value>) -> Result<Value, RuntimeError> {
        match callee {
            Value::Builtin(builtin) => self.call_builtin(builtin, &args),
            Value::Function(function) => {
                // Parameters bind positionally. Missing arguments are a hard
                // error; excess arguments are ignored.
                if args.len() < function.parameters.len() {
                    return Err(RuntimeError::FunctionArityMismatch {
                        name: function.name.clone(),
                        expected: function.parameters.len(),
                        found: args.len(),
                    });
                }
                let scope = Environment::new(Some(Rc::clone(&function.closure)));
                for (parameter, value) in function.parameters.iter().zip(args) {
                    scope.borrow_mut().declare(parameter, value, false)?;
                }
                match self.exec_block(&function.body, &scope)? {
                    ExecResult::Value(value) => Ok(value),
                    ExecResult::Break => Err(RuntimeError::BreakOutsideLoop),
                }
            }
            other => Err(RuntimeError::NotCallable {
                type_name: other.type_name(),
            }),
        }
    }

    fn call_builtin(&mut self, builtin: Builtin, args: &[Value]) -> Result<Value, RuntimeError> {
        match builtin {
            Builtin::Print => {
                for arg in args {
                    self.write_rendered(arg)?;
                }
                Ok(Value::Null)
            }
            Builtin::Input => {
                for arg in args {
                    self.write_rendered(arg)?;
                }
                self.stdout.flush().map_err(io_error)?;
                let mut line = String::new();
                self.stdin.read_line(&mut line).map_err(io_error)?;
                if line.ends_with('\n') {
                    line.pop();
                    if line.ends_with('\r') {
                        line.pop();
                    }
                }
                Ok(Value::String(line))
            }
            Builtin::Throw => {
                let value = args.first().map_or_else(|| "null".to_string(), Value::render);
                Err(RuntimeError::UserThrown { value })
            }
        }
    }

    fn write_rendered(&mut self, value: &Value) -> Result<(), RuntimeError> {
        write!(self.stdout, "{}", value.render()).map_err(io_error)
    }
}

fn io_error(error: io::Error) -> RuntimeError {
    RuntimeError::Io {
        message: error.to_string(),
    }
}

fn eval_binary(lhs: &Value, op: BinaryOperator, rhs: &Value) -> Result<Value, RuntimeError> {
    let (Value::Number(left), Value::Number(right)) = (lhs, rhs) else {
        return Err(RuntimeError::UnsupportedOperand {
            op: op.to_string(),
            left: lhs.type_name(),
            right: rhs.type_name(),
        });
    };
    let result = match op {
        BinaryOperator::Add => left.wrapping_add(*right),
        BinaryOperator::Sub => left.wrapping_sub(*right),
        BinaryOperator::Mul => left.wrapping_mul(*right),
        BinaryOperator::Div => {
            if *right == 0 {
                return Err(RuntimeError::DivisionByZero);
            }
            left.wrapping_div(*right)
        }
        BinaryOperator::Rem => {
            if *right == 0 {
                return Err(RuntimeError::DivisionByZero);
            }
            left.wrapping_rem(*right)
        }
    };
    Ok(Value::Number(result))
}

fn eval_comparison(
    lhs: &Value,
    op: ComparisonOperator,
    rhs: &Value,
) -> Result<Value, RuntimeError> {
    let (Value::Number(left), Value::Number(right)) = (lhs, rhs) else {
        return Err(RuntimeError::UnsupportedOperand {
            op: op.to_string(),
            left: lhs.type_name(),
            right: rhs.type_name(),
        });
    };
    let result = match op {
        ComparisonOperator::Less => left < right,
        ComparisonOperator::Greater => left > right,
        ComparisonOperator::Equal => left == right,
        ComparisonOperator::GreaterEqual => left >= right,
        ComparisonOperator::LessEqual => left <= right,
    };
    Ok(Value::Boolean(result))
}
