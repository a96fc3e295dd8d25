use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub body: Vec<Statement>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mul => "*",
            BinaryOperator::Div => "/",
            BinaryOperator::Rem => "%",
        };
        f.write_str(symbol)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOperator {
    Less,
    Greater,
    Equal,
    GreaterEqual,
    LessEqual,
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            ComparisonOperator::Less => "<",
            ComparisonOperator::Greater => ">",
            ComparisonOperator::Equal => "==",
            ComparisonOperator::GreaterEqual => ">=",
            ComparisonOperator::LessEqual => "<=",
        };
        f.write_str(symbol)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    VarDeclare {
        identifier: String,
        constant: bool,
        value: Option<Expression>,
    },
    FunctionDeclaration {
        name: String,
        parameters: Vec<String>,
        body: Vec<Statement>,
    },
    If {
        condition: Expression,
        body: Vec<Statement>,
        multiline: bool,
        else_branch: Option<ElseBranch>,
    },
    While {
        condition: Expression,
        body: Vec<Statement>,
        multiline: bool,
    },
    Break,
    Expr(Expression),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElseBranch {
    pub body: Vec<Statement>,
    pub multiline: bool,
}

/// One entry of an object literal. A missing value marks the shorthand form
/// `{ key }`, which resolves to the variable named `key` at evaluation time.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub key: String,
    pub value: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    NumericLiteral(i64),
    StringLiteral(String),
    Identifier(String),
    Binary {
        left: Box<Expression>,
        op: BinaryOperator,
        right: Box<Expression>,
    },
    Comparison {
        left: Box<Expression>,
        op: ComparisonOperator,
        right: Box<Expression>,
    },
    Assignment {
        target: Box<Expression>,
        value: Box<Expression>,
    },
    Object(Vec<Property>),
    Member {
        object: Box<Expression>,
        property: String,
    },
    Call {
        caller: Box<Expression>,
        args: Vec<Expression>,
    },
}
