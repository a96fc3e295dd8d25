use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("{message}, got '{found}' at position {position}")]
    Expected {
        message: String,
        found: String,
        position: usize,
    },
    #[error("Unexpected token '{found}' at position {position}")]
    UnexpectedToken { found: String, position: usize },
    #[error("Expected params to be an identifier, got '{found}'")]
    InvalidParameter { found: String },
    #[error("Member access requires an identifier, got '{found}' at position {position}")]
    InvalidMemberProperty { found: String, position: usize },
    #[error("Constant declaration of '{identifier}' requires a value")]
    ConstWithoutValue { identifier: String },
}

pub type ParseResult<T> = Result<T, ParseError>;
