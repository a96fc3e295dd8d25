#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Int,
    Identifier,
    String,

    // Keywords
    Var,
    Const,
    Fun,
    If,
    Else,
    While,
    Break,

    // Operators
    Equals,       // =
    BinOp,        // + - * / %
    ComparisonOp, // < > == >= <=

    // Delimiters
    OpenParen,    // (
    CloseParen,   // )
    OpenBrace,    // {
    CloseBrace,   // }
    OpenBracket,  // [
    CloseBracket, // ]
    Semicolon,    // ;
    Comma,        // ,
    Colon,        // :
    Dot,          // .

    Eof,
}

/// Smallest lexical unit: a kind, the literal text it carries and a flat
/// character offset into the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub position: usize,
}

impl Token {
    pub fn new(kind: TokenKind, value: impl Into<String>, position: usize) -> Self {
        Self {
            kind,
            value: value.into(),
            position,
        }
    }
}
