use std::iter::Peekable;
use std::str::Chars;

use crate::token::{Token, TokenKind};

mod error;

pub use error::{LexError, LexResult};

/// Single-pass scanner over the source text. Positions are a flat character
/// counter advanced once per consumed character, not line/column pairs.
pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    position: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            position: 0,
        }
    }

    pub fn next_token(&mut self) -> LexResult<Token> {
        loop {
            self.skip_whitespace();
            if self.peek() != Some('/') {
                break;
            }
            let position = self.position;
            self.advance();
            match self.peek() {
                Some('/') => self.skip_line_comment(),
                Some('*') => {
                    self.advance();
                    self.skip_block_comment();
                }
                _ => return Ok(Token::new(TokenKind::BinOp, "/", position)),
            }
        }

        let position = self.position;
        let Some(ch) = self.peek() else {
            return Ok(Token::new(TokenKind::Eof, "EOF", position));
        };

        match ch {
            '"' => self.read_string(position),
            '=' => {
                self.advance();
                if self.peek() == Some('=') {
                    self.advance();
                    Ok(Token::new(TokenKind::ComparisonOp, "==", position))
                } else {
                    Ok(Token::new(TokenKind::Equals, "=", position))
                }
            }
            '>' | '<' => {
                self.advance();
                if self.peek() == Some('=') {
                    self.advance();
                    Ok(Token::new(TokenKind::ComparisonOp, format!("{ch}="), position))
                } else {
                    Ok(Token::new(TokenKind::ComparisonOp, ch.to_string(), position))
                }
            }
            '+' | '-' | '*' | '%' => {
                self.advance();
                Ok(Token::new(TokenKind::BinOp, ch.to_string(), position))
            }
            '(' => self.punctuation(TokenKind::OpenParen, "("),
            ')' => self.punctuation(TokenKind::CloseParen, ")"),
            '{' => self.punctuation(TokenKind::OpenBrace, "{"),
            '}' => self.punctuation(TokenKind::CloseBrace, "}"),
            '[' => self.punctuation(TokenKind::OpenBracket, "["),
            ']' => self.punctuation(TokenKind::CloseBracket, "]"),
            ';' => self.punctuation(TokenKind::Semicolon, ";"),
            ',' => self.punctuation(TokenKind::Comma, ","),
            ':' => self.punctuation(TokenKind::Colon, ":"),
            '.' => self.punctuation(TokenKind::Dot, "."),
            c if c.is_ascii_digit() => self.read_integer(position),
            c if c.is_alphabetic() => Ok(self.read_identifier(position)),
            character => Err(LexError::UnexpectedCharacter {
                character,
                position,
            }),
        }
    }

    fn punctuation(&mut self, kind: TokenKind, value: &str) -> LexResult<Token> {
        let position = self.position;
        self.advance();
        Ok(Token::new(kind, value, position))
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.advance() {
            if ch == '\n' {
                break;
            }
        }
    }

    fn skip_block_comment(&mut self) {
        // An unterminated block comment silently swallows the rest of the
        // input instead of failing.
        while let Some(ch) = self.advance() {
            if ch == '*' && self.peek() == Some('/') {
                self.advance();
                return;
            }
        }
    }

    fn read_string(&mut self, position: usize) -> LexResult<Token> {
        self.advance(); // opening quote
        let mut literal = String::new();
        loop {
            match self.advance() {
                None => return Err(LexError::UnterminatedString { position }),
                Some('"') => return Ok(Token::new(TokenKind::String, literal, position)),
                Some('\\') => match self.advance() {
                    None => return Err(LexError::UnterminatedString { position }),
                    Some(escaped) => literal.push(unescape(escaped)),
                },
                Some(ch) => literal.push(ch),
            }
        }
    }

    fn read_integer(&mut self, position: usize) -> LexResult<Token> {
        let mut literal = String::new();
        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                literal.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        literal
            .parse::<i64>()
            .map_err(|_| LexError::InvalidIntegerLiteral {
                literal: literal.clone(),
                position,
            })?;
        Ok(Token::new(TokenKind::Int, literal, position))
    }

    fn read_identifier(&mut self, position: usize) -> Token {
        let mut ident = String::new();
        while let Some(ch) = self.peek() {
            if ch.is_alphabetic() {
                ident.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        let kind = match ident.as_str() {
            "var" => TokenKind::Var,
            "const" => TokenKind::Const,
            "fun" => TokenKind::Fun,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "while" => TokenKind::While,
            "break" => TokenKind::Break,
            _ => TokenKind::Identifier,
        };
        Token::new(kind, ident, position)
    }

    fn advance(&mut self) -> Option<char> {
        let next = self.chars.next();
        if next.is_some() {
            self.position += 1;
        }
        next
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }
}

/// Maps the character following a backslash inside a string literal. Any
/// character without a dedicated escape yields itself.
fn unescape(ch: char) -> char {
    match ch {
        'n' => '\n',
        't' => '\t',
        'b' => '\u{0008}',
        'f' => '\u{000C}',
        'r' => '\r',
        'v' => '\u{000B}',
        'a' => '\u{0007}',
        '0' => '\0',
        other => other,
    }
}

pub fn tokenize(input: &str) -> LexResult<Vec<Token>> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let is_eof = token.kind == TokenKind::Eof;
        tokens.push(token);
        if is_eof {
            break;
        }
    }
    Ok(tokens)
}
