use crate::ast::{
    BinaryOperator, ComparisonOperator, ElseBranch, Expression, Program, Property, Statement,
};
use crate::token::{Token, TokenKind};

mod error;

pub use error::{ParseError, ParseResult};

/// Recursive-descent parser with one token of lookahead.
///
/// The precedence ladder, from loosest to tightest binding:
/// comparison sits above assignment in the call graph (each comparison
/// operand is parsed as an assignment expression, so `=` binds tighter than
/// `==`), then object-literal-or-additive, additive, multiplicative,
/// call/member, primary.
pub struct Parser {
    tokens: Vec<Token>,
    cursor: usize,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|token| token.kind) != Some(TokenKind::Eof) {
            let position = tokens.last().map_or(0, |token| token.position + 1);
            tokens.push(Token::new(TokenKind::Eof, "EOF", position));
        }
        Self { tokens, cursor: 0 }
    }

    pub fn parse_program(mut self) -> ParseResult<Program> {
        let mut body = Vec::new();
        while self.not_eof() {
            body.push(self.parse_stmt()?);
        }
        Ok(Program { body })
    }

    fn parse_stmt(&mut self) -> ParseResult<Statement> {
        match self.at().kind {
            TokenKind::Var | TokenKind::Const => self.parse_var_declaration(),
            TokenKind::Fun => self.parse_function_declaration(),
            TokenKind::If => self.parse_if_statement(),
            TokenKind::While => self.parse_while_statement(),
            TokenKind::Break => {
                self.eat();
                self.expect(TokenKind::Semicolon, "Expected ';' after 'break'")?;
                Ok(Statement::Break)
            }
            _ => {
                let expr = self.parse_expr()?;
                if self.at().kind == TokenKind::Semicolon {
                    self.eat();
                }
                Ok(Statement::Expr(expr))
            }
        }
    }

    fn parse_var_declaration(&mut self) -> ParseResult<Statement> {
        let constant = self.eat().kind == TokenKind::Const;
        let identifier = self
            .expect(
                TokenKind::Identifier,
                "Expected identifier after 'var' or 'const'",
            )?
            .value;

        if self.at().kind == TokenKind::Semicolon {
            self.eat();
            if constant {
                return Err(ParseError::ConstWithoutValue { identifier });
            }
            return Ok(Statement::VarDeclare {
                identifier,
                constant: false,
                value: None,
            });
        }

        self.expect(TokenKind::Equals, "Expected '=' after identifier")?;
        let value = self.parse_expr()?;
        self.expect(TokenKind::Semicolon, "Expected ';' after variable declaration")?;
        Ok(Statement::VarDeclare {
            identifier,
            constant,
            value: Some(value),
        })
    }

    fn parse_function_declaration(&mut self) -> ParseResult<Statement> {
        self.eat(); // fun
        let name = self
            .expect(TokenKind::Identifier, "Expected function name after 'fun'")?
            .value;

        let args = self.parse_args()?;
        let mut parameters = Vec::with_capacity(args.len());
        for arg in args {
            match arg {
                Expression::Identifier(symbol) => parameters.push(symbol),
                other => {
                    return Err(ParseError::InvalidParameter {
                        found: format!("{other:?}"),
                    });
                }
            }
        }

        self.expect(TokenKind::OpenBrace, "Expected '{' before function body")?;
        let mut body = Vec::new();
        while self.not_eof() && self.at().kind != TokenKind::CloseBrace {
            body.push(self.parse_stmt()?);
        }
        self.expect(TokenKind::CloseBrace, "Expected '}' after function body")?;

        Ok(Statement::FunctionDeclaration {
            name,
            parameters,
            body,
        })
    }

    fn parse_if_statement(&mut self) -> ParseResult<Statement> {
        self.eat(); // if
        let condition = self.parse_expr()?;
        let (body, multiline) = self.parse_branch_body()?;

        let else_branch = if self.at().kind == TokenKind::Else {
            self.eat();
            let (body, multiline) = self.parse_branch_body()?;
            Some(ElseBranch { body, multiline })
        } else {
            None
        };

        Ok(Statement::If {
            condition,
            body,
            multiline,
            else_branch,
        })
    }

    fn parse_while_statement(&mut self) -> ParseResult<Statement> {
        self.eat(); // while
        let condition = self.parse_expr()?;
        let (body, multiline) = self.parse_branch_body()?;
        Ok(Statement::While {
            condition,
            body,
            multiline,
        })
    }

    /// Branch bodies come in two forms: a brace-delimited block, or a single
    /// statement that carries its own terminating `;`.
    fn parse_branch_body(&mut self) -> ParseResult<(Vec<Statement>, bool)> {
        if self.at().kind == TokenKind::OpenBrace {
            self.eat();
            let mut body = Vec::new();
            while self.not_eof() && self.at().kind != TokenKind::CloseBrace {
                body.push(self.parse_stmt()?);
            }
            self.expect(TokenKind::CloseBrace, "Expected '}' after block body")?;
            Ok((body, true))
        } else {
            Ok((vec![self.parse_stmt()?], false))
        }
    }

    fn parse_expr(&mut self) -> ParseResult<Expression> {
        self.parse_comparison_expr()
    }

    fn parse_comparison_expr(&mut self) -> ParseResult<Expression> {
        let mut left = self.parse_assignment_expr()?;
        while self.at().kind == TokenKind::ComparisonOp {
            let op = comparison_operator(&self.eat())?;
            let right = self.parse_assignment_expr()?;
            left = Expression::Comparison {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_assignment_expr(&mut self) -> ParseResult<Expression> {
        // Strings bypass the operator ladder entirely; they never take part
        // in arithmetic.
        if self.at().kind == TokenKind::String {
            return Ok(Expression::StringLiteral(self.eat().value));
        }

        let left = self.parse_object_expr()?;
        if self.at().kind == TokenKind::Equals {
            self.eat();
            let value = self.parse_assignment_expr()?;
            return Ok(Expression::Assignment {
                target: Box::new(left),
                value: Box::new(value),
            });
        }
        Ok(left)
    }

    fn parse_object_expr(&mut self) -> ParseResult<Expression> {
        if self.at().kind != TokenKind::OpenBrace {
            return self.parse_additive_expr();
        }
        self.eat();

        let mut properties = Vec::new();
        while self.not_eof() && self.at().kind != TokenKind::CloseBrace {
            let key = self
                .expect(TokenKind::Identifier, "Expected identifier key in object literal")?
                .value;

            // `{ key, ... }` and `{ key }` are shorthand for `{ key: key }`;
            // the missing value is resolved against the scope at evaluation.
            if self.at().kind == TokenKind::Comma {
                self.eat();
                properties.push(Property { key, value: None });
                continue;
            }
            if self.at().kind == TokenKind::CloseBrace {
                properties.push(Property { key, value: None });
                continue;
            }

            self.expect(TokenKind::Colon, "Expected ':' after object literal key")?;
            let value = self.parse_expr()?;
            properties.push(Property {
                key,
                value: Some(value),
            });
            if self.at().kind != TokenKind::CloseBrace {
                self.expect(TokenKind::Comma, "Expected ',' between object literal properties")?;
            }
        }

        self.expect(TokenKind::CloseBrace, "Expected '}' after object literal")?;
        Ok(Expression::Object(properties))
    }

    fn parse_additive_expr(&mut self) -> ParseResult<Expression> {
        let mut left = self.parse_multiplicative_expr()?;
        while self.at().kind == TokenKind::BinOp
            && matches!(self.at().value.as_str(), "+" | "-")
        {
            let op = binary_operator(&self.eat())?;
            let right = self.parse_multiplicative_expr()?;
            left = Expression::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_multiplicative_expr(&mut self) -> ParseResult<Expression> {
        let mut left = self.parse_call_member_expr()?;
        while self.at().kind == TokenKind::BinOp
            && matches!(self.at().value.as_str(), "*" | "/" | "%")
        {
            let op = binary_operator(&self.eat())?;
            let right = self.parse_call_member_expr()?;
            left = Expression::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_call_member_expr(&mut self) -> ParseResult<Expression> {
        let member = self.parse_member_expr()?;
        if self.at().kind == TokenKind::OpenParen {
            return self.parse_call_expr(member);
        }
        Ok(member)
    }

    fn parse_call_expr(&mut self, caller: Expression) -> ParseResult<Expression> {
        let args = self.parse_args()?;
        let call = Expression::Call {
            caller: Box::new(caller),
            args,
        };
        // A further '(' re-wraps the call as the caller: f(a)(b)(c).
        if self.at().kind == TokenKind::OpenParen {
            return self.parse_call_expr(call);
        }
        Ok(call)
    }

    fn parse_args(&mut self) -> ParseResult<Vec<Expression>> {
        self.expect(TokenKind::OpenParen, "Expected '(' before argument list")?;
        let mut args = Vec::new();
        if self.at().kind != TokenKind::CloseParen {
            args.push(self.parse_assignment_expr()?);
            while self.at().kind == TokenKind::Comma {
                self.eat();
                args.push(self.parse_assignment_expr()?);
            }
        }
        self.expect(TokenKind::CloseParen, "Expected ')' after argument list")?;
        Ok(args)
    }

    fn parse_member_expr(&mut self) -> ParseResult<Expression> {
        let mut object = self.parse_primary_expr()?;
        while self.at().kind == TokenKind::Dot {
            self.eat();
            let token = self.eat();
            if token.kind != TokenKind::Identifier {
                return Err(ParseError::InvalidMemberProperty {
                    found: token.value,
                    position: token.position,
                });
            }
            object = Expression::Member {
                object: Box::new(object),
                property: token.value,
            };
        }
        Ok(object)
    }

    fn parse_primary_expr(&mut self) -> ParseResult<Expression> {
        match self.at().kind {
            TokenKind::Identifier => Ok(Expression::Identifier(self.eat().value)),
            TokenKind::Int => {
                let token = self.eat();
                let value = token.value.parse::<i64>().map_err(|_| {
                    ParseError::UnexpectedToken {
                        found: token.value.clone(),
                        position: token.position,
                    }
                })?;
                Ok(Expression::NumericLiteral(value))
            }
            TokenKind::OpenParen => {
                self.eat();
                let value = self.parse_expr()?;
                self.expect(TokenKind::CloseParen, "Expected ')' after expression")?;
                Ok(value)
            }
            _ => {
                let token = self.at();
                Err(ParseError::UnexpectedToken {
                    found: token.value.clone(),
                    position: token.position,
                })
            }
        }
    }

    fn not_eof(&self) -> bool {
        self.at().kind != TokenKind::Eof
    }

    fn at(&self) -> &Token {
        &self.tokens[self.cursor]
    }

    fn eat(&mut self) -> Token {
        let token = self.tokens[self.cursor].clone();
        if token.kind != TokenKind::Eof {
            self.cursor += 1;
        }
        token
    }

    fn expect(&mut self, kind: TokenKind, message: &str) -> ParseResult<Token> {
        let token = self.eat();
        if token.kind != kind {
            return Err(ParseError::Expected {
                message: message.to_string(),
                found: token.value,
                position: token.position,
            });
        }
        Ok(token)
    }
}

fn binary_operator(token: &Token) -> ParseResult<BinaryOperator> {
    match token.value.as_str() {
        "+" => Ok(BinaryOperator::Add),
        "-" => Ok(BinaryOperator::Sub),
        "*" => Ok(BinaryOperator::Mul),
        "/" => Ok(BinaryOperator::Div),
        "%" => Ok(BinaryOperator::Rem),
        _ => Err(ParseError::UnexpectedToken {
            found: token.value.clone(),
            position: token.position,
        }),
    }
}

fn comparison_operator(token: &Token) -> ParseResult<ComparisonOperator> {
    match token.value.as_str() {
        "<" => Ok(ComparisonOperator::Less),
        ">" => Ok(ComparisonOperator::Greater),
        "==" => Ok(ComparisonOperator::Equal),
        ">=" => Ok(ComparisonOperator::GreaterEqual),
        "<=" => Ok(ComparisonOperator::LessEqual),
        _ => Err(ParseError::UnexpectedToken {
            found: token.value.clone(),
            position: token.position,
        }),
    }
}

pub fn parse(tokens: Vec<Token>) -> ParseResult<Program> {
    Parser::new(tokens).parse_program()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use indoc::indoc;

    fn parse_source(source: &str) -> ParseResult<Program> {
        parse(tokenize(source).expect("tokenize should succeed"))
    }

    fn ident(symbol: &str) -> Expression {
        Expression::Identifier(symbol.to_string())
    }

    fn int(value: i64) -> Expression {
        Expression::NumericLiteral(value)
    }

    fn binary(left: Expression, op: BinaryOperator, right: Expression) -> Expression {
        Expression::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    #[test]
    fn parses_variable_declarations() {
        let program = parse_source("var x = 5; const y = x; var z;").expect("parse failed");
        let expected = Program {
            body: vec![
                Statement::VarDeclare {
                    identifier: "x".to_string(),
                    constant: false,
                    value: Some(int(5)),
                },
                Statement::VarDeclare {
                    identifier: "y".to_string(),
                    constant: true,
                    value: Some(ident("x")),
                },
                Statement::VarDeclare {
                    identifier: "z".to_string(),
                    constant: false,
                    value: None,
                },
            ],
        };
        assert_eq!(program, expected);
    }

    #[test]
    fn rejects_const_without_initializer() {
        let err = parse_source("const x;").expect_err("expected parse failure");
        assert_eq!(
            err,
            ParseError::ConstWithoutValue {
                identifier: "x".to_string(),
            }
        );
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let program = parse_source("1 + 2 * 3;").expect("parse failed");
        let expected = binary(
            int(1),
            BinaryOperator::Add,
            binary(int(2), BinaryOperator::Mul, int(3)),
        );
        assert_eq!(program.body, vec![Statement::Expr(expected)]);
    }

    #[test]
    fn parentheses_override_precedence() {
        let program = parse_source("(1 + 2) * 3;").expect("parse failed");
        let expected = binary(
            binary(int(1), BinaryOperator::Add, int(2)),
            BinaryOperator::Mul,
            int(3),
        );
        assert_eq!(program.body, vec![Statement::Expr(expected)]);
    }

    #[test]
    fn assignment_binds_tighter_than_comparison() {
        // The comparison rule parses each operand as an assignment
        // expression, so `a == b = c` nests the assignment on the right.
        let program = parse_source("a == b = c;").expect("parse failed");
        let expected = Expression::Comparison {
            left: Box::new(ident("a")),
            op: ComparisonOperator::Equal,
            right: Box::new(Expression::Assignment {
                target: Box::new(ident("b")),
                value: Box::new(ident("c")),
            }),
        };
        assert_eq!(program.body, vec![Statement::Expr(expected)]);

        // And symmetrically, `a = b == c` assigns first, then compares.
        let program = parse_source("a = b == c;").expect("parse failed");
        let expected = Expression::Comparison {
            left: Box::new(Expression::Assignment {
                target: Box::new(ident("a")),
                value: Box::new(ident("b")),
            }),
            op: ComparisonOperator::Equal,
            right: Box::new(ident("c")),
        };
        assert_eq!(program.body, vec![Statement::Expr(expected)]);
    }

    #[test]
    fn assignment_is_right_associative() {
        let program = parse_source("a = b = 5;").expect("parse failed");
        let expected = Expression::Assignment {
            target: Box::new(ident("a")),
            value: Box::new(Expression::Assignment {
                target: Box::new(ident("b")),
                value: Box::new(int(5)),
            }),
        };
        assert_eq!(program.body, vec![Statement::Expr(expected)]);
    }

    #[test]
    fn marks_object_shorthand_properties() {
        let program = parse_source("{a, b: 2, c};").expect("parse failed");
        let expected = Expression::Object(vec![
            Property {
                key: "a".to_string(),
                value: None,
            },
            Property {
                key: "b".to_string(),
                value: Some(int(2)),
            },
            Property {
                key: "c".to_string(),
                value: None,
            },
        ]);
        assert_eq!(program.body, vec![Statement::Expr(expected)]);
    }

    #[test]
    fn parses_chained_member_access() {
        let program = parse_source("a.b.c;").expect("parse failed");
        let expected = Expression::Member {
            object: Box::new(Expression::Member {
                object: Box::new(ident("a")),
                property: "b".to_string(),
            }),
            property: "c".to_string(),
        };
        assert_eq!(program.body, vec![Statement::Expr(expected)]);
    }

    #[test]
    fn rejects_non_identifier_member_property() {
        let err = parse_source("a.1;").expect_err("expected parse failure");
        assert!(matches!(err, ParseError::InvalidMemberProperty { .. }));
    }

    #[test]
    fn parses_chained_calls() {
        let program = parse_source("f(1)(2);").expect("parse failed");
        let expected = Expression::Call {
            caller: Box::new(Expression::Call {
                caller: Box::new(ident("f")),
                args: vec![int(1)],
            }),
            args: vec![int(2)],
        };
        assert_eq!(program.body, vec![Statement::Expr(expected)]);
    }

    #[test]
    fn rejects_trailing_comma_in_argument_list() {
        let err = parse_source("f(1,);").expect_err("expected parse failure");
        assert!(matches!(err, ParseError::UnexpectedToken { .. }));
    }

    #[test]
    fn parses_function_declarations() {
        let input = indoc! {"
            fun add(a, b) {
                a + b;
            }
        "};
        let program = parse_source(input).expect("parse failed");
        let expected = Program {
            body: vec![Statement::FunctionDeclaration {
                name: "add".to_string(),
                parameters: vec!["a".to_string(), "b".to_string()],
                body: vec![Statement::Expr(binary(
                    ident("a"),
                    BinaryOperator::Add,
                    ident("b"),
                ))],
            }],
        };
        assert_eq!(program, expected);
    }

    #[test]
    fn rejects_non_identifier_parameters() {
        let err = parse_source("fun f(a, 1) { a; }").expect_err("expected parse failure");
        assert!(matches!(err, ParseError::InvalidParameter { .. }));
    }

    #[test]
    fn parses_if_else_with_block_bodies() {
        let input = indoc! {"
            if x < 3 {
                print(x);
            } else {
                print(0);
            }
        "};
        let program = parse_source(input).expect("parse failed");
        let Statement::If {
            multiline,
            else_branch,
            ..
        } = &program.body[0]
        else {
            panic!("expected if statement, got {:?}", program.body[0]);
        };
        assert!(*multiline);
        assert!(else_branch.as_ref().is_some_and(|branch| branch.multiline));
    }

    #[test]
    fn parses_single_statement_if_form() {
        let program = parse_source("if x == 1 print(x);").expect("parse failed");
        let Statement::If {
            body,
            multiline,
            else_branch,
            ..
        } = &program.body[0]
        else {
            panic!("expected if statement, got {:?}", program.body[0]);
        };
        assert!(!*multiline);
        assert!(else_branch.is_none());
        assert_eq!(
            body,
            &vec![Statement::Expr(Expression::Call {
                caller: Box::new(ident("print")),
                args: vec![ident("x")],
            })]
        );
    }

    #[test]
    fn parses_while_and_break() {
        let input = indoc! {"
            while i < 3 {
                break;
            }
        "};
        let program = parse_source(input).expect("parse failed");
        let expected = Program {
            body: vec![Statement::While {
                condition: Expression::Comparison {
                    left: Box::new(ident("i")),
                    op: ComparisonOperator::Less,
                    right: Box::new(int(3)),
                },
                body: vec![Statement::Break],
                multiline: true,
            }],
        };
        assert_eq!(program, expected);
    }

    #[test]
    fn parses_string_literals_in_declarations_and_arguments() {
        let program = parse_source(r#"var s = "hi"; print("a", s);"#).expect("parse failed");
        let expected = Program {
            body: vec![
                Statement::VarDeclare {
                    identifier: "s".to_string(),
                    constant: false,
                    value: Some(Expression::StringLiteral("hi".to_string())),
                },
                Statement::Expr(Expression::Call {
                    caller: Box::new(ident("print")),
                    args: vec![
                        Expression::StringLiteral("a".to_string()),
                        ident("s"),
                    ],
                }),
            ],
        };
        assert_eq!(program, expected);
    }

    #[test]
    fn reports_missing_semicolon_through_expect() {
        let err = parse_source("var x = 5").expect_err("expected parse failure");
        assert!(matches!(err, ParseError::Expected { .. }));
    }
}
