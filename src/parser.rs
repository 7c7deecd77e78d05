use std::rc::Rc;

use thiserror::Error;

use crate::Span;
use crate::ast::{
    AssignOperator, Block, Expression, FunctionLiteral, InfixOperator, LetStatement,
    PrefixOperator, Program, Statement,
};
use crate::lexer::{Lexer, Token, TokenKind};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("expected next token to be {expected}, got `{}` instead", .found.kind)]
    UnexpectedToken { expected: String, found: Token },
    #[error("expected {expected} before end of input")]
    UnexpectedEof { expected: String, span: Span },
    #[error("no prefix parse function for `{}` found", .0.kind)]
    NoPrefixParseFn(Token),
    #[error("illegal token `{}`", .0.literal)]
    IllegalToken(Token),
    #[error("could not parse `{}` as integer", .0.literal)]
    InvalidInteger(Token),
}

impl ParseError {
    /// Location of the offending token.
    pub fn span(&self) -> Span {
        match self {
            ParseError::UnexpectedToken { found, .. } => found.span,
            ParseError::UnexpectedEof { span, .. } => *span,
            ParseError::NoPrefixParseFn(token)
            | ParseError::IllegalToken(token)
            | ParseError::InvalidInteger(token) => token.span,
        }
    }
}

/// Binding power of infix tokens, weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Lowest,
    Equals,      // =*= !*= =&= !&= & |
    LessGreater, // < > <= >=
    Sum,         // + -
    Product,     // * /
    Prefix,      // -x !x
    Call,        // f(x)
    Index,       // a[i]
    Dot,         // h.k
}

impl Precedence {
    fn of(kind: TokenKind) -> Self {
        match kind {
            TokenKind::ValueEq
            | TokenKind::ValueNotEq
            | TokenKind::IdentityEq
            | TokenKind::IdentityNotEq
            | TokenKind::And
            | TokenKind::Or => Precedence::Equals,
            TokenKind::Lt | TokenKind::Gt | TokenKind::LtEq | TokenKind::GtEq => {
                Precedence::LessGreater
            }
            TokenKind::Plus | TokenKind::Minus => Precedence::Sum,
            TokenKind::Asterisk | TokenKind::Slash => Precedence::Product,
            TokenKind::LParen => Precedence::Call,
            TokenKind::LBracket => Precedence::Index,
            TokenKind::Dot => Precedence::Dot,
            _ => Precedence::Lowest,
        }
    }
}

pub struct Parser<'src> {
    lexer: Lexer<'src>,
    current: Token,
    peek: Token,
    errors: Vec<ParseError>,
}

impl<'src> Parser<'src> {
    pub fn new(mut lexer: Lexer<'src>) -> Self {
        // Read two tokens so `current` and `peek` are both set
        let current = lexer.next_token();
        let peek = lexer.next_token();
        Parser {
            lexer,
            current,
            peek,
            errors: Vec::new(),
        }
    }

    /// Every error recorded so far, in source order.
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<ParseError> {
        self.errors
    }

    /// Parses statements until end of input. Errors are collected rather than
    /// returned, so the program may be partial.
    pub fn parse_program(&mut self) -> Program {
        let mut program = Program::default();
        while !self.current_is(TokenKind::Eof) {
            if let Some(statement) = self.parse_statement() {
                program.statements.push(statement);
            }
            self.next_token();
        }
        program
    }

    // --- Token navigation ---

    fn next_token(&mut self) {
        let next = self.lexer.next_token();
        self.current = std::mem::replace(&mut self.peek, next);
    }

    fn current_is(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    fn peek_is(&self, kind: TokenKind) -> bool {
        self.peek.kind == kind
    }

    /// Advances only when the lookahead is `kind`; records an error otherwise.
    fn expect_peek(&mut self, kind: TokenKind) -> bool {
        if self.peek_is(kind) {
            self.next_token();
            true
        } else {
            self.peek_error(format!("`{}`", kind));
            false
        }
    }

    fn peek_error(&mut self, expected: String) {
        let found = self.peek.clone();
        self.record(ParseError::UnexpectedToken { expected, found });
    }

    fn record(&mut self, error: ParseError) {
        tracing::trace!(%error, span = %error.span(), "parse error");
        self.errors.push(error);
    }

    fn skip_to_semicolon(&mut self) {
        while !self.current_is(TokenKind::Semicolon) && !self.current_is(TokenKind::Eof) {
            self.next_token();
        }
    }

    // --- Statements ---

    fn parse_statement(&mut self) -> Option<Statement> {
        match self.current.kind {
            TokenKind::Let => self.parse_let_statement(true),
            TokenKind::Ident if AssignOperator::from_token(self.peek.kind).is_some() => {
                self.parse_let_statement(false)
            }
            TokenKind::Return => self.parse_return_statement(),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_let_statement(&mut self, declared: bool) -> Option<Statement> {
        let statement = self.parse_let_parts(declared);
        if statement.is_none() {
            self.skip_to_semicolon();
        }
        statement
    }

    fn parse_let_parts(&mut self, declared: bool) -> Option<Statement> {
        if declared && !self.expect_peek(TokenKind::Ident) {
            return None;
        }
        let name = self.current.literal.clone();

        let Some(operator) = AssignOperator::from_token(self.peek.kind) else {
            self.peek_error("an assignment operator (`=`, `=&` or `=*`)".to_string());
            return None;
        };
        self.next_token();
        self.next_token();

        let value = self.parse_expression(Precedence::Lowest)?;
        if !self.expect_peek(TokenKind::Semicolon) {
            return None;
        }

        Some(Statement::Let(LetStatement {
            declared,
            name,
            operator,
            value,
        }))
    }

    fn parse_return_statement(&mut self) -> Option<Statement> {
        self.next_token();
        let value = self.parse_expression(Precedence::Lowest)?;

        if self.peek_is(TokenKind::Semicolon) {
            self.next_token();
        } else if !self.peek_is(TokenKind::RBrace) && !self.peek_is(TokenKind::Eof) {
            self.peek_error(format!("`{}`", TokenKind::Semicolon));
            return None;
        }
        Some(Statement::Return(value))
    }

    fn parse_expression_statement(&mut self) -> Option<Statement> {
        let expression = self.parse_expression(Precedence::Lowest)?;
        if self.peek_is(TokenKind::Semicolon) {
            self.next_token();
        }
        Some(Statement::Expression(expression))
    }

    /// Parses `{ statement* }`; `current` must be the opening brace.
    fn parse_block(&mut self) -> Block {
        let mut block = Block::default();
        self.next_token();

        while !self.current_is(TokenKind::RBrace) {
            if self.current_is(TokenKind::Eof) {
                let span = self.current.span;
                self.record(ParseError::UnexpectedEof {
                    expected: format!("`{}`", TokenKind::RBrace),
                    span,
                });
                break;
            }
            if let Some(statement) = self.parse_statement() {
                block.statements.push(statement);
            }
            self.next_token();
        }
        block
    }

    // --- Expressions ---

    fn parse_expression(&mut self, precedence: Precedence) -> Option<Expression> {
        let mut left = self.parse_prefix()?;

        while !self.peek_is(TokenKind::Semicolon) && precedence < Precedence::of(self.peek.kind) {
            self.next_token();
            left = self.parse_infix(left)?;
        }
        Some(left)
    }

    fn parse_prefix(&mut self) -> Option<Expression> {
        match self.current.kind {
            TokenKind::Ident => Some(Expression::Identifier(self.current.literal.clone())),
            TokenKind::Int => self.parse_integer_literal(),
            TokenKind::Str => Some(Expression::Str(self.current.literal.clone())),
            TokenKind::True | TokenKind::False => {
                Some(Expression::Boolean(self.current_is(TokenKind::True)))
            }
            TokenKind::LParen => self.parse_grouped_expression(),
            TokenKind::LBracket => self.parse_array_literal(),
            TokenKind::LBrace => self.parse_hash_literal(),
            TokenKind::Bang | TokenKind::Minus => self.parse_prefix_expression(),
            TokenKind::If => self.parse_if_expression(),
            TokenKind::While => self.parse_while_expression(),
            TokenKind::Function => self.parse_function_literal(),
            TokenKind::Illegal => {
                self.record(ParseError::IllegalToken(self.current.clone()));
                None
            }
            _ => {
                self.record(ParseError::NoPrefixParseFn(self.current.clone()));
                None
            }
        }
    }

    fn parse_infix(&mut self, left: Expression) -> Option<Expression> {
        match self.current.kind {
            TokenKind::LParen => self.parse_call_expression(left),
            TokenKind::LBracket => self.parse_index_expression(left),
            TokenKind::Dot => self.parse_dot_expression(left),
            kind => match InfixOperator::from_token(kind) {
                Some(operator) => self.parse_infix_expression(operator, left),
                // Precedence::of only ranks the tokens handled above
                None => Some(left),
            },
        }
    }

    fn parse_integer_literal(&mut self) -> Option<Expression> {
        match self.current.literal.parse::<i64>() {
            Ok(value) => Some(Expression::Integer(value)),
            Err(_) => {
                self.record(ParseError::InvalidInteger(self.current.clone()));
                None
            }
        }
    }

    fn parse_prefix_expression(&mut self) -> Option<Expression> {
        let operator = PrefixOperator::from_token(self.current.kind)?;
        self.next_token();
        let right = self.parse_expression(Precedence::Prefix)?;
        Some(Expression::Prefix {
            operator,
            right: Box::new(right),
        })
    }

    fn parse_infix_expression(
        &mut self,
        operator: InfixOperator,
        left: Expression,
    ) -> Option<Expression> {
        let precedence = Precedence::of(self.current.kind);
        self.next_token();
        let right = self.parse_expression(precedence)?;
        Some(Expression::Infix {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    fn parse_grouped_expression(&mut self) -> Option<Expression> {
        self.next_token();
        let expression = self.parse_expression(Precedence::Lowest)?;
        if !self.expect_peek(TokenKind::RParen) {
            return None;
        }
        Some(expression)
    }

    /// `( condition )` as used by `if` and `while`.
    fn parse_condition(&mut self) -> Option<Expression> {
        if !self.expect_peek(TokenKind::LParen) {
            return None;
        }
        self.next_token();
        let condition = self.parse_expression(Precedence::Lowest)?;
        if !self.expect_peek(TokenKind::RParen) {
            return None;
        }
        Some(condition)
    }

    fn parse_if_expression(&mut self) -> Option<Expression> {
        let condition = self.parse_condition()?;
        if !self.expect_peek(TokenKind::LBrace) {
            return None;
        }
        let consequence = self.parse_block();

        let alternative = if self.peek_is(TokenKind::Else) {
            self.next_token();
            if !self.expect_peek(TokenKind::LBrace) {
                return None;
            }
            Some(self.parse_block())
        } else {
            None
        };

        Some(Expression::If {
            condition: Box::new(condition),
            consequence,
            alternative,
        })
    }

    fn parse_while_expression(&mut self) -> Option<Expression> {
        let condition = self.parse_condition()?;
        if !self.expect_peek(TokenKind::LBrace) {
            return None;
        }
        let body = self.parse_block();
        Some(Expression::While {
            condition: Box::new(condition),
            body,
        })
    }

    fn parse_function_literal(&mut self) -> Option<Expression> {
        if !self.expect_peek(TokenKind::LParen) {
            return None;
        }
        let parameters = self.parse_function_parameters()?;
        if !self.expect_peek(TokenKind::LBrace) {
            return None;
        }
        let body = self.parse_block();
        Some(Expression::Function(Rc::new(FunctionLiteral {
            parameters,
            body,
        })))
    }

    fn parse_function_parameters(&mut self) -> Option<Vec<String>> {
        let mut parameters = Vec::new();
        if self.peek_is(TokenKind::RParen) {
            self.next_token();
            return Some(parameters);
        }

        if !self.expect_peek(TokenKind::Ident) {
            return None;
        }
        parameters.push(self.current.literal.clone());
        while self.peek_is(TokenKind::Comma) {
            self.next_token();
            if !self.expect_peek(TokenKind::Ident) {
                return None;
            }
            parameters.push(self.current.literal.clone());
        }

        if !self.expect_peek(TokenKind::RParen) {
            return None;
        }
        Some(parameters)
    }

    /// Comma separated expressions up to `end`; `current` is the opener.
    fn parse_expression_list(&mut self, end: TokenKind) -> Option<Vec<Expression>> {
        let mut list = Vec::new();
        if self.peek_is(end) {
            self.next_token();
            return Some(list);
        }

        self.next_token();
        list.push(self.parse_expression(Precedence::Lowest)?);
        while self.peek_is(TokenKind::Comma) {
            self.next_token();
            self.next_token();
            list.push(self.parse_expression(Precedence::Lowest)?);
        }

        if !self.expect_peek(end) {
            return None;
        }
        Some(list)
    }

    fn parse_array_literal(&mut self) -> Option<Expression> {
        let elements = self.parse_expression_list(TokenKind::RBracket)?;
        Some(Expression::Array(elements))
    }

    fn parse_hash_literal(&mut self) -> Option<Expression> {
        let mut pairs = Vec::new();

        while !self.peek_is(TokenKind::RBrace) {
            self.next_token();
            let key = self.parse_expression(Precedence::Lowest)?;
            if !self.expect_peek(TokenKind::Colon) {
                return None;
            }
            self.next_token();
            let value = self.parse_expression(Precedence::Lowest)?;
            pairs.push((key, value));

            if !self.peek_is(TokenKind::RBrace) && !self.expect_peek(TokenKind::Comma) {
                return None;
            }
        }
        self.next_token();

        Some(Expression::Hash(pairs))
    }

    fn parse_call_expression(&mut self, function: Expression) -> Option<Expression> {
        let arguments = self.parse_expression_list(TokenKind::RParen)?;
        Some(Expression::Call {
            function: Box::new(function),
            arguments,
        })
    }

    fn parse_index_expression(&mut self, left: Expression) -> Option<Expression> {
        self.next_token();
        let index = self.parse_expression(Precedence::Lowest)?;
        if !self.expect_peek(TokenKind::RBracket) {
            return None;
        }
        Some(Expression::Index {
            left: Box::new(left),
            index: Box::new(index),
        })
    }

    fn parse_dot_expression(&mut self, left: Expression) -> Option<Expression> {
        self.next_token();
        let attribute = self.parse_expression(Precedence::Dot)?;
        Some(Expression::Dot {
            left: Box::new(left),
            attribute: Box::new(attribute),
        })
    }
}

// Helper function to lex and parse a string directly (useful for tests and the shell)
pub fn parse_str(input: &str) -> (Program, Vec<ParseError>) {
    let mut parser = Parser::new(Lexer::new(input));
    let program = parser.parse_program();
    (program, parser.into_errors())
}

#[cfg(test)]
mod tests {
    use super::*;

    // Parses `input`, failing the test on any parse error
    fn parse(input: &str) -> Program {
        let (program, errors) = parse_str(input);
        if !errors.is_empty() {
            let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            panic!("Parsing failed for input '{}': {:?}", input, messages);
        }
        program
    }

    fn assert_reprint(input: &str, expected: &str) {
        assert_eq!(parse(input).to_string(), expected, "Input: '{}'", input);
    }

    fn single_expression(input: &str) -> Expression {
        let mut program = parse(input);
        assert_eq!(program.statements.len(), 1, "Input: '{}'", input);
        match program.statements.remove(0) {
            Statement::Expression(expression) => expression,
            other => panic!("Expected an expression statement, got {:?}", other),
        }
    }

    fn parse_errors(input: &str) -> Vec<ParseError> {
        parse_str(input).1
    }

    #[test]
    fn test_operator_precedence() {
        let cases = [
            ("-a * b", "((-a) * b)"),
            ("!-a", "(!(-a))"),
            ("a + b + c", "((a + b) + c)"),
            ("a + b - c", "((a + b) - c)"),
            ("a * b * c", "((a * b) * c)"),
            ("a * b / c", "((a * b) / c)"),
            ("a + b / c", "(a + (b / c))"),
            ("a + b * c + d / e - f", "(((a + (b * c)) + (d / e)) - f)"),
            ("3 + 4; -5 * 6", "(3 + 4)((-5) * 6)"),
            ("5 > 4 =*= 3 < 4", "((5 > 4) =*= (3 < 4))"),
            ("5 < 4 !*= 3 > 4", "((5 < 4) !*= (3 > 4))"),
            ("5 <= 4 =&= 3 >= 4", "((5 <= 4) =&= (3 >= 4))"),
            (
                "3 + 4 * 5 =*= 3 * 1 + 4 * 5",
                "((3 + (4 * 5)) =*= ((3 * 1) + (4 * 5)))",
            ),
            ("true", "true"),
            ("3 > 5 =*= false", "((3 > 5) =*= false)"),
            ("a =*= b & c !&= d", "(((a =*= b) & c) !&= d)"),
            ("a | b < c", "(a | (b < c))"),
            ("1 + (2 + 3) + 4", "((1 + (2 + 3)) + 4)"),
            ("(5 + 5) * 2", "((5 + 5) * 2)"),
            ("2 / (5 + 5)", "(2 / (5 + 5))"),
            ("-(5 + 5)", "(-(5 + 5))"),
            ("!(true =*= true)", "(!(true =*= true))"),
            ("a + add(b * c) + d", "((a + add((b * c))) + d)"),
            (
                "add(a, b, 1, 2 * 3, 4 + 5, add(6, 7 * 8))",
                "add(a, b, 1, (2 * 3), (4 + 5), add(6, (7 * 8)))",
            ),
            (
                "add(a + b + c * d / f + g)",
                "add((((a + b) + ((c * d) / f)) + g))",
            ),
            (
                "a * [1, 2, 3, 4][b * c] * d",
                "((a * ([1, 2, 3, 4][(b * c)])) * d)",
            ),
            (
                "add(a * b[2], b[1], 2 * [1, 2][1])",
                "add((a * (b[2])), (b[1]), (2 * ([1, 2][1])))",
            ),
        ];
        for (input, expected) in cases {
            assert_reprint(input, expected);
        }
    }

    #[test]
    fn test_attribute_access_binds_tightest() {
        assert_reprint("h.k + 1", "((h.k) + 1)");
        assert_reprint("-h.k", "(-(h.k))");
        assert_reprint("a.b.c", "((a.b).c)");
        assert_reprint("a[0].b", "((a[0]).b)");
        assert_reprint("f(x).y", "(f(x).y)");
        assert_reprint("h.\"name\" * 2", "((h.\"name\") * 2)");
    }

    #[test]
    fn test_let_statements() {
        let program = parse("let x = 5; let y =& x; z =* 10; w = y;");
        let expected = [
            (true, "x", AssignOperator::Copy, "5"),
            (true, "y", AssignOperator::Reference, "x"),
            (false, "z", AssignOperator::Value, "10"),
            (false, "w", AssignOperator::Copy, "y"),
        ];
        assert_eq!(program.statements.len(), expected.len());
        for (statement, (declared, name, operator, value)) in
            program.statements.iter().zip(expected)
        {
            match statement {
                Statement::Let(let_statement) => {
                    assert_eq!(let_statement.declared, declared);
                    assert_eq!(let_statement.name, name);
                    assert_eq!(let_statement.operator, operator);
                    assert_eq!(let_statement.value.to_string(), value);
                }
                other => panic!("Expected a let statement, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_return_statements() {
        let program = parse("return 5; return 10; return add(1, 2);");
        assert_eq!(program.statements.len(), 3);
        assert!(
            program
                .statements
                .iter()
                .all(|s| matches!(s, Statement::Return(_)))
        );
        // The semicolon may be left out right before a closing brace
        assert_reprint("fun() { return 1 }", "fun() { return 1; }");
    }

    #[test]
    fn test_literals() {
        assert_eq!(single_expression("foobar;"), Expression::Identifier("foobar".into()));
        assert_eq!(single_expression("5;"), Expression::Integer(5));
        assert_eq!(single_expression("\"hello world\";"), Expression::Str("hello world".into()));
        assert_eq!(single_expression("false"), Expression::Boolean(false));
        assert_eq!(single_expression("[]"), Expression::Array(vec![]));
        assert_eq!(single_expression("{}"), Expression::Hash(vec![]));
    }

    #[test]
    fn test_hash_literals() {
        assert_reprint(
            r#"{"one": 1, "two": 2, "three": 3}"#,
            r#"{"one": 1, "two": 2, "three": 3}"#,
        );
        assert_reprint(
            r#"{"one": 0 + 1, two: 10 - 8, 3: 15 / 5, true: x}"#,
            r#"{"one": (0 + 1), two: (10 - 8), 3: (15 / 5), true: x}"#,
        );
        match single_expression(r#"{"b": 2, "a": 1}"#) {
            Expression::Hash(pairs) => {
                assert_eq!(pairs[0].0, Expression::Str("b".into()));
                assert_eq!(pairs[1].0, Expression::Str("a".into()));
            }
            other => panic!("Expected a hash literal, got {:?}", other),
        }
    }

    #[test]
    fn test_if_expression() {
        match single_expression("if (x < y) { x }") {
            Expression::If {
                condition,
                consequence,
                alternative,
            } => {
                assert_eq!(condition.to_string(), "(x < y)");
                assert_eq!(consequence.statements.len(), 1);
                assert!(alternative.is_none());
            }
            other => panic!("Expected an if expression, got {:?}", other),
        }
        assert_reprint(
            "if (x < y) { x } else { y; z }",
            "if (x < y) { x } else { yz }",
        );
    }

    #[test]
    fn test_while_expression() {
        match single_expression("while (i < 10) { let i = i + 1; }") {
            Expression::While { condition, body } => {
                assert_eq!(condition.to_string(), "(i < 10)");
                assert_eq!(body.to_string(), "let i = (i + 1);");
            }
            other => panic!("Expected a while expression, got {:?}", other),
        }
    }

    #[test]
    fn test_function_literal_parameters() {
        let cases = [
            ("fun() {};", vec![]),
            ("fun(x) {};", vec!["x"]),
            ("fun(x, y, z) {};", vec!["x", "y", "z"]),
        ];
        for (input, expected) in cases {
            match single_expression(input) {
                Expression::Function(literal) => {
                    assert_eq!(literal.parameters, expected, "Input: '{}'", input)
                }
                other => panic!("Expected a function literal, got {:?}", other),
            }
        }
        assert_reprint("fun(x, y) { x + y; }", "fun(x, y) { (x + y) }");
    }

    #[test]
    fn test_call_expression() {
        match single_expression("add(1, 2 * 3, 4 + 5);") {
            Expression::Call {
                function,
                arguments,
            } => {
                assert_eq!(function.to_string(), "add");
                let arguments: Vec<String> = arguments.iter().map(|a| a.to_string()).collect();
                assert_eq!(arguments, vec!["1", "(2 * 3)", "(4 + 5)"]);
            }
            other => panic!("Expected a call expression, got {:?}", other),
        }
        assert_reprint("fun(x) { x }(5)", "fun(x) { x }(5)");
    }

    #[test]
    fn test_multiple_errors_keep_partial_program() {
        let (program, errors) = parse_str("let = 5; let x 5; let y = 3;");
        assert_eq!(errors.len(), 2, "{:?}", errors);
        assert_eq!(
            errors[0].to_string(),
            "expected next token to be `IDENT`, got `=` instead"
        );
        assert!(matches!(
            &errors[1],
            ParseError::UnexpectedToken { found, .. } if found.kind == TokenKind::Int
        ));
        assert_eq!(program.to_string(), "let y = 3;");
    }

    #[test]
    fn test_missing_semicolon_after_let() {
        let errors = parse_errors("let x = 5");
        assert_eq!(
            errors,
            vec![ParseError::UnexpectedToken {
                expected: "`;`".to_string(),
                found: Token::new(TokenKind::Eof, "", Span::new(9, 9)),
            }]
        );
    }

    #[test]
    fn test_no_prefix_parse_function() {
        let errors = parse_errors("1 + ;");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].to_string(), "no prefix parse function for `;` found");
        assert_eq!(errors[0].span(), Span::new(4, 5));
    }

    #[test]
    fn test_illegal_token_is_reported_by_parser() {
        let errors = parse_errors("let a = $;");
        assert!(matches!(&errors[0], ParseError::IllegalToken(token) if token.literal == "$"));
    }

    #[test]
    fn test_integer_out_of_range() {
        let errors = parse_errors("99999999999999999999");
        assert!(matches!(errors[0], ParseError::InvalidInteger(_)));
    }

    #[test]
    fn test_unclosed_block() {
        let (program, errors) = parse_str("fun(x) { x");
        assert_eq!(program.statements.len(), 1);
        assert!(matches!(errors[..], [ParseError::UnexpectedEof { .. }]));
    }

    #[test]
    fn test_malformed_if_and_call() {
        assert!(!parse_errors("if (x { 1 }").is_empty());
        assert!(!parse_errors("add(1, 2").is_empty());
        assert!(!parse_errors("{1: 2, 3}").is_empty());
        assert!(!parse_errors("fun(1) {}").is_empty());
    }
}
