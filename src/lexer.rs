use logos::Logos;
use std::fmt;

use crate::Span;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[logos(skip r"[ \t\n\r\f]+")] // Skip whitespace
pub enum TokenKind {
    // Assignment operators
    #[token("=")]
    Assign,
    #[token("=&")]
    RefAssign,
    #[token("=*")]
    ValueAssign,

    // Arithmetic and relational operators
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Asterisk,
    #[token("/")]
    Slash,
    #[token("!")]
    Bang,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,

    // Equality-class operators
    #[token("=&=")]
    IdentityEq,
    #[token("!&=")]
    IdentityNotEq,
    #[token("=*=")]
    ValueEq,
    #[token("!*=")]
    ValueNotEq,
    #[token("&")]
    And,
    #[token("|")]
    Or,

    // Punctuation
    #[token(".")]
    Dot,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token(":")]
    Colon,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,

    // Keywords
    #[token("let")]
    Let,
    #[token("fun")]
    Function,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("while")]
    While,
    #[token("return")]
    Return,
    #[token("true")]
    True,
    #[token("false")]
    False,

    // Literals and names; the text lives in `Token::literal`
    #[regex("[A-Za-z_][A-Za-z0-9_]*")]
    Ident,
    #[regex("[0-9]+")]
    Int,
    #[regex(r#""[^"]*""#)]
    Str,

    // Produced by `Lexer`, never by the scanner itself
    Illegal,
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TokenKind::Assign => "=",
            TokenKind::RefAssign => "=&",
            TokenKind::ValueAssign => "=*",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Asterisk => "*",
            TokenKind::Slash => "/",
            TokenKind::Bang => "!",
            TokenKind::Lt => "<",
            TokenKind::Gt => ">",
            TokenKind::LtEq => "<=",
            TokenKind::GtEq => ">=",
            TokenKind::IdentityEq => "=&=",
            TokenKind::IdentityNotEq => "!&=",
            TokenKind::ValueEq => "=*=",
            TokenKind::ValueNotEq => "!*=",
            TokenKind::And => "&",
            TokenKind::Or => "|",
            TokenKind::Dot => ".",
            TokenKind::Comma => ",",
            TokenKind::Semicolon => ";",
            TokenKind::Colon => ":",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::Let => "let",
            TokenKind::Function => "fun",
            TokenKind::If => "if",
            TokenKind::Else => "else",
            TokenKind::While => "while",
            TokenKind::Return => "return",
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::Ident => "IDENT",
            TokenKind::Int => "INT",
            TokenKind::Str => "STRING",
            TokenKind::Illegal => "ILLEGAL",
            TokenKind::Eof => "EOF",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub literal: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, literal: impl Into<String>, span: Span) -> Self {
        Token {
            kind,
            literal: literal.into(),
            span,
        }
    }
}

/// Pull-based scanner: the parser asks for one token at a time.
pub struct Lexer<'src> {
    inner: logos::Lexer<'src, TokenKind>,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Lexer {
            inner: TokenKind::lexer(source),
        }
    }

    /// Returns the next token. Once the input is exhausted every call yields
    /// an `Eof` token positioned at the end of the source.
    pub fn next_token(&mut self) -> Token {
        let Some(result) = self.inner.next() else {
            let end = self.inner.source().len();
            return Token::new(TokenKind::Eof, "", Span::new(end, end));
        };
        let span = Span::from(self.inner.span());
        let slice = self.inner.slice();
        match result {
            // Strip the surrounding quotes; there are no escapes to undo.
            Ok(TokenKind::Str) => Token::new(TokenKind::Str, &slice[1..slice.len() - 1], span),
            Ok(kind) => Token::new(kind, slice, span),
            Err(()) => Token::new(TokenKind::Illegal, slice, span),
        }
    }
}

// Helper function to tokenize a string directly (useful for tests, benches and the REPL)
pub fn tokenize(input: &str) -> Vec<Token> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token();
        if token.kind == TokenKind::Eof {
            return tokens;
        }
        tokens.push(token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Helper to simplify testing token sequences
    fn assert_tokens(input: &str, expected: Vec<(TokenKind, &str)>) {
        let tokens: Vec<(TokenKind, String)> = tokenize(input)
            .into_iter()
            .map(|t| (t.kind, t.literal))
            .collect();
        let expected: Vec<(TokenKind, String)> = expected
            .into_iter()
            .map(|(kind, literal)| (kind, literal.to_string()))
            .collect();
        assert_eq!(tokens, expected, "Input: '{}'", input);
    }

    #[test]
    fn test_empty_input() {
        assert_tokens("", vec![]);
        assert_tokens("  \n\t ", vec![]);
    }

    #[test]
    fn test_punctuation() {
        assert_tokens(
            ",;(}{)+=",
            vec![
                (TokenKind::Comma, ","),
                (TokenKind::Semicolon, ";"),
                (TokenKind::LParen, "("),
                (TokenKind::RBrace, "}"),
                (TokenKind::LBrace, "{"),
                (TokenKind::RParen, ")"),
                (TokenKind::Plus, "+"),
                (TokenKind::Assign, "="),
            ],
        );
        assert_tokens(
            "[]:.",
            vec![
                (TokenKind::LBracket, "["),
                (TokenKind::RBracket, "]"),
                (TokenKind::Colon, ":"),
                (TokenKind::Dot, "."),
            ],
        );
    }

    #[test]
    fn test_multi_character_operators() {
        assert_tokens(
            "<= >= < > =& =&= =* =*= !&= !*= ! & |",
            vec![
                (TokenKind::LtEq, "<="),
                (TokenKind::GtEq, ">="),
                (TokenKind::Lt, "<"),
                (TokenKind::Gt, ">"),
                (TokenKind::RefAssign, "=&"),
                (TokenKind::IdentityEq, "=&="),
                (TokenKind::ValueAssign, "=*"),
                (TokenKind::ValueEq, "=*="),
                (TokenKind::IdentityNotEq, "!&="),
                (TokenKind::ValueNotEq, "!*="),
                (TokenKind::Bang, "!"),
                (TokenKind::And, "&"),
                (TokenKind::Or, "|"),
            ],
        );
        // No whitespace needed between an operator and its operand
        assert_tokens(
            "b=&a",
            vec![
                (TokenKind::Ident, "b"),
                (TokenKind::RefAssign, "=&"),
                (TokenKind::Ident, "a"),
            ],
        );
    }

    #[test]
    fn test_keywords_and_identifiers() {
        assert_tokens(
            "let fun if else while return true false",
            vec![
                (TokenKind::Let, "let"),
                (TokenKind::Function, "fun"),
                (TokenKind::If, "if"),
                (TokenKind::Else, "else"),
                (TokenKind::While, "while"),
                (TokenKind::Return, "return"),
                (TokenKind::True, "true"),
                (TokenKind::False, "false"),
            ],
        );
        assert_tokens(
            "letter funny isEmpty do_while x1",
            vec![
                (TokenKind::Ident, "letter"),
                (TokenKind::Ident, "funny"),
                (TokenKind::Ident, "isEmpty"),
                (TokenKind::Ident, "do_while"),
                (TokenKind::Ident, "x1"),
            ],
        );
    }

    #[test]
    fn test_strings_and_integers() {
        assert_tokens(
            r#""hello world" 1343456 """#,
            vec![
                (TokenKind::Str, "hello world"),
                (TokenKind::Int, "1343456"),
                (TokenKind::Str, ""),
            ],
        );
    }

    #[test]
    fn test_program() {
        let input = "
            let five = 5;
            let add = fun(x, y) {
                x + y;
            };
            let result = add(five, 10);
        ";
        assert_tokens(
            input,
            vec![
                (TokenKind::Let, "let"),
                (TokenKind::Ident, "five"),
                (TokenKind::Assign, "="),
                (TokenKind::Int, "5"),
                (TokenKind::Semicolon, ";"),
                (TokenKind::Let, "let"),
                (TokenKind::Ident, "add"),
                (TokenKind::Assign, "="),
                (TokenKind::Function, "fun"),
                (TokenKind::LParen, "("),
                (TokenKind::Ident, "x"),
                (TokenKind::Comma, ","),
                (TokenKind::Ident, "y"),
                (TokenKind::RParen, ")"),
                (TokenKind::LBrace, "{"),
                (TokenKind::Ident, "x"),
                (TokenKind::Plus, "+"),
                (TokenKind::Ident, "y"),
                (TokenKind::Semicolon, ";"),
                (TokenKind::RBrace, "}"),
                (TokenKind::Semicolon, ";"),
                (TokenKind::Let, "let"),
                (TokenKind::Ident, "result"),
                (TokenKind::Assign, "="),
                (TokenKind::Ident, "add"),
                (TokenKind::LParen, "("),
                (TokenKind::Ident, "five"),
                (TokenKind::Comma, ","),
                (TokenKind::Int, "10"),
                (TokenKind::RParen, ")"),
                (TokenKind::Semicolon, ";"),
            ],
        );
    }

    #[test]
    fn test_illegal_characters_become_tokens() {
        let tokens = tokenize("let $ = 1");
        assert_eq!(tokens[1].kind, TokenKind::Illegal);
        assert_eq!(tokens[1].literal, "$");
        assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Int));

        let unterminated = tokenize(r#""abc"#);
        assert_eq!(unterminated[0].kind, TokenKind::Illegal);
    }

    #[test]
    fn test_eof_repeats() {
        let mut lexer = Lexer::new("x");
        assert_eq!(lexer.next_token().kind, TokenKind::Ident);
        let eof = lexer.next_token();
        assert_eq!(eof.kind, TokenKind::Eof);
        assert_eq!(eof.span, Span::new(1, 1));
        assert_eq!(lexer.next_token().kind, TokenKind::Eof);
    }

    #[test]
    fn test_token_spans() {
        let tokens = tokenize(r#"(x "ab")"#);
        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[0].span, Span::new(0, 1));
        assert_eq!(tokens[1].span, Span::new(1, 2));
        // String spans include the quotes
        assert_eq!(tokens[2].span, Span::new(3, 7));
        assert_eq!(tokens[3].span, Span::new(7, 8));
    }
}
