use std::fmt;
use std::rc::Rc;

use crate::lexer::TokenKind;

/// Root of a parsed source unit.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Let(LetStatement),
    Return(Expression),
    Expression(Expression),
}

/// `let x = 5;` and bare assignments such as `x =& y;`.
#[derive(Debug, Clone, PartialEq)]
pub struct LetStatement {
    /// Whether the `let` keyword was written.
    pub declared: bool,
    pub name: String,
    pub operator: AssignOperator,
    pub value: Expression,
}

/// Body of an `if`, `while` or function literal.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionLiteral {
    pub parameters: Vec<String>,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Identifier(String),
    Integer(i64),
    Str(String),
    Boolean(bool),
    Array(Vec<Expression>),
    // Pairs stay in source order so evaluation order is predictable.
    Hash(Vec<(Expression, Expression)>),
    Function(Rc<FunctionLiteral>),
    Prefix {
        operator: PrefixOperator,
        right: Box<Expression>,
    },
    Infix {
        operator: InfixOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    If {
        condition: Box<Expression>,
        consequence: Block,
        alternative: Option<Block>,
    },
    While {
        condition: Box<Expression>,
        body: Block,
    },
    Call {
        function: Box<Expression>,
        arguments: Vec<Expression>,
    },
    Index {
        left: Box<Expression>,
        index: Box<Expression>,
    },
    Dot {
        left: Box<Expression>,
        attribute: Box<Expression>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOperator {
    /// `=`: copy-or-mutate
    Copy,
    /// `=&`: bind the exact instance
    Reference,
    /// `=*`: copy-or-mutate, spelled out
    Value,
}

impl AssignOperator {
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Assign => Some(AssignOperator::Copy),
            TokenKind::RefAssign => Some(AssignOperator::Reference),
            TokenKind::ValueAssign => Some(AssignOperator::Value),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixOperator {
    Not,
    Negate,
}

impl PrefixOperator {
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Bang => Some(PrefixOperator::Not),
            TokenKind::Minus => Some(PrefixOperator::Negate),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfixOperator {
    Plus,
    Minus,
    Multiply,
    Divide,
    Lt,
    Gt,
    LtEq,
    GtEq,
    ValueEq,
    ValueNotEq,
    IdentityEq,
    IdentityNotEq,
    And,
    Or,
}

impl InfixOperator {
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        let operator = match kind {
            TokenKind::Plus => InfixOperator::Plus,
            TokenKind::Minus => InfixOperator::Minus,
            TokenKind::Asterisk => InfixOperator::Multiply,
            TokenKind::Slash => InfixOperator::Divide,
            TokenKind::Lt => InfixOperator::Lt,
            TokenKind::Gt => InfixOperator::Gt,
            TokenKind::LtEq => InfixOperator::LtEq,
            TokenKind::GtEq => InfixOperator::GtEq,
            TokenKind::ValueEq => InfixOperator::ValueEq,
            TokenKind::ValueNotEq => InfixOperator::ValueNotEq,
            TokenKind::IdentityEq => InfixOperator::IdentityEq,
            TokenKind::IdentityNotEq => InfixOperator::IdentityNotEq,
            TokenKind::And => InfixOperator::And,
            TokenKind::Or => InfixOperator::Or,
            _ => return None,
        };
        Some(operator)
    }
}

// --- Canonical reprint ---

impl fmt::Display for AssignOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignOperator::Copy => write!(f, "="),
            AssignOperator::Reference => write!(f, "=&"),
            AssignOperator::Value => write!(f, "=*"),
        }
    }
}

impl fmt::Display for PrefixOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrefixOperator::Not => write!(f, "!"),
            PrefixOperator::Negate => write!(f, "-"),
        }
    }
}

impl fmt::Display for InfixOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            InfixOperator::Plus => "+",
            InfixOperator::Minus => "-",
            InfixOperator::Multiply => "*",
            InfixOperator::Divide => "/",
            InfixOperator::Lt => "<",
            InfixOperator::Gt => ">",
            InfixOperator::LtEq => "<=",
            InfixOperator::GtEq => ">=",
            InfixOperator::ValueEq => "=*=",
            InfixOperator::ValueNotEq => "!*=",
            InfixOperator::IdentityEq => "=&=",
            InfixOperator::IdentityNotEq => "!&=",
            InfixOperator::And => "&",
            InfixOperator::Or => "|",
        };
        f.write_str(text)
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for statement in &self.statements {
            write!(f, "{}", statement)?;
        }
        Ok(())
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Let(statement) => write!(f, "{}", statement),
            Statement::Return(value) => write!(f, "return {};", value),
            Statement::Expression(expression) => write!(f, "{}", expression),
        }
    }
}

impl fmt::Display for LetStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.declared {
            write!(f, "let ")?;
        }
        write!(f, "{} {} {};", self.name, self.operator, self.value)
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for statement in &self.statements {
            write!(f, "{}", statement)?;
        }
        Ok(())
    }
}

impl fmt::Display for FunctionLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fun({}) {{ {} }}", self.parameters.join(", "), self.body)
    }
}

// Writes `items` separated by ", "
fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    let mut first = true;
    for item in items {
        if !first {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
        first = false;
    }
    Ok(())
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Identifier(name) => write!(f, "{}", name),
            Expression::Integer(value) => write!(f, "{}", value),
            Expression::Str(value) => write!(f, "\"{}\"", value),
            Expression::Boolean(value) => write!(f, "{}", value),
            Expression::Array(elements) => {
                write!(f, "[")?;
                write_list(f, elements)?;
                write!(f, "]")
            }
            Expression::Hash(pairs) => {
                write!(f, "{{")?;
                let mut first = true;
                for (key, value) in pairs {
                    if !first {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                    first = false;
                }
                write!(f, "}}")
            }
            Expression::Function(literal) => write!(f, "{}", literal),
            Expression::Prefix { operator, right } => write!(f, "({}{})", operator, right),
            Expression::Infix {
                operator,
                left,
                right,
            } => write!(f, "({} {} {})", left, operator, right),
            Expression::If {
                condition,
                consequence,
                alternative,
            } => {
                write!(f, "if {} {{ {} }}", condition, consequence)?;
                if let Some(alternative) = alternative {
                    write!(f, " else {{ {} }}", alternative)?;
                }
                Ok(())
            }
            Expression::While { condition, body } => {
                write!(f, "while {} {{ {} }}", condition, body)
            }
            Expression::Call {
                function,
                arguments,
            } => {
                write!(f, "{}(", function)?;
                write_list(f, arguments)?;
                write!(f, ")")
            }
            Expression::Index { left, index } => write!(f, "({}[{}])", left, index),
            Expression::Dot { left, attribute } => write!(f, "({}.{})", left, attribute),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(name: &str) -> Expression {
        Expression::Identifier(name.to_string())
    }

    #[test]
    fn test_let_statement_display() {
        let program = Program {
            statements: vec![
                Statement::Let(LetStatement {
                    declared: true,
                    name: "myVar".to_string(),
                    operator: AssignOperator::Copy,
                    value: ident("anotherVar"),
                }),
                Statement::Let(LetStatement {
                    declared: false,
                    name: "b".to_string(),
                    operator: AssignOperator::Reference,
                    value: ident("a"),
                }),
            ],
        };
        assert_eq!(program.to_string(), "let myVar = anotherVar;b =& a;");
    }

    #[test]
    fn test_nested_expression_display() {
        let expression = Expression::Infix {
            operator: InfixOperator::Multiply,
            left: Box::new(Expression::Prefix {
                operator: PrefixOperator::Negate,
                right: Box::new(ident("a")),
            }),
            right: Box::new(Expression::Index {
                left: Box::new(Expression::Array(vec![
                    Expression::Integer(1),
                    Expression::Str("two".to_string()),
                ])),
                index: Box::new(Expression::Integer(0)),
            }),
        };
        assert_eq!(expression.to_string(), "((-a) * ([1, \"two\"][0]))");
    }

    #[test]
    fn test_function_and_control_flow_display() {
        let literal = FunctionLiteral {
            parameters: vec!["x".to_string(), "y".to_string()],
            body: Block {
                statements: vec![Statement::Return(Expression::Infix {
                    operator: InfixOperator::Plus,
                    left: Box::new(ident("x")),
                    right: Box::new(ident("y")),
                })],
            },
        };
        assert_eq!(
            Expression::Function(Rc::new(literal)).to_string(),
            "fun(x, y) { return (x + y); }"
        );

        let while_loop = Expression::While {
            condition: Box::new(ident("go")),
            body: Block {
                statements: vec![Statement::Expression(Expression::Dot {
                    left: Box::new(ident("h")),
                    attribute: Box::new(Expression::Str("k".to_string())),
                })],
            },
        };
        assert_eq!(while_loop.to_string(), "while go { (h.\"k\") }");
    }

    #[test]
    fn test_operator_from_token() {
        assert_eq!(
            AssignOperator::from_token(TokenKind::RefAssign),
            Some(AssignOperator::Reference)
        );
        assert_eq!(AssignOperator::from_token(TokenKind::Plus), None);
        assert_eq!(
            InfixOperator::from_token(TokenKind::ValueNotEq),
            Some(InfixOperator::ValueNotEq)
        );
        assert_eq!(InfixOperator::from_token(TokenKind::Bang), None);
        assert_eq!(
            PrefixOperator::from_token(TokenKind::Minus),
            Some(PrefixOperator::Negate)
        );
    }
}
