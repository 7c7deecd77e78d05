use std::cell::RefCell;
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::ops::ControlFlow;
use std::rc::Rc;

use thiserror::Error;

use crate::ast::{
    AssignOperator, Block, Expression, InfixOperator, LetStatement, PrefixOperator, Program,
    Statement,
};
use crate::builtins;
use crate::environment::{EnvError, Env, Environment, Slot};
use crate::object::{Function, HashKey, HashPair, Object, ObjectKind, ObjectRef, boolean, null};

// --- Evaluation Error ---
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("unknown operator: {operator}{right}")]
    UnknownPrefixOperator {
        operator: PrefixOperator,
        right: ObjectKind,
    },
    #[error("unknown operator: {left} {operator} {right}")]
    UnknownInfixOperator {
        left: ObjectKind,
        operator: InfixOperator,
        right: ObjectKind,
    },
    #[error("type mismatch: {left} {operator} {right}")]
    TypeMismatch {
        left: ObjectKind,
        operator: InfixOperator,
        right: ObjectKind,
    },
    #[error("identifier not found: {0}")]
    IdentifierNotFound(String),
    #[error("not a function: {0}")]
    NotCallable(ObjectKind),
    #[error("wrong number of arguments: want={want}, got={got}")]
    WrongArgumentCount { want: usize, got: usize },
    #[error("division by zero")]
    DivisionByZero,
    // Carries the offending operation, e.g. `9223372036854775807 + 1`
    #[error("integer overflow: {0}")]
    IntegerOverflow(String),
    #[error("index operator not supported: {left}[{index}]")]
    IndexNotSupported { left: ObjectKind, index: ObjectKind },
    #[error("attribute access not supported: {0}")]
    AttributeNotSupported(ObjectKind),
    #[error("unusable as hash key: {0}")]
    UnusableHashKey(ObjectKind),
    #[error("{0}")]
    InvalidArgument(String),
    #[error("index out of range: {index} (length {len})")]
    IndexOutOfRange { index: i64, len: usize },
    #[error("could not write output: {0}")]
    Output(String),
    #[error(transparent)]
    Assignment(#[from] EnvError),
}

impl From<io::Error> for EvalError {
    fn from(err: io::Error) -> Self {
        EvalError::Output(err.to_string())
    }
}

// Result type alias for convenience
pub type EvalResult<T = ObjectRef> = Result<T, EvalError>;

// Operands either all evaluate or a `return` inside one of them unwinds.
type Operands<T> = ControlFlow<ObjectRef, Vec<T>>;

// A `return` reached inside an operand leaves the enclosing expression with
// the ReturnValue still wrapped.
macro_rules! unwind {
    ($value:expr) => {{
        let value = $value;
        if is_return(&value) {
            return Ok(value);
        }
        value
    }};
}

macro_rules! unwind_all {
    ($operands:expr) => {
        match $operands {
            ControlFlow::Continue(values) => values,
            ControlFlow::Break(signal) => return Ok(signal),
        }
    };
}

/// Tree-walking evaluator. Owns the stream `print` writes to.
pub struct Evaluator {
    output: Box<dyn Write>,
}

impl Default for Evaluator {
    fn default() -> Self {
        Evaluator::new()
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Evaluator::with_output(io::stdout())
    }

    pub fn with_output(output: impl Write + 'static) -> Self {
        Evaluator {
            output: Box::new(output),
        }
    }

    /// Writes one line to the evaluator's output stream.
    pub fn write_line(&mut self, text: &str) -> EvalResult<()> {
        writeln!(self.output, "{}", text)?;
        Ok(())
    }

    /// Evaluates every statement of `program` in `env`.
    ///
    /// Returns `None` when the last statement produced no value (a `let`, or
    /// an empty program). An error anywhere stops evaluation and comes back
    /// as an `Object::Error`; a `return` stops evaluation and its value is
    /// unwrapped.
    pub fn eval_program(&mut self, program: &Program, env: &Env) -> Option<ObjectRef> {
        match self.eval_statements(&program.statements, env) {
            Ok(Some(value)) => Some(unwrap_return(&value).unwrap_or(value)),
            Ok(None) => None,
            Err(error) => {
                tracing::debug!(%error, "evaluation failed");
                Some(Object::Error(error).into_ref())
            }
        }
    }

    // Blocks and programs share this; the ReturnValue stays wrapped so it can
    // travel out of nested blocks.
    fn eval_statements(
        &mut self,
        statements: &[Statement],
        env: &Env,
    ) -> EvalResult<Option<ObjectRef>> {
        let mut result = None;
        for statement in statements {
            result = self.eval_statement(statement, env)?;
            if result.as_ref().is_some_and(is_return) {
                break;
            }
        }
        Ok(result)
    }

    fn eval_block(&mut self, block: &Block, env: &Env) -> EvalResult<Option<ObjectRef>> {
        self.eval_statements(&block.statements, env)
    }

    fn eval_statement(&mut self, statement: &Statement, env: &Env) -> EvalResult<Option<ObjectRef>> {
        match statement {
            Statement::Expression(expression) => self.eval_expression(expression, env).map(Some),
            Statement::Return(expression) => {
                let value = self.eval_expression(expression, env)?;
                if is_return(&value) {
                    return Ok(Some(value));
                }
                Ok(Some(Object::ReturnValue(value).into_ref()))
            }
            Statement::Let(statement) => self.eval_let(statement, env),
        }
    }

    fn eval_let(&mut self, statement: &LetStatement, env: &Env) -> EvalResult<Option<ObjectRef>> {
        match statement.operator {
            AssignOperator::Reference => {
                let slot = self.eval_slot(&statement.value, env)?;
                let value = Rc::clone(&slot.borrow());
                if is_return(&value) {
                    return Ok(Some(value));
                }
                env.borrow_mut().bind_slot(statement.name.as_str(), slot);
            }
            AssignOperator::Copy | AssignOperator::Value => {
                let value = self.eval_expression(&statement.value, env)?;
                if is_return(&value) {
                    return Ok(Some(value));
                }
                env.borrow_mut().assign(&statement.name, &value)?
            }
        }
        Ok(None)
    }

    fn eval_expression(&mut self, expression: &Expression, env: &Env) -> EvalResult {
        match expression {
            Expression::Identifier(name) => eval_identifier(name, env),
            Expression::Integer(value) => Ok(Object::Integer(*value).into_ref()),
            Expression::Str(value) => Ok(Object::Str(value.clone()).into_ref()),
            Expression::Boolean(value) => Ok(boolean(*value)),
            Expression::Array(elements) => {
                let elements = unwind_all!(self.eval_expressions(elements, env)?);
                Ok(Object::Array(elements).into_ref())
            }
            Expression::Hash(pairs) => self.eval_hash_literal(pairs, env),
            Expression::Function(literal) => Ok(Object::Function(Function {
                literal: Rc::clone(literal),
                env: Rc::clone(env),
            })
            .into_ref()),
            Expression::Prefix { operator, right } => {
                let right = unwind!(self.eval_expression(right, env)?);
                eval_prefix(*operator, &right)
            }
            Expression::Infix {
                operator,
                left,
                right,
            } => {
                // Right operand first
                let right = unwind!(self.eval_expression(right, env)?);
                let left = unwind!(self.eval_expression(left, env)?);
                eval_infix(*operator, &left, &right)
            }
            Expression::If {
                condition,
                consequence,
                alternative,
            } => {
                let condition = unwind!(self.eval_expression(condition, env)?);
                let truthy = condition.borrow().is_truthy();
                let result = if truthy {
                    self.eval_block(consequence, env)?
                } else if let Some(alternative) = alternative {
                    self.eval_block(alternative, env)?
                } else {
                    None
                };
                Ok(result.unwrap_or_else(null))
            }
            Expression::While { condition, body } => self.eval_while(condition, body, env),
            Expression::Call {
                function,
                arguments,
            } => {
                let function = unwind!(self.eval_expression(function, env)?);
                let arguments = unwind_all!(self.eval_arguments(arguments, env)?);
                self.call(&function, arguments)
            }
            Expression::Index { left, index } => {
                let left = unwind!(self.eval_expression(left, env)?);
                let index = unwind!(self.eval_expression(index, env)?);
                eval_index(&left, &index)
            }
            Expression::Dot { left, attribute } => {
                let target = unwind!(self.eval_expression(left, env)?);
                let attribute = unwind!(self.eval_expression(attribute, env)?);
                eval_attribute(&target, &attribute)
            }
        }
    }

    // Left to right, stopping at the first error or `return`
    fn eval_expressions(
        &mut self,
        expressions: &[Expression],
        env: &Env,
    ) -> EvalResult<Operands<ObjectRef>> {
        let mut values = Vec::with_capacity(expressions.len());
        for expression in expressions {
            let value = self.eval_expression(expression, env)?;
            if is_return(&value) {
                return Ok(ControlFlow::Break(value));
            }
            values.push(value);
        }
        Ok(ControlFlow::Continue(values))
    }

    fn eval_arguments(&mut self, arguments: &[Expression], env: &Env) -> EvalResult<Operands<Slot>> {
        let mut slots = Vec::with_capacity(arguments.len());
        for argument in arguments {
            let slot = self.eval_slot(argument, env)?;
            let value = Rc::clone(&slot.borrow());
            if is_return(&value) {
                return Ok(ControlFlow::Break(value));
            }
            slots.push(slot);
        }
        Ok(ControlFlow::Continue(slots))
    }

    // A bound variable yields its own cell; anything else a fresh one.
    fn eval_slot(&mut self, expression: &Expression, env: &Env) -> EvalResult<Slot> {
        if let Expression::Identifier(name) = expression {
            if let Some(slot) = env.borrow().get_slot(name) {
                return Ok(slot);
            }
        }
        let value = self.eval_expression(expression, env)?;
        Ok(Rc::new(RefCell::new(value)))
    }

    fn eval_hash_literal(&mut self, pairs: &[(Expression, Expression)], env: &Env) -> EvalResult {
        let mut hash = BTreeMap::new();
        for (key_expression, value_expression) in pairs {
            let key = unwind!(self.eval_expression(key_expression, env)?);
            let digest = hash_key(&key)?;
            let value = unwind!(self.eval_expression(value_expression, env)?);
            hash.insert(digest, HashPair { key, value });
        }
        Ok(Object::Hash(hash).into_ref())
    }

    fn eval_while(&mut self, condition: &Expression, body: &Block, env: &Env) -> EvalResult {
        let mut result = None;
        loop {
            let value = unwind!(self.eval_expression(condition, env)?);
            if !value.borrow().is_truthy() {
                break;
            }
            result = self.eval_block(body, env)?;
            if result.as_ref().is_some_and(is_return) {
                break;
            }
        }
        Ok(result.unwrap_or_else(null))
    }

    /// Calls a Function or BuiltIn with already evaluated arguments.
    pub fn apply_function(&mut self, function: &ObjectRef, arguments: Vec<ObjectRef>) -> EvalResult {
        let arguments = arguments
            .into_iter()
            .map(|argument| Rc::new(RefCell::new(argument)))
            .collect();
        self.call(function, arguments)
    }

    // Functions run in a fresh scope enclosing their captured scope, with
    // each parameter sharing the argument's cell.
    #[tracing::instrument(level = "trace", skip_all)]
    fn call(&mut self, function: &ObjectRef, arguments: Vec<Slot>) -> EvalResult {
        let callee = match &*function.borrow() {
            Object::Function(function) => Callee::Function(function.clone()),
            Object::Builtin(builtin) => Callee::Builtin(*builtin),
            other => return Err(EvalError::NotCallable(other.kind())),
        };

        match callee {
            Callee::Builtin(builtin) => {
                tracing::trace!(name = builtin.name, "calling builtin");
                let arguments = arguments
                    .iter()
                    .map(|slot| Rc::clone(&slot.borrow()))
                    .collect();
                (builtin.func)(self, arguments)
            }
            Callee::Function(function) => {
                let parameters = &function.literal.parameters;
                if parameters.len() != arguments.len() {
                    return Err(EvalError::WrongArgumentCount {
                        want: parameters.len(),
                        got: arguments.len(),
                    });
                }

                let scope = Environment::new_enclosed(Rc::clone(&function.env));
                {
                    let mut scope = scope.borrow_mut();
                    for (parameter, argument) in parameters.iter().zip(arguments) {
                        scope.bind_slot(parameter.as_str(), argument);
                    }
                }

                match self.eval_block(&function.literal.body, &scope)? {
                    Some(value) => Ok(unwrap_return(&value).unwrap_or(value)),
                    None => Ok(null()),
                }
            }
        }
    }
}

enum Callee {
    Function(Function),
    Builtin(builtins::Builtin),
}

fn is_return(value: &ObjectRef) -> bool {
    matches!(&*value.borrow(), Object::ReturnValue(_))
}

fn unwrap_return(value: &ObjectRef) -> Option<ObjectRef> {
    match &*value.borrow() {
        Object::ReturnValue(inner) => Some(Rc::clone(inner)),
        _ => None,
    }
}

fn is_true(value: &ObjectRef) -> bool {
    Rc::ptr_eq(value, &boolean(true))
}

fn hash_key(key: &ObjectRef) -> EvalResult<HashKey> {
    let key = key.borrow();
    key.hash_key()
        .ok_or_else(|| EvalError::UnusableHashKey(key.kind()))
}

fn eval_identifier(name: &str, env: &Env) -> EvalResult {
    if let Some(value) = env.borrow().get(name) {
        return Ok(value);
    }
    builtins::lookup(name)
        .map(|builtin| Object::Builtin(builtin).into_ref())
        .ok_or_else(|| EvalError::IdentifierNotFound(name.to_string()))
}

fn eval_prefix(operator: PrefixOperator, right: &ObjectRef) -> EvalResult {
    let right = right.borrow();
    match operator {
        PrefixOperator::Not => Ok(boolean(match &*right {
            Object::Boolean(value) => !value,
            Object::Null => true,
            _ => false,
        })),
        PrefixOperator::Negate => match &*right {
            Object::Integer(value) => value
                .checked_neg()
                .map(|negated| Object::Integer(negated).into_ref())
                .ok_or_else(|| EvalError::IntegerOverflow(format!("-({})", value))),
            other => Err(EvalError::UnknownPrefixOperator {
                operator,
                right: other.kind(),
            }),
        },
    }
}

fn eval_infix(operator: InfixOperator, left: &ObjectRef, right: &ObjectRef) -> EvalResult {
    // Identity and logical operators work on any pair of values
    match operator {
        InfixOperator::IdentityEq => return Ok(boolean(Rc::ptr_eq(left, right))),
        InfixOperator::IdentityNotEq => return Ok(boolean(!Rc::ptr_eq(left, right))),
        InfixOperator::And => return Ok(boolean(is_true(left) && is_true(right))),
        InfixOperator::Or => return Ok(boolean(is_true(left) || is_true(right))),
        _ => {}
    }

    let (left, right) = (left.borrow(), right.borrow());
    match operator {
        InfixOperator::ValueEq => return Ok(boolean(left.value_eq(&right))),
        InfixOperator::ValueNotEq => return Ok(boolean(!left.value_eq(&right))),
        _ => {}
    }

    match (&*left, &*right) {
        (Object::Integer(l), Object::Integer(r)) => eval_integer_infix(operator, *l, *r),
        (Object::Str(l), Object::Str(r)) if operator == InfixOperator::Plus => {
            Ok(Object::Str(format!("{}{}", l, r)).into_ref())
        }
        _ if left.kind() == right.kind() => Err(EvalError::UnknownInfixOperator {
            left: left.kind(),
            operator,
            right: right.kind(),
        }),
        _ => Err(EvalError::TypeMismatch {
            left: left.kind(),
            operator,
            right: right.kind(),
        }),
    }
}

fn eval_integer_infix(operator: InfixOperator, left: i64, right: i64) -> EvalResult {
    let result = match operator {
        InfixOperator::Plus => left.checked_add(right),
        InfixOperator::Minus => left.checked_sub(right),
        InfixOperator::Multiply => left.checked_mul(right),
        InfixOperator::Divide => {
            if right == 0 {
                return Err(EvalError::DivisionByZero);
            }
            left.checked_div(right)
        }
        InfixOperator::Lt => return Ok(boolean(left < right)),
        InfixOperator::Gt => return Ok(boolean(left > right)),
        InfixOperator::LtEq => return Ok(boolean(left <= right)),
        InfixOperator::GtEq => return Ok(boolean(left >= right)),
        _ => {
            return Err(EvalError::UnknownInfixOperator {
                left: ObjectKind::Integer,
                operator,
                right: ObjectKind::Integer,
            });
        }
    };
    result
        .map(|value| Object::Integer(value).into_ref())
        .ok_or_else(|| EvalError::IntegerOverflow(format!("{} {} {}", left, operator, right)))
}

fn eval_index(left: &ObjectRef, index: &ObjectRef) -> EvalResult {
    match (&*left.borrow(), &*index.borrow()) {
        (Object::Array(elements), Object::Integer(i)) => Ok(usize::try_from(*i)
            .ok()
            .and_then(|i| elements.get(i))
            .map(Rc::clone)
            .unwrap_or_else(null)),
        (left, index) => Err(EvalError::IndexNotSupported {
            left: left.kind(),
            index: index.kind(),
        }),
    }
}

fn eval_attribute(target: &ObjectRef, attribute: &ObjectRef) -> EvalResult {
    let target = target.borrow();
    let Object::Hash(pairs) = &*target else {
        return Err(EvalError::AttributeNotSupported(target.kind()));
    };
    let digest = hash_key(attribute)?;
    Ok(pairs
        .get(&digest)
        .map(|pair| Rc::clone(&pair.value))
        .unwrap_or_else(null))
}
