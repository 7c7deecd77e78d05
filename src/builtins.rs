use std::fmt;
use std::rc::Rc;

use crate::evaluator::{EvalError, EvalResult, Evaluator};
use crate::object::{Object, ObjectRef, null};

pub type BuiltinFn = fn(&mut Evaluator, Vec<ObjectRef>) -> EvalResult;

/// A native function. Looked up by name after the environment chain.
#[derive(Clone, Copy)]
pub struct Builtin {
    pub name: &'static str,
    pub func: BuiltinFn,
}

impl fmt::Debug for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Builtin").field(&self.name).finish()
    }
}

pub static BUILTINS: &[Builtin] = &[
    Builtin { name: "len", func: builtin_len },
    Builtin { name: "head", func: builtin_head },
    Builtin { name: "tail", func: builtin_tail },
    Builtin { name: "rest", func: builtin_rest },
    Builtin { name: "get", func: builtin_get },
    Builtin { name: "insert", func: builtin_insert },
    Builtin { name: "append", func: builtin_append },
    Builtin { name: "isEmpty", func: builtin_is_empty },
    Builtin { name: "doWhile", func: builtin_do_while },
    Builtin { name: "print", func: builtin_print },
];

pub fn lookup(name: &str) -> Option<Builtin> {
    BUILTINS.iter().find(|builtin| builtin.name == name).copied()
}

/// Names of every built-in, in table order.
pub fn names() -> impl Iterator<Item = &'static str> {
    BUILTINS.iter().map(|builtin| builtin.name)
}

// Checks the number of arguments
macro_rules! check_arity {
    // Minimum number of args
    ($args:expr, min $expected:expr, $name:expr) => {
        if $args.len() < $expected {
            return Err(EvalError::InvalidArgument(format!(
                "`{}` expects at least {} arguments, got {}",
                $name,
                $expected,
                $args.len()
            )));
        }
    };
    // Exact number of args
    ($args:expr, $expected:expr) => {
        if $args.len() != $expected {
            return Err(EvalError::WrongArgumentCount {
                want: $expected,
                got: $args.len(),
            });
        }
    };
}

// Extracts the elements of an array argument or returns InvalidArgument
macro_rules! expect_array {
    ($arg:expr, $name:expr) => {
        match &*$arg.borrow() {
            Object::Array(elements) => elements.clone(),
            _ => return Err(unsupported($name, &$arg)),
        }
    };
}

macro_rules! expect_integer {
    ($arg:expr, $name:expr) => {
        match &*$arg.borrow() {
            Object::Integer(value) => *value,
            _ => return Err(unsupported($name, &$arg)),
        }
    };
}

fn unsupported(name: &str, argument: &ObjectRef) -> EvalError {
    EvalError::InvalidArgument(format!(
        "argument to `{}` not supported, got {}",
        name,
        argument.borrow().kind()
    ))
}

// Position `index` of a sequence of length `len`, if it is in range
fn checked_position(index: i64, len: usize) -> EvalResult<usize> {
    usize::try_from(index)
        .ok()
        .filter(|&i| i < len)
        .ok_or(EvalError::IndexOutOfRange { index, len })
}

fn string(value: String) -> ObjectRef {
    Object::Str(value).into_ref()
}

fn builtin_len(_: &mut Evaluator, args: Vec<ObjectRef>) -> EvalResult {
    check_arity!(args, 1);
    let len = match &*args[0].borrow() {
        Object::Str(value) => value.chars().count(),
        Object::Array(elements) => elements.len(),
        _ => return Err(unsupported("len", &args[0])),
    };
    Ok(Object::Integer(len as i64).into_ref())
}

fn builtin_head(_: &mut Evaluator, args: Vec<ObjectRef>) -> EvalResult {
    check_arity!(args, 1);
    match &*args[0].borrow() {
        Object::Array(elements) => Ok(elements.first().map(Rc::clone).unwrap_or_else(null)),
        Object::Str(value) => Ok(value
            .chars()
            .next()
            .map(|c| string(c.to_string()))
            .unwrap_or_else(null)),
        _ => Err(unsupported("head", &args[0])),
    }
}

fn builtin_tail(_: &mut Evaluator, args: Vec<ObjectRef>) -> EvalResult {
    check_arity!(args, 1);
    match &*args[0].borrow() {
        Object::Array(elements) => Ok(elements.last().map(Rc::clone).unwrap_or_else(null)),
        Object::Str(value) => Ok(value
            .chars()
            .next_back()
            .map(|c| string(c.to_string()))
            .unwrap_or_else(null)),
        _ => Err(unsupported("tail", &args[0])),
    }
}

fn builtin_rest(_: &mut Evaluator, args: Vec<ObjectRef>) -> EvalResult {
    check_arity!(args, 1);
    match &*args[0].borrow() {
        Object::Array(elements) if elements.is_empty() => Ok(null()),
        Object::Array(elements) => Ok(Object::Array(elements[1..].to_vec()).into_ref()),
        Object::Str(value) if value.is_empty() => Ok(null()),
        Object::Str(value) => Ok(string(value.chars().skip(1).collect())),
        _ => Err(unsupported("rest", &args[0])),
    }
}

fn builtin_get(_: &mut Evaluator, args: Vec<ObjectRef>) -> EvalResult {
    check_arity!(args, 2);
    let elements = expect_array!(args[0], "get");
    let index = expect_integer!(args[1], "get");
    let position = checked_position(index, elements.len())?;
    Ok(Rc::clone(&elements[position]))
}

fn builtin_insert(_: &mut Evaluator, args: Vec<ObjectRef>) -> EvalResult {
    check_arity!(args, 3);
    let mut elements = expect_array!(args[0], "insert");
    let index = expect_integer!(args[1], "insert");
    let position = checked_position(index, elements.len())?;
    elements[position] = Rc::clone(&args[2]);
    Ok(Object::Array(elements).into_ref())
}

fn builtin_append(_: &mut Evaluator, args: Vec<ObjectRef>) -> EvalResult {
    check_arity!(args, min 1, "append");
    let mut elements = expect_array!(args[0], "append");
    elements.extend(args[1..].iter().map(Rc::clone));
    Ok(Object::Array(elements).into_ref())
}

fn builtin_is_empty(_: &mut Evaluator, args: Vec<ObjectRef>) -> EvalResult {
    check_arity!(args, 1);
    let empty = match &*args[0].borrow() {
        Object::Str(value) => value.is_empty(),
        Object::Array(elements) => elements.is_empty(),
        Object::Hash(pairs) => pairs.is_empty(),
        _ => return Err(unsupported("isEmpty", &args[0])),
    };
    Ok(Object::Boolean(empty).into_ref())
}

fn builtin_do_while(evaluator: &mut Evaluator, args: Vec<ObjectRef>) -> EvalResult {
    check_arity!(args, 1);
    if !matches!(&*args[0].borrow(), Object::Function(_)) {
        return Err(unsupported("doWhile", &args[0]));
    }
    loop {
        let result = evaluator.apply_function(&args[0], Vec::new())?;
        if matches!(&*result.borrow(), Object::Boolean(false)) {
            return Ok(null());
        }
    }
}

fn builtin_print(evaluator: &mut Evaluator, args: Vec<ObjectRef>) -> EvalResult {
    for arg in &args {
        let text = arg.borrow().to_string();
        evaluator.write_line(&text)?;
    }
    Ok(null())
}
