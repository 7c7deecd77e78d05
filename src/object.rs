use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::Hasher;
use std::rc::Rc;

use rustc_hash::FxHasher;

use crate::ast::FunctionLiteral;
use crate::builtins::Builtin;
use crate::environment::Env;
use crate::evaluator::EvalError;

/// A runtime value instance. Two `ObjectRef`s are the same instance exactly
/// when `Rc::ptr_eq` holds; the `RefCell` lets copy-or-mutate assignment
/// overwrite an instance so every alias sees the new contents.
pub type ObjectRef = Rc<RefCell<Object>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ObjectKind {
    Integer,
    Boolean,
    Str,
    Null,
    Array,
    Hash,
    Function,
    Builtin,
    ReturnValue,
    Error,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ObjectKind::Integer => "INTEGER",
            ObjectKind::Boolean => "BOOLEAN",
            ObjectKind::Str => "STRING",
            ObjectKind::Null => "NULL",
            ObjectKind::Array => "ARRAY",
            ObjectKind::Hash => "HASH",
            ObjectKind::Function => "FUNCTION",
            ObjectKind::Builtin => "BUILTIN",
            ObjectKind::ReturnValue => "RETURN_VALUE",
            ObjectKind::Error => "ERROR",
        };
        f.write_str(name)
    }
}

/// Type-tagged digest used to index hashes. Ordering only matters for
/// giving `inspect` a stable output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HashKey {
    pub kind: ObjectKind,
    pub value: u64,
}

#[derive(Debug, Clone)]
pub struct HashPair {
    pub key: ObjectRef,
    pub value: ObjectRef,
}

/// A closure: the literal is shared with the AST, `env` is the scope that was
/// current when the literal was evaluated.
#[derive(Clone)]
pub struct Function {
    pub literal: Rc<FunctionLiteral>,
    pub env: Env,
}

// The captured environment may contain this very function.
impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("parameters", &self.literal.parameters)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub enum Object {
    Integer(i64),
    Boolean(bool),
    Str(String),
    Null,
    Array(Vec<ObjectRef>),
    Hash(BTreeMap<HashKey, HashPair>),
    Function(Function),
    Builtin(Builtin),
    ReturnValue(ObjectRef),
    Error(EvalError),
}

thread_local! {
    static TRUE: ObjectRef = Rc::new(RefCell::new(Object::Boolean(true)));
    static FALSE: ObjectRef = Rc::new(RefCell::new(Object::Boolean(false)));
    static NULL: ObjectRef = Rc::new(RefCell::new(Object::Null));
}

/// The canonical `true` or `false` instance.
pub fn boolean(value: bool) -> ObjectRef {
    if value {
        TRUE.with(Rc::clone)
    } else {
        FALSE.with(Rc::clone)
    }
}

/// The canonical `null` instance.
pub fn null() -> ObjectRef {
    NULL.with(Rc::clone)
}

/// Booleans and null only ever exist as the canonical instances.
pub fn is_singleton(object: &ObjectRef) -> bool {
    matches!(&*object.borrow(), Object::Boolean(_) | Object::Null)
}

/// Returns an instance holding a copy of `object`'s value. Arrays and hashes
/// are copied element by element; booleans and null come back as the
/// singleton itself.
pub fn copy_value(object: &ObjectRef) -> ObjectRef {
    if is_singleton(object) {
        return Rc::clone(object);
    }
    let copied = object.borrow().deep_copy();
    Rc::new(RefCell::new(copied))
}

impl Object {
    /// Moves the value into a fresh instance, or hands out the singleton for
    /// booleans and null.
    pub fn into_ref(self) -> ObjectRef {
        match self {
            Object::Boolean(value) => boolean(value),
            Object::Null => null(),
            other => Rc::new(RefCell::new(other)),
        }
    }

    pub fn kind(&self) -> ObjectKind {
        match self {
            Object::Integer(_) => ObjectKind::Integer,
            Object::Boolean(_) => ObjectKind::Boolean,
            Object::Str(_) => ObjectKind::Str,
            Object::Null => ObjectKind::Null,
            Object::Array(_) => ObjectKind::Array,
            Object::Hash(_) => ObjectKind::Hash,
            Object::Function(_) => ObjectKind::Function,
            Object::Builtin(_) => ObjectKind::Builtin,
            Object::ReturnValue(_) => ObjectKind::ReturnValue,
            Object::Error(_) => ObjectKind::Error,
        }
    }

    /// `null` and `false` are falsy, everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Object::Null | Object::Boolean(false))
    }

    /// Digest for integers, booleans and strings; `None` for everything else.
    pub fn hash_key(&self) -> Option<HashKey> {
        let value = match self {
            Object::Integer(value) => *value as u64,
            Object::Boolean(value) => u64::from(*value),
            Object::Str(value) => {
                let mut hasher = FxHasher::default();
                hasher.write(value.as_bytes());
                hasher.finish()
            }
            _ => return None,
        };
        Some(HashKey {
            kind: self.kind(),
            value,
        })
    }

    /// Structural copy of this value. Nested arrays and hashes get fresh
    /// instances so the copy shares nothing mutable with the original.
    pub fn deep_copy(&self) -> Object {
        match self {
            Object::Integer(value) => Object::Integer(*value),
            Object::Boolean(value) => Object::Boolean(*value),
            Object::Str(value) => Object::Str(value.clone()),
            Object::Null => Object::Null,
            Object::Array(elements) => Object::Array(elements.iter().map(copy_value).collect()),
            Object::Hash(pairs) => Object::Hash(
                pairs
                    .iter()
                    .map(|(key, pair)| {
                        let pair = HashPair {
                            key: copy_value(&pair.key),
                            value: copy_value(&pair.value),
                        };
                        (*key, pair)
                    })
                    .collect(),
            ),
            Object::Function(function) => Object::Function(function.clone()),
            Object::Builtin(builtin) => Object::Builtin(*builtin),
            Object::ReturnValue(inner) => Object::ReturnValue(Rc::clone(inner)),
            Object::Error(error) => Object::Error(error.clone()),
        }
    }

    /// Equality of represented content. Values of different kinds are never
    /// equal.
    pub fn value_eq(&self, other: &Object) -> bool {
        match (self, other) {
            (Object::Integer(a), Object::Integer(b)) => a == b,
            (Object::Boolean(a), Object::Boolean(b)) => a == b,
            (Object::Str(a), Object::Str(b)) => a == b,
            (Object::Null, Object::Null) => true,
            (Object::Array(a), Object::Array(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .zip(b)
                        .all(|(x, y)| x.borrow().value_eq(&y.borrow()))
            }
            (Object::Hash(a), Object::Hash(b)) => {
                a.len() == b.len()
                    && a.iter().all(|(key, pair)| {
                        b.get(key)
                            .is_some_and(|other| pair.value.borrow().value_eq(&other.value.borrow()))
                    })
            }
            (Object::Function(a), Object::Function(b)) => {
                Rc::ptr_eq(&a.literal, &b.literal) && Rc::ptr_eq(&a.env, &b.env)
            }
            (Object::Builtin(a), Object::Builtin(b)) => a.name == b.name,
            (Object::ReturnValue(a), Object::ReturnValue(b)) => a.borrow().value_eq(&b.borrow()),
            (Object::Error(a), Object::Error(b)) => a == b,
            _ => false,
        }
    }
}

// Inspect form, as shown by the shell and `print`.
impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Object::Integer(value) => write!(f, "{}", value),
            Object::Boolean(value) => write!(f, "{}", value),
            Object::Str(value) => f.write_str(value),
            Object::Null => f.write_str("null"),
            Object::Array(elements) => {
                write!(f, "[")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", element.borrow())?;
                }
                write!(f, "]")
            }
            Object::Hash(pairs) => {
                write!(f, "{{")?;
                for (i, pair) in pairs.values().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", pair.key.borrow(), pair.value.borrow())?;
                }
                write!(f, "}}")
            }
            Object::Function(function) => write!(f, "{}", function.literal),
            Object::Builtin(builtin) => write!(f, "builtin function {}", builtin.name),
            Object::ReturnValue(inner) => write!(f, "{}", inner.borrow()),
            Object::Error(error) => write!(f, "ERROR: {}", error),
        }
    }
}
