use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::{FxHashMap, FxHashSet};
use thiserror::Error;

use crate::object::{ObjectKind, ObjectRef, copy_value, is_singleton};

/// Shared handle to a scope. Closures keep their defining scope alive
/// through one of these.
pub type Env = Rc<RefCell<Environment>>;

/// The cell a name is bound to. `=&` and parameter passing share cells, so
/// every name bound to one cell sees writes made through any of them.
pub type Slot = Rc<RefCell<ObjectRef>>;

// --- Environment Error ---
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EnvError {
    #[error("cannot assign {found} to `{name}`, which holds {expected}")]
    TypeMismatch {
        name: String,
        expected: ObjectKind,
        found: ObjectKind,
    },
}

// --- Environment Definition ---

#[derive(Debug, Default)]
pub struct Environment {
    outer: Option<Env>,
    bindings: FxHashMap<String, Slot>,
}

impl Environment {
    /// Creates a new, top-level (global) environment.
    pub fn new() -> Env {
        Rc::new(RefCell::new(Environment::default()))
    }

    /// Creates a new environment enclosed within an outer one.
    pub fn new_enclosed(outer: Env) -> Env {
        tracing::debug!("entering new scope");
        Rc::new(RefCell::new(Environment {
            outer: Some(outer),
            bindings: FxHashMap::default(),
        }))
    }

    /// Looks up a binding, walking outward through the enclosing scopes.
    /// The returned handle is the bound instance itself.
    pub fn get(&self, name: &str) -> Option<ObjectRef> {
        self.get_slot(name).map(|slot| Rc::clone(&slot.borrow()))
    }

    /// Looks up the cell `name` is bound to.
    pub fn get_slot(&self, name: &str) -> Option<Slot> {
        match self.bindings.get(name) {
            Some(slot) => Some(Rc::clone(slot)),
            None => self.outer.as_ref()?.borrow().get_slot(name),
        }
    }

    /// Binds `name` in this scope to a fresh cell holding exactly `value`,
    /// replacing any binding of the same name in this scope.
    pub fn bind(&mut self, name: impl Into<String>, value: ObjectRef) {
        self.bind_slot(name, Rc::new(RefCell::new(value)));
    }

    /// Binds `name` in this scope to an existing cell. Used for `=&` and
    /// parameters when the right-hand side names a variable.
    pub fn bind_slot(&mut self, name: impl Into<String>, slot: Slot) {
        let name = name.into();
        tracing::debug!(%name, "binding by identity");
        self.bindings.insert(name, slot);
    }

    /// Copy-or-mutate assignment.
    ///
    /// If `name` resolves anywhere up the chain, the bound instance is
    /// overwritten with a copy of `value` so every alias observes the write;
    /// both must have the same kind. Booleans and null are never mutated:
    /// the shared cell is pointed at the other singleton instead. An unbound
    /// name gets a new binding in this scope holding a copy.
    pub fn assign(&mut self, name: &str, value: &ObjectRef) -> Result<(), EnvError> {
        let Some(slot) = self.get_slot(name) else {
            tracing::debug!(name, "new binding");
            self.bind(name, copy_value(value));
            return Ok(());
        };
        let existing = Rc::clone(&slot.borrow());
        if Rc::ptr_eq(&existing, value) {
            return Ok(());
        }

        let expected = existing.borrow().kind();
        let found = value.borrow().kind();
        if expected != found {
            return Err(EnvError::TypeMismatch {
                name: name.to_string(),
                expected,
                found,
            });
        }

        if is_singleton(&existing) {
            tracing::debug!(name, "re-pointing cell");
            *slot.borrow_mut() = Rc::clone(value);
        } else {
            tracing::debug!(name, "overwriting bound value");
            let copied = value.borrow().deep_copy();
            *existing.borrow_mut() = copied;
        }
        Ok(())
    }

    fn add_identifiers(&self, identifiers: &mut FxHashSet<String>) {
        identifiers.extend(self.bindings.keys().cloned());
        if let Some(outer) = &self.outer {
            outer.borrow().add_identifiers(identifiers);
        }
    }

    /// Gets every identifier visible from this scope
    pub fn get_identifiers(&self) -> FxHashSet<String> {
        let mut identifiers = FxHashSet::default();
        self.add_identifiers(&mut identifiers);
        identifiers
    }
}
