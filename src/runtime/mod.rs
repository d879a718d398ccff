//! Primitive operations over stored objects: truth values, equality, integer arithmetic.
//!
//! Primitives never transfer control; a failure is a [`Condition`] in the `Err` half
//! of the result. The [`Registry`] maps operator names to primitives for collaborators
//! (an evaluator, a REPL) that dispatch by symbol.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::data::{Class, Condition, Object, Ptr, Storage};

mod equality;
mod integer;

pub use equality::*;
pub use integer::*;

/// Name of the canonical true value.
pub const T: &str = "T";

/// The truth value for a host boolean: the symbol `T`, or nil.
pub fn truth(store: &Storage, value: bool) -> Ptr {
    if value {
        store.put_symbol(T)
    } else {
        Ptr::nil()
    }
}

/// Whether the object counts as true: anything but nil.
pub fn is_true(ptr: Ptr) -> bool {
    !ptr.is_nil()
}

pub type PrimitiveResult<'a> = Result<Ptr<'a>, Condition<'a>>;

/// A primitive, by shape.
#[derive(Clone, Copy)]
pub enum Primitive {
    /// One argument; may signal.
    Unary(for<'a> fn(&'a Storage, Ptr<'a>) -> PrimitiveResult<'a>),
    /// Two arguments; may signal.
    Binary(for<'a> fn(&'a Storage, Ptr<'a>, Ptr<'a>) -> PrimitiveResult<'a>),
    /// One argument; returns a truth value.
    Predicate(for<'a> fn(&'a Storage, Ptr<'a>) -> Ptr<'a>),
    /// Two arguments; returns a truth value.
    Relation(for<'a> fn(&'a Storage, Ptr<'a>, Ptr<'a>) -> Ptr<'a>),
}

impl Primitive {
    pub fn arity(&self) -> usize {
        match self {
            Primitive::Unary(_) | Primitive::Predicate(_) => 1,
            Primitive::Binary(_) | Primitive::Relation(_) => 2,
        }
    }

    fn apply<'a>(&self, store: &'a Storage, args: &[Ptr<'a>]) -> Option<PrimitiveResult<'a>> {
        Some(match (self, args) {
            (Primitive::Unary(f), &[a]) => f(store, a),
            (Primitive::Binary(f), &[a, b]) => f(store, a, b),
            (Primitive::Predicate(f), &[a]) => Ok(f(store, a)),
            (Primitive::Relation(f), &[a, b]) => Ok(f(store, a, b)),
            _ => return None,
        })
    }
}

/// The primitives every registry starts with.
pub const PRIMITIVES: &[(&str, Primitive)] = &[
    ("DIV", Primitive::Binary(div)),
    ("MOD", Primitive::Binary(modulo)),
    ("GCD", Primitive::Binary(gcd)),
    ("LCM", Primitive::Binary(lcm)),
    ("ISQRT", Primitive::Unary(isqrt)),
    ("INTEGERP", Primitive::Predicate(integerp)),
    ("EQ", Primitive::Relation(eq)),
    ("EQL", Primitive::Relation(eql)),
    ("EQUAL", Primitive::Relation(equal)),
];

/// Table of primitives, keyed by upper-case name.
///
/// Created by its owner and passed where needed; there is no global table.
#[derive(Clone)]
pub struct Registry {
    primitives: HashMap<String, Primitive>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// A registry holding the standard primitives.
    pub fn new() -> Self {
        let mut registry = Registry::empty();
        for &(name, primitive) in PRIMITIVES {
            registry.insert(name, primitive);
        }
        registry
    }

    /// A registry with no primitives.
    pub fn empty() -> Self {
        Registry {
            primitives: HashMap::new(),
        }
    }

    /// Add or replace a primitive.
    pub fn insert(&mut self, name: impl Into<String>, primitive: Primitive) -> Option<Primitive> {
        self.primitives.insert(name.into(), primitive)
    }

    pub fn get(&self, name: &str) -> Option<Primitive> {
        self.primitives.get(name).copied()
    }

    pub fn names(&self) -> impl '_ + Iterator<Item = &str> {
        self.primitives.keys().map(String::as_str)
    }

    /// Apply the primitive named by `operator` (a symbol) to the arguments.
    pub fn call<'a>(
        &self,
        store: &'a Storage,
        operator: Ptr<'a>,
        args: &[Ptr<'a>],
    ) -> PrimitiveResult<'a> {
        let Object::Symbol(sym) = store.get(operator) else {
            return Err(signal(Condition::domain_error(operator, Class::Symbol)));
        };
        // Release the symbol table before anything new is interned.
        let name = store.get_symbol(sym).to_owned();
        let Some(primitive) = self.get(&name) else {
            return Err(signal(Condition::UndefinedFunction { name: operator }));
        };
        trace!(operator = %name, args = args.len(), "calling primitive");
        primitive
            .apply(store, args)
            .unwrap_or_else(|| Err(signal(Condition::program_error(store, &name, args))))
    }
}

/// Log a condition on its way out of a primitive.
pub(crate) fn signal(condition: Condition) -> Condition {
    debug!(%condition, "signaling condition");
    condition
}
