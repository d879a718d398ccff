//! Conditions: signaled errors as ordinary, inspectable objects.
//!
//! A condition never transfers control by itself. Fallible operations
//! return one in the `Err` half of their result; callers may also store it
//! (`store.put(condition)`) and treat it like any other instance.
//!
//! Field names follow ISLISP slot names (`STRING`, `EXPECTED-CLASS`, ...)
//! and are available through [`Condition::field`].

use std::fmt;

use super::{Class, Ptr, Storage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition<'a> {
    /// A token that does not denote any object.
    ParseError {
        /// The offending token text, as a string object.
        string: Ptr<'a>,
        expected_class: Class,
    },
    /// An argument outside the domain of an operation.
    DomainError { object: Ptr<'a>, expected_class: Class },
    /// A zero divisor.
    DivisionByZero {
        /// Symbol naming the operator.
        operation: Ptr<'a>,
        /// Proper list of the operands.
        operands: Ptr<'a>,
    },
    /// Any other arithmetic failure; here, a result that does not fit in an integer.
    ArithmeticError { operation: Ptr<'a>, operands: Ptr<'a> },
    /// A primitive called with the wrong number of arguments.
    ProgramError { operation: Ptr<'a>, operands: Ptr<'a> },
    UndefinedFunction { name: Ptr<'a> },
}

pub const STRING: &str = "STRING";
pub const EXPECTED_CLASS: &str = "EXPECTED-CLASS";
pub const OBJECT: &str = "OBJECT";
pub const OPERATION: &str = "OPERATION";
pub const OPERANDS: &str = "OPERANDS";
pub const NAME: &str = "NAME";

impl<'a> Condition<'a> {
    /// Parse error for the given token text.
    pub fn parse_error(store: &'a Storage, token: &str, expected_class: Class) -> Self {
        Condition::ParseError {
            string: store.put_string(token),
            expected_class,
        }
    }

    pub fn domain_error(object: Ptr<'a>, expected_class: Class) -> Self {
        Condition::DomainError {
            object,
            expected_class,
        }
    }

    pub fn division_by_zero(store: &'a Storage, operation: &str, operands: &[Ptr<'a>]) -> Self {
        Condition::DivisionByZero {
            operation: store.put_symbol(operation),
            operands: store.put_list(operands.iter().copied()),
        }
    }

    pub fn arithmetic_error(store: &'a Storage, operation: &str, operands: &[Ptr<'a>]) -> Self {
        Condition::ArithmeticError {
            operation: store.put_symbol(operation),
            operands: store.put_list(operands.iter().copied()),
        }
    }

    pub fn program_error(store: &'a Storage, operation: &str, operands: &[Ptr<'a>]) -> Self {
        Condition::ProgramError {
            operation: store.put_symbol(operation),
            operands: store.put_list(operands.iter().copied()),
        }
    }

    /// The class this condition is a direct instance of.
    pub fn class(&self) -> Class {
        match self {
            Condition::ParseError { .. } => Class::ParseError,
            Condition::DomainError { .. } => Class::DomainError,
            Condition::DivisionByZero { .. } => Class::DivisionByZero,
            Condition::ArithmeticError { .. } => Class::ArithmeticError,
            Condition::ProgramError { .. } => Class::ProgramError,
            Condition::UndefinedFunction { .. } => Class::UndefinedFunction,
        }
    }

    pub fn field_names(&self) -> &'static [&'static str] {
        match self {
            Condition::ParseError { .. } => &[STRING, EXPECTED_CLASS],
            Condition::DomainError { .. } => &[OBJECT, EXPECTED_CLASS],
            Condition::DivisionByZero { .. }
            | Condition::ArithmeticError { .. }
            | Condition::ProgramError { .. } => &[OPERATION, OPERANDS],
            Condition::UndefinedFunction { .. } => &[NAME],
        }
    }

    /// Look up a field by its slot name.
    /// Class-valued fields are returned as class objects.
    pub fn field(&self, name: &str) -> Option<Ptr<'a>> {
        match (*self, name) {
            (Condition::ParseError { string, .. }, STRING) => Some(string),
            (Condition::DomainError { object, .. }, OBJECT) => Some(object),
            (Condition::ParseError { expected_class, .. }, EXPECTED_CLASS)
            | (Condition::DomainError { expected_class, .. }, EXPECTED_CLASS) => {
                Some(Ptr::class(expected_class))
            }
            (Condition::DivisionByZero { operation, .. }, OPERATION)
            | (Condition::ArithmeticError { operation, .. }, OPERATION)
            | (Condition::ProgramError { operation, .. }, OPERATION) => Some(operation),
            (Condition::DivisionByZero { operands, .. }, OPERANDS)
            | (Condition::ArithmeticError { operands, .. }, OPERANDS)
            | (Condition::ProgramError { operands, .. }, OPERANDS) => Some(operands),
            (Condition::UndefinedFunction { name }, NAME) => Some(name),
            _ => None,
        }
    }

    /// The fields in declaration order, paired with their names.
    pub fn fields(&self) -> impl '_ + Iterator<Item = (&'static str, Ptr<'a>)> {
        self.field_names()
            .iter()
            .filter_map(|name| self.field(name).map(|v| (*name, v)))
    }

    /// Detach the condition from its storage lifetime, for storing inside that storage.
    pub(super) fn unbind(self) -> Condition<'static> {
        let ub = |p: Ptr<'a>| Ptr::unbound(p.raw);
        match self {
            Condition::ParseError {
                string,
                expected_class,
            } => Condition::ParseError {
                string: ub(string),
                expected_class,
            },
            Condition::DomainError {
                object,
                expected_class,
            } => Condition::DomainError {
                object: ub(object),
                expected_class,
            },
            Condition::DivisionByZero {
                operation,
                operands,
            } => Condition::DivisionByZero {
                operation: ub(operation),
                operands: ub(operands),
            },
            Condition::ArithmeticError {
                operation,
                operands,
            } => Condition::ArithmeticError {
                operation: ub(operation),
                operands: ub(operands),
            },
            Condition::ProgramError {
                operation,
                operands,
            } => Condition::ProgramError {
                operation: ub(operation),
                operands: ub(operands),
            },
            Condition::UndefinedFunction { name } => {
                Condition::UndefinedFunction { name: ub(name) }
            }
        }
    }
}

/// The class, and the expected class where there is one.
/// Fields that live in storage are left out; [`Storage::display`] shows them.
impl fmt::Display for Condition<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.class())?;
        match self {
            Condition::ParseError { expected_class, .. }
            | Condition::DomainError { expected_class, .. } => {
                write!(f, ", expected {expected_class}")
            }
            _ => Ok(()),
        }
    }
}

impl std::error::Error for Condition<'_> {}
