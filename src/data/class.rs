//! The closed class hierarchy.
//!
//! ISLISP classes are ordinary objects, but this core only needs them for
//! membership tests and as condition fields. Each class carries a static
//! list of its ancestors, so `instance-of` is a slice lookup.

use std::fmt;

/// A built-in class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Class {
    Object,
    BuiltInClass,

    Number,
    Integer,
    Float,
    Character,
    Symbol,
    List,
    Cons,
    Null,
    BasicArray,
    BasicVector,
    String,

    SeriousCondition,
    Error,
    ArithmeticError,
    DivisionByZero,
    DomainError,
    ParseError,
    ProgramError,
    UndefinedEntity,
    UndefinedFunction,
}

use Class::*;

impl Class {
    /// Every class, in declaration order; the position is the class's pointer index.
    pub const ALL: [Class; 22] = [
        Object,
        BuiltInClass,
        Number,
        Integer,
        Float,
        Character,
        Symbol,
        List,
        Cons,
        Null,
        BasicArray,
        BasicVector,
        String,
        SeriousCondition,
        Error,
        ArithmeticError,
        DivisionByZero,
        DomainError,
        ParseError,
        ProgramError,
        UndefinedEntity,
        UndefinedFunction,
    ];

    /// The printed name of the class, e.g. `<integer>`.
    pub const fn name(self) -> &'static str {
        match self {
            Object => "<object>",
            BuiltInClass => "<built-in-class>",
            Number => "<number>",
            Integer => "<integer>",
            Float => "<float>",
            Character => "<character>",
            Symbol => "<symbol>",
            List => "<list>",
            Cons => "<cons>",
            Null => "<null>",
            BasicArray => "<basic-array>",
            BasicVector => "<basic-vector>",
            String => "<string>",
            SeriousCondition => "<serious-condition>",
            Error => "<error>",
            ArithmeticError => "<arithmetic-error>",
            DivisionByZero => "<division-by-zero>",
            DomainError => "<domain-error>",
            ParseError => "<parse-error>",
            ProgramError => "<program-error>",
            UndefinedEntity => "<undefined-entity>",
            UndefinedFunction => "<undefined-function>",
        }
    }

    /// The class itself, followed by all of its superclasses.
    /// `<object>` is always last.
    pub const fn ancestors(self) -> &'static [Class] {
        match self {
            Object => &[Object],
            BuiltInClass => &[BuiltInClass, Object],
            Number => &[Number, Object],
            Integer => &[Integer, Number, Object],
            Float => &[Float, Number, Object],
            Character => &[Character, Object],
            Symbol => &[Symbol, Object],
            List => &[List, Object],
            Cons => &[Cons, List, Object],
            Null => &[Null, Symbol, List, Object],
            BasicArray => &[BasicArray, Object],
            BasicVector => &[BasicVector, BasicArray, Object],
            String => &[String, BasicVector, BasicArray, Object],
            SeriousCondition => &[SeriousCondition, Object],
            Error => &[Error, SeriousCondition, Object],
            ArithmeticError => &[ArithmeticError, Error, SeriousCondition, Object],
            DivisionByZero => &[
                DivisionByZero,
                ArithmeticError,
                Error,
                SeriousCondition,
                Object,
            ],
            DomainError => &[DomainError, Error, SeriousCondition, Object],
            ParseError => &[ParseError, Error, SeriousCondition, Object],
            ProgramError => &[ProgramError, Error, SeriousCondition, Object],
            UndefinedEntity => &[UndefinedEntity, Error, SeriousCondition, Object],
            UndefinedFunction => &[
                UndefinedFunction,
                UndefinedEntity,
                Error,
                SeriousCondition,
                Object,
            ],
        }
    }

    pub fn is_subclass_of(self, other: Class) -> bool {
        self.ancestors().contains(&other)
    }

    pub(super) fn index(self) -> usize {
        self as usize
    }

    pub(super) fn from_index(idx: usize) -> Class {
        *Self::ALL
            .get(idx)
            .unwrap_or_else(|| panic!("invalid class index {idx}, possible data corruption"))
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::Class;

    #[test]
    fn index_roundtrip() {
        for (i, class) in Class::ALL.iter().enumerate() {
            assert_eq!(class.index(), i);
            assert_eq!(Class::from_index(i), *class);
        }
    }

    #[test]
    fn everything_is_an_object() {
        for class in Class::ALL {
            assert_eq!(class.ancestors().first(), Some(&class));
            assert_eq!(class.ancestors().last(), Some(&Class::Object));
        }
    }

    #[test]
    fn numeric_tower() {
        assert!(Class::Integer.is_subclass_of(Class::Number));
        assert!(Class::Float.is_subclass_of(Class::Number));
        assert!(!Class::Number.is_subclass_of(Class::Integer));
        assert!(!Class::Integer.is_subclass_of(Class::Float));
    }

    #[test]
    fn null_is_symbol_and_list() {
        assert!(Class::Null.is_subclass_of(Class::Symbol));
        assert!(Class::Null.is_subclass_of(Class::List));
        assert!(!Class::Cons.is_subclass_of(Class::Symbol));
    }

    #[test]
    fn condition_lattice() {
        assert!(Class::DivisionByZero.is_subclass_of(Class::ArithmeticError));
        assert!(Class::DivisionByZero.is_subclass_of(Class::Error));
        assert!(Class::ParseError.is_subclass_of(Class::SeriousCondition));
        assert!(!Class::DomainError.is_subclass_of(Class::ArithmeticError));
    }
}
