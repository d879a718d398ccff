//! Tags for Lisp object pointers.
//!
//! This is kept as a separate module so the u8 repr is not exposed.

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Tag {
    Nil = Self::NIL,
    Integer = Self::INTEGER,
    Float = Self::FLOAT,
    Character = Self::CHARACTER,
    String = Self::STRING,

    Symbol = Self::SYMBOL,
    Class = Self::CLASS,

    Pair = Self::PAIR,
    Condition = Self::CONDITION,
}

impl Tag {
    const NIL: u8 = 0;
    const INTEGER: u8 = 1;
    const FLOAT: u8 = 2;
    const CHARACTER: u8 = 3;
    const STRING: u8 = 4;

    const SYMBOL: u8 = 5;
    const CLASS: u8 = 6;

    const PAIR: u8 = 7;
    const CONDITION: u8 = 8;

    /// Number of low bits of a pointer used for the tag.
    pub(super) const BITS: u32 = 4;
    pub(super) const MASK: u32 = (1 << Self::BITS) - 1;

    /// Immediate tags are never stored in the arena;
    /// the pointer index carries the whole value.
    pub(super) fn is_immediate(self) -> bool {
        matches!(self, Tag::Nil | Tag::Symbol | Tag::Class)
    }
}

impl From<u8> for Tag {
    fn from(value: u8) -> Self {
        match value {
            Self::NIL => Tag::Nil,
            Self::INTEGER => Tag::Integer,
            Self::FLOAT => Tag::Float,
            Self::CHARACTER => Tag::Character,
            Self::STRING => Tag::String,
            Self::SYMBOL => Tag::Symbol,
            Self::CLASS => Tag::Class,
            Self::PAIR => Tag::Pair,
            Self::CONDITION => Tag::Condition,
            v => unreachable!("invalid tag value {v}"),
        }
    }
}
