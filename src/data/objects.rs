use std::marker::PhantomData;

use string_interner::{DefaultSymbol, Symbol as _};

use super::{Bind, Class, Condition, Storage, StoredPair, StoredString, StoredValue, Tag};

/// Enum for a Lisp object: a view of a stored value.
#[derive(Debug, Clone, Copy)]
pub enum Object<'a> {
    Nil,
    Integer(Integer),
    Float(Float),
    Character(char),
    String(LString<'a>),
    Symbol(Symbol),
    Class(Class),
    Pair(Pair<'a>),
    Condition(Condition<'a>),
}

pub type Integer = i64;
pub type Float = f64;

/// An ID for a stored object: a combination of index and type-tag.
///
/// Two pointers are equal exactly when they refer to the same object.
#[derive(Clone, Copy, Hash, PartialEq, Eq)]
pub struct Ptr<'a> {
    pub(super) raw: StoredPtr,
    store: PhantomData<&'a Storage>,
}

impl std::fmt::Display for Ptr<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.raw.fmt(f)
    }
}

impl std::fmt::Debug for Ptr<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ptr")
            .field("idx", &self.idx())
            .field("tag", &self.tag())
            .finish()
    }
}

impl Ptr<'_> {
    pub fn nil<'a>() -> Ptr<'a> {
        Default::default()
    }

    /// The immediate pointer for a class object.
    /// Classes are never stored, so this needs no storage.
    pub fn class<'a>(class: Class) -> Ptr<'a> {
        Ptr::unbound(StoredPtr::new(class.index(), Tag::Class))
    }

    pub(super) fn unbound<'a>(raw: StoredPtr) -> Ptr<'a> {
        Ptr {
            raw,
            store: PhantomData,
        }
    }

    #[inline]
    pub fn is_nil(&self) -> bool {
        self.raw.is_nil()
    }
    #[inline]
    pub fn is_integer(&self) -> bool {
        self.tag() == Tag::Integer
    }
    #[inline]
    pub fn is_float(&self) -> bool {
        self.tag() == Tag::Float
    }
    #[inline]
    pub fn is_symbol(&self) -> bool {
        self.tag() == Tag::Symbol
    }
    #[inline]
    pub fn is_condition(&self) -> bool {
        self.tag() == Tag::Condition
    }

    #[inline]
    pub(super) fn tag(&self) -> Tag {
        self.raw.tag()
    }

    #[inline]
    pub(super) fn idx(&self) -> usize {
        self.raw.idx()
    }
}

impl Default for Ptr<'_> {
    fn default() -> Self {
        Ptr::unbound(StoredPtr::default())
    }
}

impl From<Class> for Ptr<'_> {
    fn from(class: Class) -> Self {
        Ptr::class(class)
    }
}

impl<'a> Bind<'a> for Ptr<'a> {
    type Free = StoredPtr;

    fn bind(_store: &'a Storage, raw: Self::Free) -> Self {
        Ptr::unbound(raw)
    }
}

/// A "raw" pointer, without lifetime data.
/// This is the internal type for Storage; outside of storage,
/// the Ptr type provides a lifetime bound.
#[derive(Clone, Copy, Hash, PartialEq, Eq)]
pub(super) struct StoredPtr {
    combined_tag: u32,
}

impl Default for StoredPtr {
    fn default() -> Self {
        Self::new(0, Tag::Nil)
    }
}

impl StoredPtr {
    pub(super) fn new(idx: usize, tag: Tag) -> Self {
        assert!(
            idx < (1 << (u32::BITS - Tag::BITS)),
            "object index {idx} does not fit in a pointer"
        );
        StoredPtr {
            combined_tag: ((idx as u32) << Tag::BITS) | (tag as u32),
        }
    }

    #[inline]
    pub(super) fn tag(&self) -> Tag {
        ((self.combined_tag & Tag::MASK) as u8).into()
    }

    #[inline]
    pub(super) fn idx(&self) -> usize {
        (self.combined_tag >> Tag::BITS) as usize
    }

    #[inline]
    pub(super) fn is_nil(&self) -> bool {
        self.tag() == Tag::Nil
    }
}

impl std::fmt::Display for StoredPtr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self.tag() {
            Tag::Nil => "nil",
            Tag::Integer => "i64",
            Tag::Float => "f64",
            Tag::Character => "chr",
            Tag::String => "str",
            Tag::Symbol => "sym",
            Tag::Class => "cls",
            Tag::Pair => "obj",
            Tag::Condition => "cnd",
        };
        write!(f, "{}#{}", tag, self.idx())
    }
}

impl std::fmt::Debug for StoredPtr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredPtr")
            .field("idx", &self.idx())
            .field("tag", &self.tag())
            .finish()
    }
}

impl<'a> Object<'a> {
    pub(super) fn tag(&self) -> Tag {
        match self {
            Object::Nil => Tag::Nil,
            Object::Integer(_) => Tag::Integer,
            Object::Float(_) => Tag::Float,
            Object::Character(_) => Tag::Character,
            Object::String(_) => Tag::String,
            Object::Symbol(_) => Tag::Symbol,
            Object::Class(_) => Tag::Class,
            Object::Pair(_) => Tag::Pair,
            Object::Condition(_) => Tag::Condition,
        }
    }

    /// Rebuild the object from a stored value; `ptr` supplies the tag and lifetime.
    pub(super) fn new(ptr: Ptr<'a>, v: StoredValue) -> Self {
        match (ptr.tag(), v) {
            (Tag::Integer, StoredValue::Integer(i)) => Object::Integer(i),
            (Tag::Float, StoredValue::Float(f)) => Object::Float(f),
            (Tag::Character, StoredValue::Character(c)) => Object::Character(c),
            (Tag::String, StoredValue::String(raw)) => Object::String(LString {
                raw,
                store: PhantomData,
            }),
            (Tag::Pair, StoredValue::Pair(raw)) => Object::Pair(Pair {
                car: Ptr::unbound(raw.car),
                cdr: Ptr::unbound(raw.cdr),
            }),
            (Tag::Condition, StoredValue::Condition(c)) => Object::Condition(c),
            (tag, v) => panic!(
                "tag {tag:?} does not match stored value {v:?}, possible data corruption"
            ),
        }
    }

    pub fn as_integer(&self) -> Option<Integer> {
        match self {
            Object::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_pair(&self) -> Option<Pair<'a>> {
        match self {
            Object::Pair(p) => Some(*p),
            _ => None,
        }
    }
}

impl From<i64> for Object<'_> {
    fn from(value: i64) -> Self {
        Object::Integer(value)
    }
}

impl From<f64> for Object<'_> {
    fn from(value: f64) -> Self {
        Object::Float(value)
    }
}

impl From<char> for Object<'_> {
    fn from(value: char) -> Self {
        Object::Character(value)
    }
}

impl<'a> From<Pair<'a>> for Object<'a> {
    fn from(value: Pair<'a>) -> Self {
        Object::Pair(value)
    }
}

impl From<Symbol> for Object<'_> {
    fn from(value: Symbol) -> Self {
        Object::Symbol(value)
    }
}

impl From<Class> for Object<'_> {
    fn from(value: Class) -> Self {
        Object::Class(value)
    }
}

impl<'a> From<LString<'a>> for Object<'a> {
    fn from(value: LString<'a>) -> Self {
        Object::String(value)
    }
}

impl<'a> From<Condition<'a>> for Object<'a> {
    fn from(value: Condition<'a>) -> Self {
        Object::Condition(value)
    }
}

impl<'a> TryInto<Pair<'a>> for Object<'a> {
    type Error = &'static str;

    fn try_into(self) -> Result<Pair<'a>, Self::Error> {
        match self {
            Object::Pair(p) => Ok(p),
            _ => Err("object is not a pair"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Pair<'a> {
    pub car: Ptr<'a>,
    pub cdr: Ptr<'a>,
}

impl<'a> Pair<'a> {
    pub fn cons(car: Ptr<'a>, cdr: Ptr<'a>) -> Self {
        Self { car, cdr }
    }
}

impl From<Pair<'_>> for StoredPair {
    fn from(pair: Pair) -> Self {
        StoredPair {
            car: pair.car.raw,
            cdr: pair.cdr.raw,
        }
    }
}

impl<'a> Bind<'a> for Pair<'a> {
    type Free = StoredPair;

    fn bind(store: &'a Storage, raw: Self::Free) -> Self {
        Self {
            car: Ptr::bind(store, raw.car),
            cdr: Ptr::bind(store, raw.cdr),
        }
    }
}

/// An interned symbol name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Symbol(pub(super) DefaultSymbol);

impl Symbol {
    pub(super) fn to_usize(self) -> usize {
        self.0.to_usize()
    }

    pub(super) fn from_usize(idx: usize) -> Self {
        Symbol(
            DefaultSymbol::try_from_usize(idx)
                .unwrap_or_else(|| panic!("invalid symbol index {idx}, possible data corruption")),
        )
    }
}

/// A handle to stored string content.
#[derive(Debug, Clone, Copy)]
pub struct LString<'a> {
    pub(super) raw: StoredString,
    store: PhantomData<&'a Storage>,
}

impl LString<'_> {
    pub fn len(&self) -> u32 {
        self.raw.len()
    }
    pub fn is_empty(&self) -> bool {
        self.raw.len() == 0
    }
}

impl<'a> Bind<'a> for LString<'a> {
    type Free = StoredString;

    fn bind(_store: &'a Storage, raw: Self::Free) -> Self {
        Self {
            raw,
            store: PhantomData,
        }
    }
}
