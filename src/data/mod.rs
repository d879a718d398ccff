//! Lisp data types and storage.
//!
//! All objects live in a `Storage` arena and are addressed by `Ptr`s:
//! a tag plus an index, bound to the lifetime of the storage.
//! Pointer equality is object identity.
//!
//! - Nil is the reserved index 0 and is never stored.
//! - Symbols are interned; the pointer index is the intern ID,
//!   so two symbols with the same name are the same pointer.
//! - Classes are immediate; the pointer index is the class's position in [`Class::ALL`].
//! - Everything else (integers, floats, characters, strings, pairs, conditions)
//!   takes one slot in the arena.
//!
//! The store only grows. Nothing is mutated after it is put,
//! and everything is released when the `Storage` is dropped.

mod class;
mod condition;
mod objects;
mod tag;

use std::cell::{Ref, RefCell};
use std::ops::Range;

pub use class::*;
pub use condition::*;
pub use objects::*;
use string_interner::DefaultStringInterner;

use self::tag::Tag;

/// Storage allows representing all persistent objects.
#[derive(Default)]
pub struct Storage {
    generation: RefCell<Generation>,

    // Because symbols are interned, they are not lifetime-bound.
    symbols: RefCell<DefaultStringInterner>,
}

/// Stored objects and string contents.
struct Generation {
    objects: Vec<StoredValue>,
    string_data: String,
}

impl Default for Generation {
    fn default() -> Self {
        Self {
            // Always reserve the 0 index.
            objects: vec![StoredValue::Reserved],
            string_data: Default::default(),
        }
    }
}

impl Generation {
    /// Stores the Lisp object in storage.
    fn put(&mut self, stored: StoredValue, tag: Tag) -> StoredPtr {
        debug_assert!(!tag.is_immediate(), "{tag:?} values are never stored");
        let slot = self.objects.len();
        self.objects.push(stored);
        StoredPtr::new(slot, tag)
    }

    fn put_string(&mut self, content: &str) -> StoredString {
        let span = string_span(self.string_data.len(), content.len());
        self.string_data.push_str(content);
        span
    }

    fn get(&self, ptr: StoredPtr) -> StoredValue {
        let idx = ptr.idx();
        assert!(idx < self.objects.len());
        self.objects[idx]
    }
}

/// Offset and length of string content; the whole span must be addressable by u32.
fn string_span(offset: usize, length: usize) -> StoredString {
    let end = offset
        .checked_add(length)
        .and_then(|end| u32::try_from(end).ok());
    assert!(
        end.is_some(),
        "string content at {offset}+{length} does not fit in string storage"
    );
    StoredString {
        offset: offset as u32,
        length: length as u32,
    }
}

#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
pub struct StorageStats {
    pub objects: usize,
    pub string_data: usize,
    pub symbols: usize,
}

/// Bind is a trait for binding stored types to the storage that holds them:
/// applying the Storage object lifetime to the underlying object.
trait Bind<'a> {
    type Free;

    fn bind(store: &'a Storage, free: Self::Free) -> Self;
}

impl Storage {
    fn bind<'a, T: Bind<'a>>(&'a self, raw: T::Free) -> T {
        T::bind(self, raw)
    }

    pub fn current_stats(&self) -> StorageStats {
        let gen = self.generation.borrow();
        StorageStats {
            // Discount one object, the reserved nil index.
            objects: gen.objects.len() - 1,
            string_data: gen.string_data.len(),
            symbols: self.symbols.borrow().len(),
        }
    }

    /// Add a symbol to the symbol table, or find the existing one.
    ///
    /// The name is interned as given; the reader is responsible for case normalization.
    pub fn put_symbol(&self, symbol: &str) -> Ptr {
        let s = Symbol(self.symbols.borrow_mut().get_or_intern(symbol));
        self.bind(StoredPtr::new(s.to_usize(), Tag::Symbol))
    }

    /// Retrieve a symbol's name from the symbol table.
    pub fn get_symbol(&self, symbol: Symbol) -> Ref<'_, str> {
        let symtab = self.symbols.borrow();
        Ref::map(symtab, |v| {
            v.resolve(symbol.0).expect("retrieved nonexistent symbol")
        })
    }

    /// Add a string to the string content.
    pub fn put_string(&self, content: &str) -> Ptr {
        let mut gen = self.generation.borrow_mut();
        let s = gen.put_string(content);
        self.bind(gen.put(StoredValue::String(s), Tag::String))
    }

    /// Resolve a string to its contents.
    pub fn get_string<'a>(&'a self, s: &LString) -> Ref<'a, str> {
        let gen = self.generation.borrow();
        Ref::map(gen, |v| &v.string_data[s.raw.range()])
    }

    /// Stores the Lisp object in storage.
    pub fn put<'a>(&'a self, value: impl Into<Object<'a>>) -> Ptr<'a> {
        let value = value.into();
        let tag = value.tag();
        let stored = match value {
            Object::Nil => return Ptr::nil(),
            Object::Symbol(s) => return self.bind(StoredPtr::new(s.to_usize(), tag)),
            Object::Class(c) => return Ptr::class(c),
            Object::String(s) => {
                // Strings are immutable, so a new object can share the content.
                StoredValue::String(s.raw)
            }
            Object::Integer(i) => StoredValue::Integer(i),
            Object::Float(f) => StoredValue::Float(f),
            Object::Character(c) => StoredValue::Character(c),
            Object::Pair(p) => StoredValue::Pair(p.into()),
            Object::Condition(c) => StoredValue::Condition(c.unbind()),
        };
        let raw = self.generation.borrow_mut().put(stored, tag);
        self.bind(raw)
    }

    pub fn get<'a>(&'a self, ptr: Ptr<'a>) -> Object<'a> {
        match ptr.tag() {
            Tag::Nil => Object::Nil,
            Tag::Symbol => Object::Symbol(Symbol::from_usize(ptr.idx())),
            Tag::Class => Object::Class(Class::from_index(ptr.idx())),
            _ => {
                let stored = self.generation.borrow().get(ptr.raw);
                Object::new(ptr, stored)
            }
        }
    }

    /// Build a proper list of the given items.
    pub fn put_list<'a, I>(&'a self, items: I) -> Ptr<'a>
    where
        I: IntoIterator<Item = Ptr<'a>>,
        I::IntoIter: DoubleEndedIterator,
    {
        self.put_list_with_tail(items, Ptr::nil())
    }

    /// Build a list of the given items, with `tail` as the final cdr.
    pub fn put_list_with_tail<'a, I>(&'a self, items: I, tail: Ptr<'a>) -> Ptr<'a>
    where
        I: IntoIterator<Item = Ptr<'a>>,
        I::IntoIter: DoubleEndedIterator,
    {
        items
            .into_iter()
            .rev()
            .fold(tail, |cdr, car| self.put(Pair::cons(car, cdr)))
    }

    /// Iterate over the cars of a list.
    /// Iteration stops at the first cdr that is not a pair.
    pub fn list_items<'a>(&'a self, list: Ptr<'a>) -> ListItems<'a> {
        ListItems { store: self, next: list }
    }

    /// A proper list is a chain of pairs terminated by nil.
    pub fn is_proper_list(&self, ptr: Ptr<'_>) -> bool {
        let mut ptr = ptr;
        while let Object::Pair(Pair { cdr, .. }) = self.get(ptr) {
            ptr = cdr;
        }
        ptr.is_nil()
    }

    /// The class the object is a direct instance of.
    pub fn class_of(&self, ptr: Ptr<'_>) -> Class {
        match self.get(ptr) {
            Object::Nil => Class::Null,
            Object::Integer(_) => Class::Integer,
            Object::Float(_) => Class::Float,
            Object::Character(_) => Class::Character,
            Object::String(_) => Class::String,
            Object::Symbol(_) => Class::Symbol,
            Object::Class(_) => Class::BuiltInClass,
            Object::Pair(_) => Class::Cons,
            Object::Condition(c) => c.class(),
        }
    }

    /// Whether the object is an instance of the class or of one of its subclasses.
    pub fn instance_of(&self, class: Class, ptr: Ptr<'_>) -> bool {
        self.class_of(ptr).is_subclass_of(class)
    }

    /// Get a displayable representation of the object.
    pub fn display(&self, ptr: Ptr<'_>) -> String {
        let mut out = String::new();
        // Writes to a String cannot fail.
        let _ = self.display_into(&mut out, ptr);
        out
    }

    fn display_into(&self, out: &mut String, ptr: Ptr<'_>) -> std::fmt::Result {
        use std::fmt::Write;

        // Pieces still to write, last first; nesting is bounded by memory, not the call stack.
        enum Step<'a> {
            Value(Ptr<'a>),
            // The rest of a list, after an element.
            Rest(Ptr<'a>),
            Text(&'static str),
            Field(&'static str),
        }

        let mut steps = vec![Step::Value(ptr)];
        while let Some(step) = steps.pop() {
            let ptr = match step {
                Step::Value(ptr) => ptr,
                Step::Text(text) => {
                    out.push_str(text);
                    continue;
                }
                Step::Field(name) => {
                    write!(out, " {name} ")?;
                    continue;
                }
                Step::Rest(tail) => {
                    match self.get(tail) {
                        Object::Nil => out.push(')'),
                        Object::Pair(Pair { car, cdr }) => {
                            out.push(' ');
                            steps.push(Step::Rest(cdr));
                            steps.push(Step::Value(car));
                        }
                        _ => {
                            out.push_str(" . ");
                            steps.push(Step::Text(")"));
                            steps.push(Step::Value(tail));
                        }
                    }
                    continue;
                }
            };
            match self.get(ptr) {
                Object::Nil => write!(out, "nil")?,
                Object::Integer(i) => write!(out, "{i}")?,
                Object::Float(f) => write!(out, "{f:?}")?,
                Object::Character('\n') => write!(out, "#\\newline")?,
                Object::Character(' ') => write!(out, "#\\space")?,
                Object::Character(c) => write!(out, "#\\{c}")?,
                Object::String(s) => write!(out, "{:?}", &*self.get_string(&s))?,
                Object::Symbol(s) => write!(out, "{}", &*self.get_symbol(s))?,
                Object::Class(c) => write!(out, "{c}")?,
                Object::Pair(Pair { car, cdr }) => {
                    out.push('(');
                    steps.push(Step::Rest(cdr));
                    steps.push(Step::Value(car));
                }
                Object::Condition(c) => {
                    write!(out, "#<{}", c.class())?;
                    steps.push(Step::Text(">"));
                    let fields: Vec<_> = c.fields().collect();
                    for (name, value) in fields.into_iter().rev() {
                        steps.push(Step::Value(value));
                        steps.push(Step::Field(name));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Iterator over the elements of a list.
pub struct ListItems<'a> {
    store: &'a Storage,
    next: Ptr<'a>,
}

impl<'a> ListItems<'a> {
    /// What remains of the list: nil once a proper list is exhausted,
    /// or the terminal atom of a dotted list.
    pub fn tail(&self) -> Ptr<'a> {
        self.next
    }
}

impl<'a> Iterator for ListItems<'a> {
    type Item = Ptr<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let Pair { car, cdr } = self.store.get(self.next).as_pair()?;
        self.next = cdr;
        Some(car)
    }
}

#[derive(Clone, Copy, Debug)]
enum StoredValue {
    /// The nil index; never read.
    Reserved,

    Integer(Integer),
    Float(Float),
    Character(char),
    String(StoredString),
    Pair(StoredPair),
    Condition(Condition<'static>),
}

#[derive(Copy, Clone, Debug)]
struct StoredPair {
    car: StoredPtr,
    cdr: StoredPtr,
}

#[derive(Copy, Clone, Debug)]
struct StoredString {
    offset: u32,
    length: u32,
}

impl StoredString {
    fn len(&self) -> u32 {
        self.length
    }
    fn range(&self) -> Range<usize> {
        let start = self.offset as usize;
        let end = (self.offset + self.length) as usize;
        start..end
    }
}
