//! Reader and object model for an ISLISP runtime.
//!
//! - [`data`] holds the object store, the class hierarchy, and conditions.
//! - [`reader`] turns tokens into stored objects.
//! - [`runtime`] provides equality and the integer primitives.

pub mod data;
pub mod reader;
pub mod runtime;

pub use data::{Class, Condition, Object, Pair, Ptr, Storage};
pub use reader::{parse, parse_atom, parse_body, ReadErr, ReadResult};
