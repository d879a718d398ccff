//! Support for reading Lisp expressions from tokens.
//!
//! The reader pulls one token at a time from a [`TokenSource`] and builds
//! objects in a [`Storage`]. Callers read one top-level form per [`parse`]
//! call, until it returns `Ok(None)`.

use std::collections::VecDeque;

use crate::data::{Condition, Ptr, Storage};

mod atom;
mod parse;
mod token;

pub use atom::parse_atom;
pub use parse::parse;
pub use token::Tokenizer;

/// Parse the string as a sequence of Lisp expressions (i.e. a body).
pub fn parse_body<'a>(store: &'a Storage, input: &str) -> ReadResult<'a, Vec<Ptr<'a>>> {
    let mut tokens = Tokenizer::new(input.as_bytes());
    let mut body = Vec::new();
    while let Some(form) = parse(store, &mut tokens)? {
        body.push(form);
    }
    Ok(body)
}

/// Error type if a read does not complete.
///
/// A reader may experience a true parsing error, e.g. "())", that no additional input can fix.
/// This is distinct from a reader that gets an unexpected end-of-input, e.g. "(()":
/// it may be that more input will fix the issue.
///
/// If input is coming in interactively, this is a useful distinction;
/// in the first case, we'd want to indicate an error to the user,
/// while in the latter we'd like to prompt the user for more input.
#[derive(Debug, Clone)]
pub enum ReadErr<'a> {
    Error(Condition<'a>),
    Incomplete(String),
}

impl std::fmt::Display for ReadErr<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReadErr::Error(e) => write!(f, "error in input: {e}"),
            ReadErr::Incomplete(e) => write!(f, "incomplete input: {e}"),
        }
    }
}

impl std::error::Error for ReadErr<'_> {}

impl<'a> From<Condition<'a>> for ReadErr<'a> {
    fn from(value: Condition<'a>) -> Self {
        ReadErr::Error(value)
    }
}

/// The main result type for this module:
/// a T (token, expression, etc), or an error, or incomplete.
pub type ReadResult<'a, T> = Result<T, ReadErr<'a>>;

/// A token along with its starting position in the input stream.
/// Lines and columns are 1-indexed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenOffset {
    pub token: String,
    pub line: usize,
    pub column: usize,
}

impl TokenOffset {
    fn new(line: usize, column: usize, token: String) -> Self {
        // In useful output, lines and columns are 1-indexed
        TokenOffset {
            token,
            line: line + 1,
            column: column + 1,
        }
    }
}

/// Error from a token source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    /// Input that cannot begin any token; the offending text.
    Invalid(String),
    /// Input ended inside a token, e.g. an unterminated string.
    Incomplete(String),
}

impl LexError {
    /// Add additional context to an error.
    pub fn annotate(self, more: impl AsRef<str>) -> Self {
        match self {
            LexError::Invalid(e) => LexError::Invalid(e),
            LexError::Incomplete(e) => LexError::Incomplete(format!("{}: {}", more.as_ref(), e)),
        }
    }
}

impl std::fmt::Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LexError::Invalid(e) => write!(f, "invalid token {e:?}"),
            LexError::Incomplete(e) => write!(f, "incomplete token: {e}"),
        }
    }
}

impl std::error::Error for LexError {}

/// A source of lexical tokens.
///
/// Whitespace and comments are removed upstream;
/// each call yields the next token, or `None` at the end of input.
pub trait TokenSource {
    fn next_token(&mut self) -> Result<Option<TokenOffset>, LexError>;
}

/// A token source over already-split tokens.
///
/// Each token's "column" is its position in the sequence.
#[derive(Debug, Default, Clone)]
pub struct TokenList {
    tokens: VecDeque<TokenOffset>,
}

impl<S: Into<String>> FromIterator<S> for TokenList {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        let tokens = iter
            .into_iter()
            .enumerate()
            .map(|(i, token)| TokenOffset::new(0, i, token.into()))
            .collect();
        TokenList { tokens }
    }
}

impl TokenList {
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl TokenSource for TokenList {
    fn next_token(&mut self) -> Result<Option<TokenOffset>, LexError> {
        Ok(self.tokens.pop_front())
    }
}
