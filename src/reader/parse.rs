//! Structural parsing: lists, dotted pairs, and reader macros.

use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, trace};

use super::{parse_atom, LexError, ReadErr, ReadResult, TokenOffset, TokenSource};
use crate::data::{Class, Condition, Ptr, Storage};

/// What a single token read.
///
/// Closing parentheses and dots are only meaningful inside a list;
/// anywhere else they are errors, reported against their own token.
enum Form<'a> {
    Datum(Ptr<'a>),
    Open(TokenOffset),
    Close(TokenOffset),
    Dot(TokenOffset),
    /// A reader macro, with the head of its expansion: the datum that
    /// follows is appended to make the whole.
    Prefix(Vec<Ptr<'a>>, TokenOffset),
}

/// An expression still waiting for more input.
enum Frame<'a> {
    /// A list, with the elements read so far.
    List { items: Vec<Ptr<'a>>, open: TokenOffset },
    /// A dotted list, waiting for its tail.
    Tail {
        items: Vec<Ptr<'a>>,
        open: TokenOffset,
        dot: TokenOffset,
    },
    /// A reader macro, waiting for its argument.
    Prefix { head: Vec<Ptr<'a>>, tok: TokenOffset },
}

impl Frame<'_> {
    fn incomplete<'a>(&self) -> ReadErr<'a> {
        match self {
            Frame::List { open, .. } => incomplete("closing paren", open),
            Frame::Tail { dot, .. } => incomplete("expression", dot),
            Frame::Prefix { tok, .. } => incomplete("expression", tok),
        }
    }
}

/// Read one complete expression from the token source.
///
/// Returns `Ok(None)` if the source is exhausted before any token.
/// Open lists are kept on an explicit stack, so nesting depth is limited
/// only by memory.
pub fn parse<'a>(store: &'a Storage, tokens: &mut impl TokenSource) -> ReadResult<'a, Option<Ptr<'a>>> {
    let mut stack: Vec<Frame<'a>> = Vec::new();
    loop {
        let Some(form) = read_form(store, tokens)? else {
            return match stack.last() {
                None => Ok(None),
                Some(frame) => Err(frame.incomplete()),
            };
        };
        let mut datum = match form {
            Form::Datum(ptr) => ptr,
            Form::Open(open) => {
                stack.push(Frame::List {
                    items: Vec::new(),
                    open,
                });
                continue;
            }
            Form::Prefix(head, tok) => {
                stack.push(Frame::Prefix { head, tok });
                continue;
            }
            Form::Close(tok) => match stack.pop() {
                Some(Frame::List { items, .. }) => store.put_list(items),
                _ => return Err(unexpected(store, &tok)),
            },
            Form::Dot(dot) => match stack.pop() {
                Some(Frame::List { items, open }) if !items.is_empty() => {
                    stack.push(Frame::Tail { items, open, dot });
                    continue;
                }
                _ => return Err(unexpected(store, &dot)),
            },
        };

        // Hand the finished datum to the expressions waiting on it.
        loop {
            datum = match stack.pop() {
                None => return Ok(Some(datum)),
                Some(Frame::List { mut items, open }) => {
                    items.push(datum);
                    stack.push(Frame::List { items, open });
                    break;
                }
                Some(Frame::Prefix { mut head, .. }) => {
                    head.push(datum);
                    store.put_list(head)
                }
                Some(Frame::Tail { items, open, .. }) => match next_token(store, tokens)? {
                    Some(close) if close.token == ")" => store.put_list_with_tail(items, datum),
                    Some(other) => return Err(unexpected(store, &other)),
                    None => return Err(incomplete("closing paren", &open)),
                },
            };
        }
    }
}

fn next_token<'a>(
    store: &'a Storage,
    tokens: &mut impl TokenSource,
) -> ReadResult<'a, Option<TokenOffset>> {
    match tokens.next_token() {
        Ok(tok) => Ok(tok),
        Err(LexError::Invalid(text)) => {
            debug!(%text, "invalid token");
            Err(Condition::parse_error(store, &text, Class::Object).into())
        }
        Err(LexError::Incomplete(e)) => Err(ReadErr::Incomplete(e)),
    }
}

fn read_form<'a>(
    store: &'a Storage,
    tokens: &mut impl TokenSource,
) -> ReadResult<'a, Option<Form<'a>>> {
    let Some(tok) = next_token(store, tokens)? else {
        return Ok(None);
    };
    trace!(token = %tok.token, line = tok.line, column = tok.column, "read token");

    let macro_name = match tok.token.as_str() {
        "(" => return Ok(Some(Form::Open(tok))),
        ")" => return Ok(Some(Form::Close(tok))),
        "." => return Ok(Some(Form::Dot(tok))),
        "'" => "QUOTE",
        "`" => "BACKQUOTE",
        "," => "comma",
        ",@" => "commaat",
        "#'" => "FUNCTION",
        _ => {
            if let Some(size) = array_prefix().captures(&tok.token).and_then(|c| c.get(1)) {
                let head = array_head(store, size.as_str(), &tok)?;
                return Ok(Some(Form::Prefix(head, tok)));
            }
            let datum = parse_atom(store, &tok.token).map_err(|err| {
                debug!(token = %tok.token, line = tok.line, column = tok.column, "unrecognized atom");
                ReadErr::Error(err)
            })?;
            return Ok(Some(Form::Datum(datum)));
        }
    };
    // Expands to (NAME datum).
    Ok(Some(Form::Prefix(vec![store.put_symbol(macro_name)], tok)))
}

fn array_prefix() -> &'static Regex {
    static MATCH: OnceLock<Regex> = OnceLock::new();
    MATCH.get_or_init(|| Regex::new(r"^#([0-9]*)[aA]$").expect("could not compile regex for array"))
}

/// The head of an array literal `#Na<init>`, which expands to (ARRAY N init).
/// Without digits, the dimension is 1.
fn array_head<'a>(store: &'a Storage, size: &str, tok: &TokenOffset) -> ReadResult<'a, Vec<Ptr<'a>>> {
    let size: i64 = if size.is_empty() {
        1
    } else {
        size.parse().map_err(|err| {
            debug!(token = %tok.token, %err, "invalid array dimension");
            Condition::parse_error(store, &tok.token, Class::Integer)
        })?
    };
    Ok(vec![store.put_symbol("ARRAY"), store.put(size)])
}

fn unexpected<'a>(store: &'a Storage, tok: &TokenOffset) -> ReadErr<'a> {
    debug!(token = %tok.token, line = tok.line, column = tok.column, "unexpected token");
    Condition::parse_error(store, &tok.token, Class::Object).into()
}

fn incomplete<'a>(wanted: &str, after: &TokenOffset) -> ReadErr<'a> {
    ReadErr::Incomplete(format!(
        "expected {wanted} after {:?} at line {} column {}",
        after.token, after.line, after.column
    ))
}
