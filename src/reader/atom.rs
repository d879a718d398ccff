//! Classification of single, non-structural tokens.
//!
//! Each matcher is an anchored regex over the whole token.
//! They are tried in a fixed order and the first match wins:
//! several token shapes are subsets of others (a signed integer also
//! looks like the start of a float), so the order is part of the grammar.

use tracing::debug;

use crate::data::{Class, Condition, Ptr, Storage};

mod regex {
    use regex::Regex;
    use std::sync::OnceLock;

    pub(super) fn integer() -> &'static Regex {
        static MATCH: OnceLock<Regex> = OnceLock::new();
        MATCH.get_or_init(|| {
            Regex::new(r"^[-+]?[0-9]+$").expect("could not compile regex for integer")
        })
    }

    pub(super) fn binary() -> &'static Regex {
        static MATCH: OnceLock<Regex> = OnceLock::new();
        MATCH.get_or_init(|| {
            Regex::new(r"^#[bB]([-+]?[01]+)$").expect("could not compile regex for binary")
        })
    }

    pub(super) fn octal() -> &'static Regex {
        static MATCH: OnceLock<Regex> = OnceLock::new();
        MATCH.get_or_init(|| {
            Regex::new(r"^#[oO]([-+]?[0-7]+)$").expect("could not compile regex for octal")
        })
    }

    pub(super) fn hex() -> &'static Regex {
        static MATCH: OnceLock<Regex> = OnceLock::new();
        MATCH.get_or_init(|| {
            Regex::new(r"^#[xX]([-+]?[0-9a-fA-F]+)$").expect("could not compile regex for hex")
        })
    }

    pub(super) fn float() -> &'static Regex {
        static MATCH: OnceLock<Regex> = OnceLock::new();
        MATCH.get_or_init(|| {
            // The fractional part is mandatory; "3" and "3." are not floats.
            Regex::new(r"^[-+]?[0-9]+\.[0-9]+$").expect("could not compile regex for float")
        })
    }

    pub(super) fn exponent() -> &'static Regex {
        static MATCH: OnceLock<Regex> = OnceLock::new();
        MATCH.get_or_init(|| {
            Regex::new(r"^[-+]?[0-9]+(?:\.[0-9]+)?[eE][-+]?[0-9]+$")
                .expect("could not compile regex for exponent float")
        })
    }

    pub(super) fn character() -> &'static Regex {
        static MATCH: OnceLock<Regex> = OnceLock::new();
        MATCH.get_or_init(|| {
            Regex::new(r"^#\\([[:graph:]])$").expect("could not compile regex for character")
        })
    }

    pub(super) fn string() -> &'static Regex {
        static MATCH: OnceLock<Regex> = OnceLock::new();
        MATCH.get_or_init(|| Regex::new(r#"(?s)^".*"$"#).expect("could not compile regex for string"))
    }

    pub(super) fn symbol() -> &'static Regex {
        static MATCH: OnceLock<Regex> = OnceLock::new();
        MATCH.get_or_init(|| {
            // In order:
            // - keyword-style names, :key or &rest
            // - pipe-delimited names, taken as-is
            // - the arithmetic operators that look like numbers
            // - identifiers
            Regex::new(concat!(
                r"(?s)^(?:",
                r"[:&][a-zA-Z]+",
                r"|\|.*\|",
                r"|\+|-|1\+|1-",
                r"|[a-zA-Z<>/*=?_!$%\[\]^{}~][-a-zA-Z0-9+<>/*=?_!$%\[\]^{}~]*",
                r")$",
            ))
            .expect("could not compile regex for symbol")
        })
    }
}

/// Convert a single token into an object.
///
/// Returns a parse error whose `STRING` is the token if it does not denote any object.
pub fn parse_atom<'a>(store: &'a Storage, token: &str) -> Result<Ptr<'a>, Condition<'a>> {
    if regex::integer().is_match(token) {
        return parse_integer(store, token, token, 10);
    }
    for (re, radix) in [(regex::binary(), 2), (regex::octal(), 8), (regex::hex(), 16)] {
        if let Some(digits) = re.captures(token).and_then(|c| c.get(1)) {
            return parse_integer(store, token, digits.as_str(), radix);
        }
    }

    if regex::float().is_match(token) || regex::exponent().is_match(token) {
        return parse_float(store, token);
    }

    match token {
        "#\\newline" => return Ok(store.put('\n')),
        "#\\space" => return Ok(store.put(' ')),
        _ => (),
    }
    if let Some(c) = regex::character()
        .captures(token)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().chars().next())
    {
        return Ok(store.put(c));
    }

    if regex::string().is_match(token) {
        // Taken verbatim: quotes and escapes stay in the stored text.
        return Ok(store.put_string(token));
    }

    if token == "nil" {
        return Ok(Ptr::nil());
    }
    if regex::symbol().is_match(token) {
        return Ok(store.put_symbol(&token.to_uppercase()));
    }

    debug!(token, "token does not denote any object");
    Err(Condition::parse_error(store, token, Class::Object))
}

fn parse_integer<'a>(
    store: &'a Storage,
    token: &str,
    digits: &str,
    radix: u32,
) -> Result<Ptr<'a>, Condition<'a>> {
    match i64::from_str_radix(digits, radix) {
        Ok(i) => Ok(store.put(i)),
        Err(err) => {
            debug!(token, %err, "integer literal out of range");
            Err(Condition::parse_error(store, token, Class::Integer))
        }
    }
}

fn parse_float<'a>(store: &'a Storage, token: &str) -> Result<Ptr<'a>, Condition<'a>> {
    match token.parse::<f64>() {
        Ok(f) if f.is_finite() => Ok(store.put(f)),
        result => {
            debug!(token, ?result, "float literal out of range");
            Err(Condition::parse_error(store, token, Class::Float))
        }
    }
}
