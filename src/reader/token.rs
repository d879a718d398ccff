//! Module for extracting Lisp tokens from an input stream.

use super::{LexError, TokenOffset, TokenSource};

/// A token source over a byte buffer.
///
/// Whitespace, line comments (`;`) and block comments (`#| ... |#`) are skipped.
/// Token text is passed through as written; the reader interprets it.
pub struct Tokenizer<'a> {
    input: &'a [u8],
    // Position of the cursor, from 0; fixed up in TokenOffset.
    line: usize,
    column: usize,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Tokenizer {
            input,
            line: 0,
            column: 0,
        }
    }
}

impl TokenSource for Tokenizer<'_> {
    fn next_token(&mut self) -> Result<Option<TokenOffset>, LexError> {
        while !self.input.is_empty() {
            let next = get_next_token(self.input);

            let (line, column) = (self.line, self.column);
            let (lines, columns) = cursor_distance(&self.input[..next.consumed]);
            self.line += lines;
            if lines > 0 {
                self.column = columns
            } else {
                self.column += columns;
            }
            self.input = &self.input[next.consumed..];

            // Errors consume their input too, so a caller can report one and keep reading.
            match next.token {
                Ok(Some(token)) => return Ok(Some(TokenOffset::new(line, column, token))),
                Ok(None) => (),
                Err(err) => {
                    return Err(err.annotate(format!(
                        "at line {} column {}",
                        line + 1,
                        column + 1
                    )))
                }
            }
        }
        Ok(None)
    }
}

struct NextToken {
    // Token retrieved, if any, or the error for the consumed input.
    // None if only whitespace or a comment was consumed.
    token: Result<Option<String>, LexError>,
    // Bytes of input consumed.
    consumed: usize,
}

mod regex {
    use regex::bytes::Regex;
    use std::sync::OnceLock;

    pub(super) fn space() -> &'static Regex {
        static SPACE: OnceLock<Regex> = OnceLock::new();
        SPACE.get_or_init(|| {
            Regex::new("\\A[[:space:]]+").expect("could not compile regex for empty space")
        })
    }

    pub(super) fn comment() -> &'static Regex {
        static MATCH: OnceLock<Regex> = OnceLock::new();
        // Bytes, not characters: a comment may hold anything up to the newline.
        MATCH.get_or_init(|| {
            Regex::new(r#"\A(?-u);[^\n]*"#).expect("could not compile regex for comment")
        })
    }

    pub(super) fn block_comment() -> &'static Regex {
        static MATCH: OnceLock<Regex> = OnceLock::new();
        MATCH.get_or_init(|| {
            Regex::new(r#"\A(?s-u)#\|.*?\|#"#).expect("could not compile regex for block comment")
        })
    }

    pub(super) fn string() -> &'static Regex {
        static STRING: OnceLock<Regex> = OnceLock::new();
        STRING.get_or_init(|| {
            // Quote,
            // followed by:
            //  - a backslash + character (an escaped character, of any sort), or
            //  - any character other than a quote or backslash
            // repeatedly
            // We do _not_ require the trailing quote; we check that after consuming the
            // regex, so we can return "early end" if we haven't closed the quote.
            Regex::new(r#"\A(?s)"(\\.|[^"\\])*"#).expect("could not compile regex for string")
        })
    }

    pub(super) fn pipe_symbol() -> &'static Regex {
        static MATCH: OnceLock<Regex> = OnceLock::new();
        // As with strings, the closing pipe is checked separately.
        MATCH.get_or_init(|| {
            Regex::new(r#"\A\|[^|]*"#).expect("could not compile regex for pipe symbol")
        })
    }

    pub(super) fn character() -> &'static Regex {
        static MATCH: OnceLock<Regex> = OnceLock::new();
        MATCH.get_or_init(|| {
            // A named character (#\space), or any single character (#\( included).
            Regex::new(r#"\A#\\([[:alpha:]]+|.)"#).expect("could not compile regex for character")
        })
    }

    pub(super) fn atom() -> &'static Regex {
        static MATCH: OnceLock<Regex> = OnceLock::new();
        MATCH.get_or_init(|| {
            Regex::new(r#"\A[^;[:space:]()'`,"|]+"#).expect("could not compile regex for atom")
        })
    }
}

/// Returns the (line, column) that the cursor ends at, after following the given path,
/// assuming it started at (0, 0).
/// Tabs still count as a single column
fn cursor_distance(s: &[u8]) -> (usize, usize) {
    let line_count = s.iter().filter(|&&c| c == b'\n').count();
    let last_line_start = s
        .iter()
        .rposition(|&c| c == b'\n')
        .map(|x| x + 1)
        .unwrap_or(0);
    (line_count, s.len() - last_line_start)
}

fn token(s: &[u8]) -> NextToken {
    let token = std::str::from_utf8(s)
        .map(|text| Some(text.to_owned()))
        .map_err(|_| LexError::Invalid(String::from_utf8_lossy(s).into_owned()));
    NextToken {
        token,
        consumed: s.len(),
    }
}

fn skip(s: &[u8]) -> NextToken {
    NextToken {
        token: Ok(None),
        consumed: s.len(),
    }
}

fn incomplete(input: &[u8], what: &str) -> NextToken {
    NextToken {
        token: Err(LexError::Incomplete(format!("unterminated {what}"))),
        consumed: input.len(),
    }
}

/// Finish a token that runs to a closing delimiter.
/// `found` is the opening delimiter plus the contents the matcher accepted.
fn delimited(input: &[u8], found: &[u8], close: u8, what: &str) -> NextToken {
    // The contents matcher stops at the delimiter, at a dangling escape,
    // or at bytes that are not UTF-8; the last is caught by token().
    match input[found.len()..].iter().position(|&c| c == close) {
        Some(end) => token(&input[..found.len() + end + 1]),
        None => incomplete(input, what),
    }
}

/// Get the next token from the input.
fn get_next_token(input: &[u8]) -> NextToken {
    // Shouldn't bother calling if the remainder is none.
    assert!(!input.is_empty());

    // Fixed matchers:
    for fixed in [&b",@"[..], b"#'", b"(", b")", b"'", b"`", b","] {
        if input.starts_with(fixed) {
            return token(fixed);
        }
    }

    // Regex matchers:
    if let Some(space) = regex::space().find(input) {
        return skip(space.as_bytes());
    }
    if let Some(s) = regex::comment().find(input) {
        return skip(s.as_bytes());
    }
    if input.starts_with(b"#|") {
        return match regex::block_comment().find(input) {
            Some(s) => skip(s.as_bytes()),
            None => incomplete(input, "block comment"),
        };
    }
    if let Some(s) = regex::character().find(input) {
        return token(s.as_bytes());
    }
    if let Some(s) = regex::string().find(input) {
        return delimited(input, s.as_bytes(), b'"', "string");
    }
    if let Some(s) = regex::pipe_symbol().find(input) {
        return delimited(input, s.as_bytes(), b'|', "symbol");
    }
    if let Some(s) = regex::atom().find(input) {
        return token(s.as_bytes());
    }

    // Only bytes that are not UTF-8 get here.
    let bad = input.iter().take_while(|c| !c.is_ascii()).count().max(1);
    token(&input[..bad])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(input: &[u8]) -> Result<Vec<TokenOffset>, LexError> {
        let mut tokenizer = Tokenizer::new(input);
        let mut result = Vec::new();
        while let Some(tok) = tokenizer.next_token()? {
            result.push(tok);
        }
        Ok(result)
    }

    fn texts(input: &[u8]) -> Vec<String> {
        tokenize(input)
            .unwrap_or_else(|e| panic!("failed to tokenize {:?}: {e}", String::from_utf8_lossy(input)))
            .into_iter()
            .map(|v| v.token)
            .collect()
    }

    #[test]
    fn recognize_atoms() {
        for sym in [
            "hello",
            "tree->list",
            "operator<>",
            "Queryable?",
            "IMPORTANT!",
            "1+",
            "-3.33",
            "#x1F",
            "#3a",
            ".",
        ] {
            let r = regex::atom();
            let m = r.find(sym.as_bytes()).map(|m| m.as_bytes());
            assert_eq!(m, Some(sym.as_bytes()), "did not find atom {sym}");
        }
    }

    #[test]
    fn tokenize_atoms() {
        let input = br#"hello "hi" world 24601 -6 -3.33 3.22 #\a #\space"#;
        assert_eq!(
            texts(input),
            [
                "hello", r#""hi""#, "world", "24601", "-6", "-3.33", "3.22", "#\\a", "#\\space"
            ]
        );
    }

    #[test]
    fn tokenize_parens() {
        let input = b"(1)( 2 ) (a . b)(hello (\"hi\"))";
        assert_eq!(
            texts(input),
            [
                "(", "1", ")", "(", "2", ")", "(", "a", ".", "b", ")", "(", "hello", "(",
                "\"hi\"", ")", ")"
            ]
        );
    }

    #[test]
    fn tokenize_unbalanced() {
        assert_eq!(texts(b")))()("), [")", ")", ")", "(", ")", "("]);
    }

    #[test]
    fn tokenize_macros() {
        let input = b"'a `(b ,c ,@d) #'car #2a((1 2) (3 4))";
        assert_eq!(
            texts(input),
            [
                "'", "a", "`", "(", "b", ",", "c", ",@", "d", ")", "#'", "car", "#2a", "(", "(",
                "1", "2", ")", "(", "3", "4", ")", ")"
            ]
        );
    }

    #[test]
    fn character_delimiters() {
        assert_eq!(texts(br"(#\( #\) #\;)"), ["(", "#\\(", "#\\)", "#\\;", ")"]);
    }

    #[test]
    fn skip_comments() {
        let input = b"a ; the rest is ignored (\n#| block\n comment |# b #||# c";
        assert_eq!(texts(input), ["a", "b", "c"]);
    }

    #[test]
    fn pipe_symbols() {
        assert_eq!(texts(b"(|hello world| x)"), ["(", "|hello world|", "x", ")"]);
    }

    #[test]
    fn token_positions() {
        let input = b"(a\n  bc)";
        let got: Vec<(String, usize, usize)> = tokenize(input)
            .unwrap()
            .into_iter()
            .map(|t| (t.token, t.line, t.column))
            .collect();
        assert_eq!(
            got,
            [
                ("(".to_owned(), 1, 1),
                ("a".to_owned(), 1, 2),
                ("bc".to_owned(), 2, 3),
                (")".to_owned(), 2, 5),
            ]
        );
    }

    #[test]
    fn error_on_unexpected_stringend() {
        let input = br#"(
"hello1"
 "hello

)"#;
        // Our example ends with the string-start at line 3 (1-indexed),
        // column 2 (1-indexed)

        match tokenize(input) {
            Ok(_) => panic!("expected error for input"),
            Err(LexError::Invalid(e)) => panic!(
                "got terminal error, expected incomplete error; got: {:?}",
                e
            ),
            Err(LexError::Incomplete(e)) => {
                // We got the error that we want...Does it have the useful debug info?
                assert!(e.contains("line 3"), "missing line info from error string: {:?}", e);
                assert!(e.contains("column 2"), "missing column info from error string: {:?}", e);
            }
        }
    }

    #[test]
    fn error_on_escaped_stringend() {
        // This Lisp string has:
        // - An unescaped quote (which starts a string)
        // - An escaped quote (which is a quote, inside the string)
        // - An escaped backslash (which is a backslash, inside the string)
        // - An escaped quote (which is a quote, inside the string)
        // But no end-quote, so it's incomplete.
        let input = br#"
            "\"hello\\\"
        "#;

        match tokenize(input) {
            Err(LexError::Incomplete(_)) => (),
            v => panic!("expected incomplete error, got: {:?}", v),
        }
    }

    #[test]
    fn unterminated_delimiters() {
        for input in [&b"|abc"[..], b"#| never closed", b"(a #| b"] {
            match tokenize(input) {
                Err(LexError::Incomplete(_)) => (),
                v => panic!("expected incomplete error, got: {:?}", v),
            }
        }
    }

    #[test]
    fn string_escapes_are_verbatim() {
        // The string spans a line; escapes are kept as written.
        let input = br#"
            "\"hello\\\"
            "
        "#;

        let tokens = tokenize(input).unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(
            tokens[0].token,
            r#""\"hello\\\"
            ""#
        );
        assert_eq!((tokens[0].line, tokens[0].column), (2, 13));
    }

    #[test]
    fn invalid_utf8() {
        let mut tokenizer = Tokenizer::new(b"abc \xff\xfe def \"\xff\" ghi");
        let mut next = || tokenizer.next_token().map(|t| t.map(|t| t.token));
        assert_eq!(next(), Ok(Some("abc".to_owned())));
        assert!(matches!(next(), Err(LexError::Invalid(_))));
        // Reading continues after the bad input.
        assert_eq!(next(), Ok(Some("def".to_owned())));
        assert!(matches!(next(), Err(LexError::Invalid(_))));
        assert_eq!(next(), Ok(Some("ghi".to_owned())));
        assert_eq!(next(), Ok(None));
    }

    #[test]
    fn comments_skip_invalid_utf8() {
        assert_eq!(texts(b"; caf\xe9 (delete-everything)\n42"), ["42"]);
        assert_eq!(texts(b"#| caf\xe9\n\xff |# 42 ; \xfe"), ["42"]);

        let tokens = tokenize(b"#| \xff\n |# x").unwrap();
        assert_eq!((tokens[0].line, tokens[0].column), (2, 5));
    }
}
