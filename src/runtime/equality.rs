//! The three equality predicates.
//!
//! `eq` and `eql` coincide here: numbers, characters and strings are immutable
//! leaves, so two of them with the same value cannot be told apart and compare
//! equal by value. Pairs and conditions compare by identity.
//! `equal` compares structure.

use crate::data::{Object, Ptr, Storage};

use super::truth;

pub fn is_eq(store: &Storage, a: Ptr, b: Ptr) -> bool {
    // Symbols, classes and nil are identical exactly when their pointers are.
    if a == b {
        return true;
    }
    match (store.get(a), store.get(b)) {
        (Object::Integer(a), Object::Integer(b)) => a == b,
        // Bitwise, so 0.0 and -0.0 differ.
        (Object::Float(a), Object::Float(b)) => a.to_bits() == b.to_bits(),
        (Object::Character(a), Object::Character(b)) => a == b,
        (Object::String(ref a), Object::String(ref b)) => {
            *store.get_string(a) == *store.get_string(b)
        }
        _ => false,
    }
}

pub fn is_eql(store: &Storage, a: Ptr, b: Ptr) -> bool {
    is_eq(store, a, b)
}

/// Structural equality: same variant, with components recursively equal.
/// Conditions compare field by field.
pub fn is_equal(store: &Storage, a: Ptr, b: Ptr) -> bool {
    // Pairs still to compare; depth is bounded by memory, not the call stack.
    let mut pending = vec![(a, b)];
    while let Some((a, b)) = pending.pop() {
        if is_eql(store, a, b) {
            continue;
        }
        match (store.get(a), store.get(b)) {
            (Object::Pair(x), Object::Pair(y)) => {
                // Cars first.
                pending.push((x.cdr, y.cdr));
                pending.push((x.car, y.car));
            }
            (Object::Condition(x), Object::Condition(y)) if x.class() == y.class() => {
                pending.extend(x.fields().zip(y.fields()).map(|((_, p), (_, q))| (p, q)));
            }
            _ => return false,
        }
    }
    true
}

/// `T` if the objects are identical, otherwise nil.
pub fn eq<'a>(store: &'a Storage, a: Ptr<'a>, b: Ptr<'a>) -> Ptr<'a> {
    truth(store, is_eq(store, a, b))
}

pub fn eql<'a>(store: &'a Storage, a: Ptr<'a>, b: Ptr<'a>) -> Ptr<'a> {
    truth(store, is_eql(store, a, b))
}

/// `T` if the objects have the same structure, otherwise nil.
pub fn equal<'a>(store: &'a Storage, a: Ptr<'a>, b: Ptr<'a>) -> Ptr<'a> {
    truth(store, is_equal(store, a, b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Class, Condition};
    use crate::reader::parse_body;

    fn read<'a>(store: &'a Storage, input: &str) -> Ptr<'a> {
        let body = parse_body(store, input).unwrap();
        assert_eq!(body.len(), 1, "input {input:?}");
        body[0]
    }

    #[test]
    fn separately_read_lists() {
        let store = Storage::default();
        let a = read(&store, "(1 2 3)");
        let b = read(&store, "(1 2 3)");
        assert!(is_equal(&store, a, b));
        assert!(!is_eq(&store, a, b));
        assert!(!is_eql(&store, a, b));
        assert!(is_eq(&store, a, a));

        assert_eq!(equal(&store, a, b), store.put_symbol("T"));
        assert!(eq(&store, a, b).is_nil());
    }

    #[test]
    fn symbols_are_eq() {
        let store = Storage::default();
        let a = read(&store, "x");
        let b = read(&store, "X");
        assert!(is_eq(&store, a, b));
        assert!(!is_eq(&store, a, read(&store, "y")));
        assert!(is_eq(&store, Ptr::nil(), read(&store, "nil")));
        assert!(!is_eq(&store, Ptr::nil(), read(&store, "NIL")));
    }

    #[test]
    fn scalars_compare_by_value() {
        let store = Storage::default();
        let cases = [
            ("1", "1"),
            ("#x10", "16"),
            ("2.5", "25e-1"),
            ("#\\a", "#\\a"),
            ("\"s\"", "\"s\""),
        ];
        for (a, b) in cases {
            let (a, b) = (read(&store, a), read(&store, b));
            assert_ne!(a, b, "distinct objects");
            assert!(is_eq(&store, a, b));
            assert!(is_eql(&store, a, b));
            assert!(is_equal(&store, a, b));
        }
    }

    #[test]
    fn different_kinds_differ() {
        let store = Storage::default();
        let cases = [
            ("1", "1.0"),
            ("0.0", "-0.0"),
            ("\"a\"", "#\\a"),
            ("a", "\"A\""),
            ("()", "(nil)"),
        ];
        for (a, b) in cases {
            let (a, b) = (read(&store, a), read(&store, b));
            assert!(!is_eq(&store, a, b));
            assert!(!is_equal(&store, a, b));
        }
    }

    #[test]
    fn equal_is_structural() {
        let store = Storage::default();
        let cases = [
            ("(a (b \"c\") . 4)", "(a (b \"c\") . 4)", true),
            ("(a (b c))", "(a (b d))", false),
            ("(1 2)", "(1 2 3)", false),
            ("(1 2 . 3)", "(1 2 3)", false),
            ("((1.5) #\\x)", "((1.5) #\\x)", true),
        ];
        for (a, b, want) in cases {
            let (pa, pb) = (read(&store, a), read(&store, b));
            assert_eq!(is_equal(&store, pa, pb), want, "{a} vs {b}");
        }
    }

    #[test]
    fn long_lists() {
        let store = Storage::default();
        let a = store.put_list((0..100_000i64).map(|i| store.put(i)).collect::<Vec<_>>());
        let b = store.put_list((0..100_000i64).map(|i| store.put(i)).collect::<Vec<_>>());
        assert!(is_equal(&store, a, b));
    }

    #[test]
    fn deep_nesting() {
        let store = Storage::default();
        let depth = 100_000;
        let text = format!("{}x{}", "(".repeat(depth), ")".repeat(depth));
        let a = read(&store, &text);
        let b = read(&store, &text);
        assert!(is_equal(&store, a, b));

        let other = format!("{}y{}", "(".repeat(depth), ")".repeat(depth));
        assert!(!is_equal(&store, a, read(&store, &other)));
    }

    #[test]
    fn conditions() {
        let store = Storage::default();
        let a = store.put(Condition::parse_error(&store, "@bad", Class::Object));
        let b = store.put(Condition::parse_error(&store, "@bad", Class::Object));
        let c = store.put(Condition::parse_error(&store, "@bad", Class::Integer));
        let d = store.put(Condition::domain_error(store.put_string("@bad"), Class::Object));

        assert!(!is_eq(&store, a, b));
        assert!(is_eq(&store, a, a));
        assert!(is_equal(&store, a, b));
        assert!(!is_equal(&store, a, c));
        assert!(!is_equal(&store, a, d));
    }
}
