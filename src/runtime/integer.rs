//! Integer primitives.
//!
//! Arguments must be integers; anything else signals a domain error with
//! `EXPECTED-CLASS` `<integer>`. Integers are 64-bit: results that do not fit
//! signal an arithmetic error rather than wrapping.

use tracing::trace;

use crate::data::{Class, Condition, Integer, Ptr, Storage};

use super::{signal, truth, PrimitiveResult};

fn integer_arg<'a>(store: &'a Storage, z: Ptr<'a>) -> Result<Integer, Condition<'a>> {
    store
        .get(z)
        .as_integer()
        .ok_or_else(|| signal(Condition::domain_error(z, Class::Integer)))
}

fn integer_args<'a>(
    store: &'a Storage,
    z1: Ptr<'a>,
    z2: Ptr<'a>,
) -> Result<(Integer, Integer), Condition<'a>> {
    Ok((integer_arg(store, z1)?, integer_arg(store, z2)?))
}

fn overflow<'a>(store: &'a Storage, operation: &str, operands: &[Ptr<'a>]) -> Condition<'a> {
    signal(Condition::arithmetic_error(store, operation, operands))
}

fn zero_divisor<'a>(store: &'a Storage, operation: &str, operands: &[Ptr<'a>]) -> Condition<'a> {
    signal(Condition::division_by_zero(store, operation, operands))
}

/// `T` if the object is an integer, otherwise nil.
pub fn integerp<'a>(store: &'a Storage, obj: Ptr<'a>) -> Ptr<'a> {
    truth(store, obj.is_integer())
}

/// Quotient, rounded toward negative infinity.
pub fn div<'a>(store: &'a Storage, z1: Ptr<'a>, z2: Ptr<'a>) -> PrimitiveResult<'a> {
    let (a, b) = integer_args(store, z1, z2)?;
    if b == 0 {
        return Err(zero_divisor(store, "DIV", &[z1, z2]));
    }
    // Only MIN / -1 overflows.
    let q = a.checked_div(b).ok_or_else(|| overflow(store, "DIV", &[z1, z2]))?;
    let q = if a % b != 0 && (a < 0) != (b < 0) {
        q - 1
    } else {
        q
    };
    trace!(a, b, q, "div");
    Ok(store.put(q))
}

/// Remainder with the sign of the divisor: `z1 - z2 * div(z1, z2)`.
pub fn modulo<'a>(store: &'a Storage, z1: Ptr<'a>, z2: Ptr<'a>) -> PrimitiveResult<'a> {
    let (a, b) = integer_args(store, z1, z2)?;
    if b == 0 {
        return Err(zero_divisor(store, "MOD", &[z1, z2]));
    }
    // MIN % -1 is 0, not an overflow.
    let r = a.wrapping_rem(b);
    let r = if r != 0 && (r < 0) != (b < 0) { r + b } else { r };
    Ok(store.put(r))
}

fn gcd_u64(mut x: u64, mut y: u64) -> u64 {
    while y != 0 {
        (x, y) = (y, x % y);
    }
    x
}

/// Greatest common divisor; never negative.
pub fn gcd<'a>(store: &'a Storage, z1: Ptr<'a>, z2: Ptr<'a>) -> PrimitiveResult<'a> {
    let (a, b) = integer_args(store, z1, z2)?;
    let g = gcd_u64(a.unsigned_abs(), b.unsigned_abs());
    // gcd(MIN, 0) and gcd(MIN, MIN) are 2^63.
    let g = Integer::try_from(g).map_err(|_| overflow(store, "GCD", &[z1, z2]))?;
    Ok(store.put(g))
}

/// Least common multiple; never negative.
/// Both arguments zero is a division by zero (by their zero gcd).
pub fn lcm<'a>(store: &'a Storage, z1: Ptr<'a>, z2: Ptr<'a>) -> PrimitiveResult<'a> {
    let (a, b) = integer_args(store, z1, z2)?;
    let (ua, ub) = (a.unsigned_abs(), b.unsigned_abs());
    let g = gcd_u64(ua, ub);
    if g == 0 {
        return Err(zero_divisor(store, "LCM", &[z1, z2]));
    }
    let l = (ua / g)
        .checked_mul(ub)
        .and_then(|l| Integer::try_from(l).ok())
        .ok_or_else(|| overflow(store, "LCM", &[z1, z2]))?;
    Ok(store.put(l))
}

/// Floor of the square root of a non-negative integer.
pub fn isqrt<'a>(store: &'a Storage, z: Ptr<'a>) -> PrimitiveResult<'a> {
    let n = integer_arg(store, z)?;
    if n < 0 {
        return Err(signal(Condition::domain_error(z, Class::Number)));
    }
    Ok(store.put(isqrt_u64(n.unsigned_abs()) as Integer))
}

/// Newton's method, from above; exact for every u64.
fn isqrt_u64(n: u64) -> u64 {
    if n < 2 {
        return n;
    }
    let mut x = n;
    let mut y = (x + 1) / 2;
    while y < x {
        x = y;
        y = (x + n / x) / 2;
    }
    x
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Object, OPERANDS, OPERATION};

    fn int<'a>(store: &'a Storage, i: i64) -> Ptr<'a> {
        store.put(i)
    }

    fn value(store: &Storage, result: PrimitiveResult) -> i64 {
        match result {
            Ok(p) => store
                .get(p)
                .as_integer()
                .unwrap_or_else(|| panic!("not an integer: {}", store.display(p))),
            Err(c) => panic!("unexpected condition: {c}"),
        }
    }

    fn binary(
        f: for<'a> fn(&'a Storage, Ptr<'a>, Ptr<'a>) -> PrimitiveResult<'a>,
        a: i64,
        b: i64,
    ) -> i64 {
        let store = Storage::default();
        value(&store, f(&store, int(&store, a), int(&store, b)))
    }

    /// Check that the result is the named condition, over the given operands.
    fn assert_signals(
        store: &Storage,
        result: PrimitiveResult,
        class: Class,
        operation: &str,
        operands: &[i64],
    ) {
        let c = match result {
            Err(c) => c,
            Ok(p) => panic!("expected {class}, got {}", store.display(p)),
        };
        assert_eq!(c.class(), class);
        assert_eq!(c.field(OPERATION), Some(store.put_symbol(operation)));
        let got: Vec<i64> = store
            .list_items(c.field(OPERANDS).unwrap())
            .map(|p| store.get(p).as_integer().unwrap())
            .collect();
        assert_eq!(got, operands);
    }

    #[test]
    fn div_floors() {
        assert_eq!(binary(div, 7, 2), 3);
        assert_eq!(binary(div, -7, 2), -4);
        assert_eq!(binary(div, 7, -2), -4);
        assert_eq!(binary(div, -7, -2), 3);
        assert_eq!(binary(div, 6, -2), -3);
        assert_eq!(binary(div, 0, 5), 0);
        assert_eq!(binary(div, i64::MIN, 1), i64::MIN);
    }

    #[test]
    fn mod_has_sign_of_divisor() {
        assert_eq!(binary(modulo, 7, 2), 1);
        assert_eq!(binary(modulo, -7, 2), 1);
        assert_eq!(binary(modulo, 7, -2), -1);
        assert_eq!(binary(modulo, -7, -2), -1);
        assert_eq!(binary(modulo, 6, -3), 0);
        assert_eq!(binary(modulo, i64::MIN, -1), 0);
    }

    #[test]
    fn div_and_mod_agree() {
        for a in -9..=9 {
            for b in [-4, -3, -1, 1, 2, 5] {
                let (q, r) = (binary(div, a, b), binary(modulo, a, b));
                assert_eq!(q * b + r, a, "{a} {b}");
                assert!(r == 0 || (r < 0) == (b < 0), "{a} mod {b} = {r}");
                assert!(r.abs() < b.abs());
                assert_eq!((a - r) % b, 0);
            }
        }
    }

    #[test]
    fn division_by_zero() {
        let store = Storage::default();
        let (z, zero) = (int(&store, 5), int(&store, 0));
        let r = div(&store, z, zero);
        assert_signals(&store, r, Class::DivisionByZero, "DIV", &[5, 0]);
        let r = modulo(&store, z, zero);
        assert_signals(&store, r, Class::DivisionByZero, "MOD", &[5, 0]);
    }

    #[test]
    fn div_overflow() {
        let store = Storage::default();
        let r = div(&store, int(&store, i64::MIN), int(&store, -1));
        assert_signals(&store, r, Class::ArithmeticError, "DIV", &[i64::MIN, -1]);
    }

    #[test]
    fn gcd_values() {
        assert_eq!(binary(gcd, 12, 18), 6);
        assert_eq!(binary(gcd, -12, 18), 6);
        assert_eq!(binary(gcd, 12, -18), 6);
        assert_eq!(binary(gcd, 0, 7), 7);
        assert_eq!(binary(gcd, 0, 0), 0);
        assert_eq!(binary(gcd, 17, 5), 1);

        let store = Storage::default();
        let r = gcd(&store, int(&store, i64::MIN), int(&store, 0));
        assert_signals(&store, r, Class::ArithmeticError, "GCD", &[i64::MIN, 0]);
    }

    #[test]
    fn lcm_values() {
        assert_eq!(binary(lcm, 4, 6), 12);
        assert_eq!(binary(lcm, -4, 6), 12);
        assert_eq!(binary(lcm, 0, 6), 0);
        assert_eq!(binary(lcm, 7, 7), 7);

        let store = Storage::default();
        let r = lcm(&store, int(&store, 0), int(&store, 0));
        assert_signals(&store, r, Class::DivisionByZero, "LCM", &[0, 0]);

        let big = 1i64 << 40;
        let r = lcm(&store, int(&store, big), int(&store, big - 1));
        assert_signals(&store, r, Class::ArithmeticError, "LCM", &[big, big - 1]);
    }

    #[test]
    fn isqrt_values() {
        let store = Storage::default();
        for (n, want) in [(0, 0), (1, 1), (3, 1), (4, 2), (10, 3), (99, 9), (100, 10)] {
            assert_eq!(value(&store, isqrt(&store, int(&store, n))), want, "isqrt {n}");
        }
        assert_eq!(
            value(&store, isqrt(&store, int(&store, i64::MAX))),
            3_037_000_499
        );
        for n in [(1i64 << 62) - 1, 1 << 62, 999_999_999_999] {
            let r = value(&store, isqrt(&store, int(&store, n)));
            assert!(r * r <= n && (r + 1) * (r + 1) > n, "isqrt {n} = {r}");
        }
    }

    #[test]
    fn isqrt_negative() {
        let store = Storage::default();
        let z = int(&store, -1);
        match isqrt(&store, z) {
            Err(Condition::DomainError {
                object,
                expected_class,
            }) => {
                assert_eq!(object, z);
                assert_eq!(expected_class, Class::Number);
            }
            v => panic!("unexpected result: {v:?}"),
        }
    }

    #[test]
    fn non_integer_arguments() {
        let store = Storage::default();
        let f = store.put(1.5f64);
        let one = int(&store, 1);
        for result in [
            div(&store, f, one),
            modulo(&store, one, f),
            gcd(&store, f, f),
            isqrt(&store, f),
        ] {
            match result {
                Err(Condition::DomainError {
                    object,
                    expected_class: Class::Integer,
                }) => assert_eq!(object, f),
                v => panic!("unexpected result: {v:?}"),
            }
        }
        let s = store.put_symbol("X");
        match lcm(&store, one, s) {
            Err(c) => assert!(matches!(store.get(c.field("OBJECT").unwrap()), Object::Symbol(_))),
            Ok(v) => panic!("unexpected value: {}", store.display(v)),
        }
    }

    #[test]
    fn integerp_values() {
        let store = Storage::default();
        assert_eq!(integerp(&store, int(&store, 3)), store.put_symbol("T"));
        assert!(integerp(&store, store.put(3.0f64)).is_nil());
        assert!(integerp(&store, Ptr::nil()).is_nil());
    }
}
