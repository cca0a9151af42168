//! Integer and floating point conversions.
//!
//! Integer literals accept an optional sign (signed types only), a base
//! prefix (`0x`, `0o`, `0b`, or a bare leading `0` for octal) and `_` digit
//! separators. Overflow is checked against the destination's bit width.

use super::{CoerceError, Value};
use std::num::{IntErrorKind, ParseIntError};

/// Integer types parsable from a prefixed literal.
trait Integer: Sized {
    const SIGNED: bool;

    fn from_str_radix(digits: &str, radix: u32) -> Result<Self, ParseIntError>;
}

/// Split a base prefix off an unsigned literal.
///
/// Returns the radix, the remaining digits and whether a prefix was present.
fn split_radix(literal: &str) -> (u32, &str, bool) {
    let bytes = literal.as_bytes();
    if bytes.len() < 2 || bytes[0] != b'0' {
        return (10, literal, false);
    }
    match bytes[1] {
        b'x' | b'X' => (16, &literal[2..], true),
        b'o' | b'O' => (8, &literal[2..], true),
        b'b' | b'B' => (2, &literal[2..], true),
        _ => (8, &literal[1..], true),
    }
}

/// `_` may only separate digits, or follow a base prefix.
fn underscores_ok(digits: &str, prefixed: bool) -> bool {
    if digits.ends_with('_') || digits.contains("__") {
        return false;
    }
    prefixed || !digits.starts_with('_')
}

fn parse_integer<T: Integer>(input: &str) -> Result<T, CoerceError> {
    let (negative, unsigned) = match input.as_bytes().first() {
        Some(b'+') if T::SIGNED => (false, &input[1..]),
        Some(b'-') if T::SIGNED => (true, &input[1..]),
        _ => (false, input),
    };

    let (radix, digits, prefixed) = split_radix(unsigned);
    if digits.is_empty()
        || digits.starts_with(['+', '-'])
        || !underscores_ok(digits, prefixed)
        || digits.bytes().all(|b| b == b'_')
    {
        return Err(CoerceError::syntax(input));
    }

    let mut cleaned = String::with_capacity(digits.len() + 1);
    if negative {
        cleaned.push('-');
    }
    cleaned.extend(digits.chars().filter(|c| *c != '_'));

    T::from_str_radix(&cleaned, radix).map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => CoerceError::range(input),
        _ => CoerceError::syntax(input),
    })
}

macro_rules! integer_value {
    ($signed:literal => $($ty:ty),* $(,)?) => {
        $(
            impl Integer for $ty {
                const SIGNED: bool = $signed;

                fn from_str_radix(digits: &str, radix: u32) -> Result<Self, ParseIntError> {
                    <$ty>::from_str_radix(digits, radix)
                }
            }

            impl Value for $ty {
                fn assign(&mut self, raw: &str) -> Result<(), CoerceError> {
                    *self = parse_integer(raw)?;
                    Ok(())
                }

                crate::__capability!(json);
            }
        )*
    };
}

integer_value!(true => i8, i16, i32, i64, i128, isize);
integer_value!(false => u8, u16, u32, u64, u128, usize);

fn is_infinity_literal(input: &str) -> bool {
    let unsigned = input.strip_prefix(['+', '-']).unwrap_or(input);
    unsigned.eq_ignore_ascii_case("inf") || unsigned.eq_ignore_ascii_case("infinity")
}

macro_rules! float_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Value for $ty {
                fn assign(&mut self, raw: &str) -> Result<(), CoerceError> {
                    let parsed: $ty = raw.parse().map_err(|_| CoerceError::syntax(raw))?;
                    if parsed.is_infinite() && !is_infinity_literal(raw) {
                        return Err(CoerceError::range(raw));
                    }
                    *self = parsed;
                    Ok(())
                }

                crate::__capability!(json);
            }
        )*
    };
}

float_value!(f32, f64);
