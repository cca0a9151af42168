//! Duration literals such as `300ms`, `1.5h` or `2h45m30s`.
//!
//! A literal is a sequence of decimal numbers, each with an optional
//! fraction and a mandatory unit: `ns`, `us` (or `µs`), `ms`, `s`, `m`, `h`.
//! A bare `0` is accepted. `Duration` is unsigned, so a leading `-` is only
//! accepted when the total is zero.

use super::{CoerceError, Value};
use crate::merge::{custom_error, json_kind, Json, JsonError};
use std::time::Duration;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Fraction digits beyond this are ignored; they are below nanosecond precision.
const MAX_FRACTION_DIGITS: u32 = 18;

fn unit_nanos(unit: &str) -> Option<u128> {
    let nanos = match unit {
        "ns" => 1,
        "us" | "\u{00b5}s" | "\u{03bc}s" => 1_000,
        "ms" => 1_000_000,
        "s" => NANOS_PER_SEC,
        "m" => 60 * NANOS_PER_SEC,
        "h" => 3_600 * NANOS_PER_SEC,
        _ => return None,
    };
    Some(nanos)
}

/// Parse a duration literal.
pub fn parse_duration(input: &str) -> Result<Duration, CoerceError> {
    let (negative, mut rest) = match input.as_bytes().first() {
        Some(b'-') => (true, &input[1..]),
        Some(b'+') => (false, &input[1..]),
        _ => (false, input),
    };

    if rest == "0" {
        return Ok(Duration::ZERO);
    }
    if rest.is_empty() {
        return Err(CoerceError::duration(input, "invalid syntax"));
    }

    let mut total: u128 = 0;
    while !rest.is_empty() {
        let int_len = rest.bytes().take_while(u8::is_ascii_digit).count();
        let (int_digits, after_int) = rest.split_at(int_len);

        let mut whole: u128 = 0;
        for digit in int_digits.bytes() {
            whole = whole
                .checked_mul(10)
                .and_then(|w| w.checked_add(u128::from(digit - b'0')))
                .ok_or_else(|| CoerceError::duration(input, "value out of range"))?;
        }

        let mut fraction: u128 = 0;
        let mut scale: u128 = 1;
        let mut frac_len = 0;
        let after_number = match after_int.strip_prefix('.') {
            Some(after_dot) => {
                frac_len = after_dot.bytes().take_while(u8::is_ascii_digit).count();
                for digit in after_dot.bytes().take(frac_len) {
                    if scale < 10u128.pow(MAX_FRACTION_DIGITS) {
                        fraction = fraction * 10 + u128::from(digit - b'0');
                        scale *= 10;
                    }
                }
                &after_dot[frac_len..]
            }
            None => after_int,
        };
        if int_len == 0 && frac_len == 0 {
            return Err(CoerceError::duration(input, "invalid syntax"));
        }

        let unit_len = after_number
            .find(|c: char| c == '.' || c.is_ascii_digit())
            .unwrap_or(after_number.len());
        if unit_len == 0 {
            return Err(CoerceError::duration(input, "missing unit"));
        }
        let (unit, remainder) = after_number.split_at(unit_len);
        let per_unit =
            unit_nanos(unit).ok_or_else(|| CoerceError::duration(input, "unknown unit"))?;

        let component = whole
            .checked_mul(per_unit)
            .and_then(|nanos| nanos.checked_add(fraction * per_unit / scale))
            .ok_or_else(|| CoerceError::duration(input, "value out of range"))?;
        total = total
            .checked_add(component)
            .ok_or_else(|| CoerceError::duration(input, "value out of range"))?;
        rest = remainder;
    }

    if negative && total != 0 {
        return Err(CoerceError::duration(input, "negative durations are not supported"));
    }

    let secs = u64::try_from(total / NANOS_PER_SEC)
        .map_err(|_| CoerceError::duration(input, "value out of range"))?;
    // Always below one billion.
    let nanos = (total % NANOS_PER_SEC) as u32;
    Ok(Duration::new(secs, nanos))
}

impl Value for Duration {
    fn assign(&mut self, raw: &str) -> Result<(), CoerceError> {
        *self = parse_duration(raw)?;
        Ok(())
    }

    /// File members are either integer nanoseconds or a duration literal.
    fn merge_json(&mut self, json: Json) -> Result<(), JsonError> {
        match json {
            Json::Null => {}
            Json::Number(number) => {
                let nanos = number.as_u64().ok_or_else(|| {
                    custom_error(format_args!("invalid duration {number}: expected nanoseconds"))
                })?;
                *self = Duration::from_nanos(nanos);
            }
            Json::String(text) => *self = parse_duration(&text).map_err(custom_error)?,
            other => {
                return Err(custom_error(format_args!(
                    "expected a duration, found {}",
                    json_kind(&other)
                )))
            }
        }
        Ok(())
    }
}
