//! Type coercion between [`Value`] and Rust types.
//!
//! Every conversion here is failure-free for the caller: the `FromValue`
//! trait reports failure as `None`, and the helpers ([`parse`], [`to`],
//! [`to_str`], ...) fold that into an explicit success flag or a default.
//!
//! Numeric narrowing saturates at the bounds of the target type. Floats are
//! rounded half-to-even before narrowing to an integer; `NaN` never converts.

use std::fmt::Display;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::de::DeserializeOwned;

use crate::value::Value;

/// Conversion from a dynamically typed [`Value`].
///
/// Implemented for the scalar types, chrono date/time types, `Vec<T>`,
/// `Option<T>`, [`Value`], `serde_json::Value` and [`Json<T>`]. Enums get an
/// implementation from `#[derive(ValueEnum)]`.
pub trait FromValue: Sized {
    /// Convert `value`, or `None` if it cannot represent `Self`.
    ///
    /// Callers filter out `Value::Null` before calling.
    fn from_value(value: &Value) -> Option<Self>;

    /// Element count for sequence types, `None` for everything else.
    ///
    /// Used by the length policies of `ConditionHash::is_contains`.
    fn seq_len(&self) -> Option<usize> {
        None
    }
}

/// Wrapper that coerces through a `serde_json` round-trip.
///
/// Use it to pull composite values (structs, maps) out of the bag:
/// `hash.get::<Json<Range>>("range", ...)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

/// Date/time layouts accepted after RFC 3339, tried in order.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

fn float_to_i64(n: f64) -> Option<i64> {
    if n.is_nan() {
        return None;
    }
    // `as` saturates on overflow and maps infinities to the bounds.
    Some(n.round_ties_even() as i64)
}

/// Integer view of a non-string value.
fn integer_of(value: &Value) -> Option<i64> {
    match value {
        Value::Bool(b) => Some(i64::from(*b)),
        Value::I16(n) => Some(i64::from(*n)),
        Value::I32(n) => Some(i64::from(*n)),
        Value::I64(n) => Some(*n),
        Value::F32(n) => float_to_i64(f64::from(*n)),
        Value::F64(n) => float_to_i64(*n),
        _ => None,
    }
}

fn float_of(value: &Value) -> Option<f64> {
    match value {
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::I16(n) => Some(f64::from(*n)),
        Value::I32(n) => Some(f64::from(*n)),
        Value::I64(n) => Some(*n as f64),
        Value::F32(n) => Some(f64::from(*n)),
        Value::F64(n) => Some(*n),
        Value::Str(s) => s.trim().parse().ok(),
        _ => None,
    }
}

macro_rules! impl_from_value_int {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: &Value) -> Option<Self> {
                    match value {
                        Value::Str(s) => s.trim().parse::<$ty>().ok(),
                        other => integer_of(other).map(|n| {
                            <$ty>::try_from(n).unwrap_or(if n < 0 { <$ty>::MIN } else { <$ty>::MAX })
                        }),
                    }
                }
            }
        )*
    };
}

impl_from_value_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl FromValue for f64 {
    fn from_value(value: &Value) -> Option<Self> {
        float_of(value)
    }
}

impl FromValue for f32 {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::F32(n) => Some(*n),
            other => float_of(other).map(|n| n.clamp(f64::from(f32::MIN), f64::from(f32::MAX)) as f32),
        }
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(*b),
            Value::Str(s) => {
                let s = s.trim();
                if s.eq_ignore_ascii_case("true") || s == "1" {
                    Some(true)
                } else if s.eq_ignore_ascii_case("false") || s == "0" {
                    Some(false)
                } else {
                    None
                }
            }
            Value::F32(n) if n.is_nan() => None,
            Value::F64(n) if n.is_nan() => None,
            other => float_of(other).map(|n| n != 0.0),
        }
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null | Value::Array(_) | Value::Object(_) => None,
            other => Some(other.to_string()),
        }
    }
}

impl FromValue for DateTime<FixedOffset> {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::DateTime(dt) => Some(*dt),
            Value::Str(s) => parse_datetime(s),
            _ => None,
        }
    }
}

impl FromValue for DateTime<Utc> {
    fn from_value(value: &Value) -> Option<Self> {
        DateTime::<FixedOffset>::from_value(value).map(|dt| dt.with_timezone(&Utc))
    }
}

impl FromValue for NaiveDateTime {
    fn from_value(value: &Value) -> Option<Self> {
        DateTime::<FixedOffset>::from_value(value).map(|dt| dt.naive_local())
    }
}

impl FromValue for NaiveDate {
    fn from_value(value: &Value) -> Option<Self> {
        NaiveDateTime::from_value(value).map(|dt| dt.date())
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Array(items) => items.iter().map(T::from_value).collect(),
            _ => None,
        }
    }

    fn seq_len(&self) -> Option<usize> {
        Some(self.len())
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Option<Self> {
        T::from_value(value).map(Some)
    }

    fn seq_len(&self) -> Option<usize> {
        self.as_ref().and_then(T::seq_len)
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }

    fn seq_len(&self) -> Option<usize> {
        self.as_array().map(<[Value]>::len)
    }
}

impl FromValue for serde_json::Value {
    fn from_value(value: &Value) -> Option<Self> {
        Some(value.to_json())
    }

    fn seq_len(&self) -> Option<usize> {
        self.as_array().map(Vec::len)
    }
}

impl<T: DeserializeOwned> FromValue for Json<T> {
    fn from_value(value: &Value) -> Option<Self> {
        serde_json::from_value(value.to_json()).ok().map(Json)
    }
}

/// Convert with an explicit success flag.
///
/// Returns `(false, default)` for `Null` or when the value cannot be
/// coerced to `T`.
pub fn parse<T: FromValue>(value: &Value, default: T) -> (bool, T) {
    if value.is_null() {
        return (false, default);
    }
    match T::from_value(value) {
        Some(v) => (true, v),
        None => (false, default),
    }
}

/// Convert, falling back to `default` on failure.
pub fn to<T: FromValue>(value: &Value, default: T) -> T {
    parse(value, default).1
}

/// String form of `value`.
///
/// With `disallow_empty`, an empty (or all-whitespace) result is replaced by
/// `default` as well.
pub fn to_str(value: &Value, default: &str, disallow_empty: bool) -> String {
    match String::from_value(value) {
        Some(s) if disallow_empty && s.trim().is_empty() => default.to_string(),
        Some(s) => s,
        None => default.to_string(),
    }
}

pub fn to_datetime(value: &Value, default: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    to(value, default)
}

/// Parse RFC 3339 first, then the plain `YYYY-MM-DD hh:mm:ss` and
/// `YYYY-MM-DD` layouts (taken as UTC).
pub fn parse_datetime(s: &str) -> Option<DateTime<FixedOffset>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt);
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .map(|d| d.and_time(NaiveTime::MIN))
        })
        .map(|naive| naive.and_utc().fixed_offset())
}

/// Narrow to `i16`, clamping at the bounds.
pub fn saturate_i16(n: i64) -> i16 {
    n.clamp(i64::from(i16::MIN), i64::from(i16::MAX)) as i16
}

/// Narrow to `i32`, clamping at the bounds.
pub fn saturate_i32(n: i64) -> i32 {
    n.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Narrow to `u8`, clamping at the bounds.
pub fn saturate_u8(n: i64) -> u8 {
    n.clamp(0, i64::from(u8::MAX)) as u8
}

/// Parse an integer written in `radix` (2..=36). A `0x`/`0X` prefix is
/// accepted for base 16 and `0b` for base 2.
pub fn parse_radix_i64(s: &str, radix: u32) -> Option<i64> {
    if !(2..=36).contains(&radix) {
        return None;
    }
    let s = s.trim();
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let digits = match radix {
        16 => digits
            .strip_prefix("0x")
            .or_else(|| digits.strip_prefix("0X"))
            .unwrap_or(digits),
        2 => digits
            .strip_prefix("0b")
            .or_else(|| digits.strip_prefix("0B"))
            .unwrap_or(digits),
        _ => digits,
    };
    let n = i64::from_str_radix(digits, radix).ok()?;
    Some(if negative { -n } else { n })
}

pub fn parse_radix_i32(s: &str, radix: u32) -> Option<i32> {
    parse_radix_i64(s, radix).and_then(|n| i32::try_from(n).ok())
}

/// Split on any of `separators` (empty pieces dropped) and parse each piece.
///
/// Returns `None` if any piece is not an `i32`.
pub fn split_to_i32(s: &str, separators: &[&str]) -> Option<Vec<i32>> {
    let mut pieces = vec![s];
    for sep in separators.iter().filter(|sep| !sep.is_empty()) {
        pieces = pieces.into_iter().flat_map(|p| p.split(sep)).collect();
    }
    pieces
        .into_iter()
        .filter(|p| !p.is_empty())
        .map(|p| p.trim().parse::<i32>().ok())
        .collect()
}

/// Join the display forms of `items` with `separator`.
pub fn concat<T: Display>(items: &[T], separator: &str) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(separator)
}

/// Seconds since the Unix epoch.
pub fn to_unix_timestamp<Tz: TimeZone>(dt: &DateTime<Tz>) -> i64 {
    dt.timestamp()
}

/// Inverse of [`to_unix_timestamp`]; `None` when out of chrono's range.
pub fn from_unix_timestamp(secs: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
}
