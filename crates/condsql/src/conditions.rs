//! The parameter bag that drives conditional clause emission.
//!
//! A [`ConditionHash`] maps case-insensitive keys to dynamically typed
//! [`Value`]s. Reads never fail: a missing key, a `null` value, or a value
//! that cannot be coerced to the requested type all fall back to the
//! caller's default, and [`parse`](ConditionHash::parse) reports which case
//! happened through its success flag.
//!
//! # Example
//! ```ignore
//! use condsql::ConditionHash;
//!
//! let hash = ConditionHash::new().push("Age", "42").push("Name", "bob");
//! assert_eq!(hash.get("age", 0), 42);
//! assert_eq!(hash.parse::<i32>("name", -1), (false, -1));
//! ```

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::convert::{self, FromValue};
use crate::error::{SqlError, SqlResult};
use crate::model::Field;
use crate::value::Value;

/// Bag key holding the requested ORDER BY field.
pub const ORDER_BY_KEY: &str = "OrderBy";
/// Bag key holding the ORDER BY direction (`true` = ascending).
pub const ASC_KEY: &str = "ASC";
pub const PAGE_INDEX_KEY: &str = "PageIndex";
pub const PAGE_SIZE_KEY: &str = "PageSize";

const DEFAULT_PAGE_INDEX: i32 = 1;
const DEFAULT_PAGE_SIZE: i32 = 20;

/// Case-insensitive parameter bag.
///
/// Keys are stored lowercased; every lookup lowercases its argument first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConditionHash {
    entries: BTreeMap<String, Value>,
}

fn normalize(key: &str) -> String {
    key.to_lowercase()
}

/// Length policy shared by `is_required` and `is_contains`:
/// `< -1` accepts any length, `-1` requires a non-empty sequence and
/// `n >= 0` requires exactly `n` elements.
fn length_matches(len: usize, expected_len: i32) -> bool {
    match expected_len {
        n if n < -1 => true,
        -1 => len > 0,
        n => usize::try_from(n).is_ok_and(|n| n == len),
    }
}

impl ConditionHash {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite `key`, returning the bag for chaining.
    pub fn push(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or overwrite `key`, returning the previous value.
    pub fn insert(&mut self, key: &str, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(normalize(key), value.into())
    }

    /// Push under the entity-level name of a field descriptor.
    pub fn push_field<M, T>(self, field: &Field<M, T>, value: impl Into<Value>) -> Self {
        self.push(field.name(), value)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.remove(&normalize(key))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(&normalize(key))
    }

    /// The raw value stored under `key`.
    pub fn value(&self, key: &str) -> Option<&Value> {
        self.entries.get(&normalize(key))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in key order (keys are lowercase).
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Non-null value under `key` coerced to `T`.
    fn fetch<T: FromValue>(&self, key: &str) -> Option<T> {
        match self.value(key) {
            None | Some(Value::Null) => None,
            Some(v) => T::from_value(v),
        }
    }

    /// Read `key` as `T`, or `default` if it is absent, null or not coercible.
    pub fn get<T: FromValue>(&self, key: &str, default: T) -> T {
        self.parse(key, default).1
    }

    /// Read `key` as `T` with an explicit success flag.
    ///
    /// `(false, default)` when the key is absent, the value is null or the
    /// value cannot be coerced.
    pub fn parse<T: FromValue>(&self, key: &str, default: T) -> (bool, T) {
        match self.value(key) {
            Some(v) => convert::parse(v, default),
            None => (false, default),
        }
    }

    /// Read `key` as a sequence of `T`. `None` unless every element coerces.
    pub fn get_array<T: FromValue>(&self, key: &str) -> Option<Vec<T>> {
        self.fetch(key)
    }

    /// `key` is present and meaningful: a non-empty string, an array whose
    /// length satisfies `expected_len`, or any other non-null value.
    ///
    /// `expected_len` follows the usual policy: `-1` means non-empty,
    /// anything below `-1` accepts any length, `n >= 0` means exactly `n`.
    pub fn is_required(&self, key: &str, expected_len: i32) -> bool {
        match self.value(key) {
            None | Some(Value::Null) => false,
            Some(Value::Str(s)) => !s.is_empty(),
            Some(Value::Array(items)) => length_matches(items.len(), expected_len),
            Some(_) => true,
        }
    }

    /// `key` is present, coerces to `T`, and, for sequence types, has a
    /// length satisfying `expected_len` (same policy as
    /// [`is_required`](Self::is_required)).
    pub fn is_contains<T: FromValue>(&self, key: &str, expected_len: i32) -> bool {
        match self.fetch::<T>(key) {
            Some(v) => v
                .seq_len()
                .is_none_or(|len| length_matches(len, expected_len)),
            None => false,
        }
    }

    /// `key` is present, coerces to `T`, and `predicate` accepts the value.
    pub fn is_contains_with<T: FromValue>(&self, key: &str, predicate: impl FnOnce(&T) -> bool) -> bool {
        self.fetch::<T>(key).is_some_and(|v| predicate(&v))
    }

    /// Record a default ORDER BY. The first call wins; later calls and an
    /// `OrderBy` already supplied by the caller are left untouched.
    pub fn order_by(mut self, field: &str, asc: bool) -> Self {
        if !self.is_contains::<String>(ORDER_BY_KEY, -1) {
            self.insert(ORDER_BY_KEY, field);
            self.insert(ASC_KEY, asc);
        }
        self
    }

    /// `PageIndex`, defaulting to 1.
    pub fn page_index(&self) -> i32 {
        self.get(PAGE_INDEX_KEY, DEFAULT_PAGE_INDEX)
    }

    /// `PageSize`, defaulting to 20.
    pub fn page_size(&self) -> i32 {
        self.get(PAGE_SIZE_KEY, DEFAULT_PAGE_SIZE)
    }

    /// Build a bag from the integer, float and string fields of a
    /// serializable value. Fields named in `required_keys` are imported
    /// whatever their type.
    pub fn from_serialize<S: Serialize + ?Sized>(obj: &S, required_keys: &[&str]) -> SqlResult<Self> {
        let fields = match serde_json::to_value(obj)? {
            JsonValue::Object(fields) => fields,
            other => {
                return Err(SqlError::Serialization(format!(
                    "expected an object, got {}",
                    json_type_name(&other)
                )));
            }
        };

        let mut hash = Self::new();
        for (name, value) in fields {
            let required = required_keys.iter().any(|k| k.eq_ignore_ascii_case(&name));
            if required || matches!(value, JsonValue::Number(_) | JsonValue::String(_)) {
                hash.insert(&name, value);
            }
        }
        Ok(hash)
    }

    /// Describe how the bag would change `obj`: one `field : old -> new`
    /// line per bag key whose value differs from the matching field.
    ///
    /// Empty strings on either side are shown as `<NULL>`. Keys without a
    /// matching field, and null bag values, are skipped.
    pub fn diff<S: Serialize + ?Sized>(&self, obj: &S) -> String {
        let fields = match serde_json::to_value(obj) {
            Ok(JsonValue::Object(fields)) => fields,
            _ => return String::new(),
        };

        let mut out = String::new();
        for (name, current) in &fields {
            let Some(incoming) = self.value(name).filter(|v| !v.is_null()) else {
                continue;
            };
            let old = display_or_null(&Value::from(current.clone()));
            let new = display_or_null(incoming);
            if old != new {
                out.push_str(&format!("{name} : {old} -> {new}\n"));
            }
        }
        out
    }
}

fn display_or_null(value: &Value) -> String {
    match value {
        Value::Null => "<NULL>".to_string(),
        Value::Str(s) if s.is_empty() => "<NULL>".to_string(),
        other => other.to_string(),
    }
}

fn json_type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

impl<K: AsRef<str>, V: Into<Value>> FromIterator<(K, V)> for ConditionHash {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut hash = Self::new();
        for (k, v) in iter {
            hash.insert(k.as_ref(), v);
        }
        hash
    }
}

#[cfg(test)]
mod tests;
