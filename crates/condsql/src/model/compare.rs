use std::fmt;

use crate::convert::FromValue;
use crate::value::Value;

/// Comparison operator used by `ModelBuilder::when`.
///
/// The operator can be chosen per request by putting a
/// `<column>_WhereCompare` key in the parameter bag. The bag value may be a
/// variant name (`"Greater"`, case-insensitive), the operator symbol
/// (`">"`) or the numeric code (`2`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum WhereCompare {
    #[default]
    Equal = 0,
    NotEqual = 1,
    Greater = 2,
    GreaterOrEqual = 3,
    Less = 4,
    LessOrEqual = 5,
    Like = 6,
}

/// Suffix of the bag key overriding the operator for a column.
pub const WHERE_COMPARE_SUFFIX: &str = "_WhereCompare";

impl WhereCompare {
    const ALL: [WhereCompare; 7] = [
        WhereCompare::Equal,
        WhereCompare::NotEqual,
        WhereCompare::Greater,
        WhereCompare::GreaterOrEqual,
        WhereCompare::Less,
        WhereCompare::LessOrEqual,
        WhereCompare::Like,
    ];

    pub fn as_sql(self) -> &'static str {
        match self {
            WhereCompare::Equal => "=",
            WhereCompare::NotEqual => "<>",
            WhereCompare::Greater => ">",
            WhereCompare::GreaterOrEqual => ">=",
            WhereCompare::Less => "<",
            WhereCompare::LessOrEqual => "<=",
            WhereCompare::Like => "LIKE",
        }
    }

    fn name(self) -> &'static str {
        match self {
            WhereCompare::Equal => "Equal",
            WhereCompare::NotEqual => "NotEqual",
            WhereCompare::Greater => "Greater",
            WhereCompare::GreaterOrEqual => "GreaterOrEqual",
            WhereCompare::Less => "Less",
            WhereCompare::LessOrEqual => "LessOrEqual",
            WhereCompare::Like => "Like",
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|c| *c as i64 == code)
    }

    /// Parse a variant name, operator symbol or numeric code.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("NoEqual") || s == "!=" {
            return Some(WhereCompare::NotEqual);
        }
        if let Some(c) = Self::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(s) || c.as_sql().eq_ignore_ascii_case(s))
        {
            return Some(c);
        }
        s.parse::<i64>().ok().and_then(Self::from_code)
    }

    /// Bag key carrying the operator override for `column`.
    pub fn key_for(column: &str) -> String {
        if column.ends_with(WHERE_COMPARE_SUFFIX) {
            column.to_string()
        } else {
            format!("{column}{WHERE_COMPARE_SUFFIX}")
        }
    }
}

impl fmt::Display for WhereCompare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl FromValue for WhereCompare {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Str(s) => Self::parse(s),
            Value::I16(n) => Self::from_code(i64::from(*n)),
            Value::I32(n) => Self::from_code(i64::from(*n)),
            Value::I64(n) => Self::from_code(*n),
            _ => None,
        }
    }
}

impl From<WhereCompare> for Value {
    fn from(c: WhereCompare) -> Self {
        Value::I32(c as i32)
    }
}
