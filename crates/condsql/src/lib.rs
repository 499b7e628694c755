//! # condsql
//!
//! A condition-driven dynamic SQL assembler for MySQL.
//!
//! ## Features
//!
//! - **Parameter bag**: [`ConditionHash`] holds loosely typed request
//!   parameters under case-insensitive keys, with failure-free typed reads
//! - **Statement assembler**: [`SqlBuilder`] renders SELECT / INSERT /
//!   UPDATE / DELETE with named `@param` placeholders
//! - **Conditional predicates**: [`ModelBuilder`] emits a clause only when
//!   the bag holds a usable value for the field
//! - **Dual-statement pagination**: one paged query renders the row
//!   statement and its `COUNT(0)` companion
//! - **Upsert**: `ON DUPLICATE KEY UPDATE` plus `LAST_INSERT_ID()`
//!
//! ## Example
//!
//! ```ignore
//! use condsql::{args, ConditionHash, Model, ModelBuilder, OrderType, SqlBuilder};
//!
//! // Untyped
//! let stmt = SqlBuilder::new()
//!     .table("users")
//!     .where_("age > @age", args![18])
//!     .order_by("id", OrderType::Desc)
//!     .page(1, 20, true, "")
//!     .build()?;
//! let (rows_sql, count_sql) = stmt.split_page();
//!
//! // Typed, driven by request parameters
//! #[derive(Model)]
//! #[orm(table = "users")]
//! struct User {
//!     id: i64,
//!     name: String,
//!     age: Option<i32>,
//! }
//!
//! let bag = ConditionHash::new().push("name", "bob").push("PageIndex", 2);
//! let stmt = ModelBuilder::<User>::with_conditions(bag)
//!     .table("u")
//!     .when(&User::NAME.alias("u"))
//!     .when(&User::AGE.alias("u"))
//!     .order_by()
//!     .page(true, "")
//!     .build()?;
//! ```

pub mod builder;
pub mod conditions;
pub mod config;
pub mod convert;
pub mod error;
pub mod ident;
pub mod model;
pub mod pagination;
pub mod params;
pub mod statement;
pub mod value;

mod log;

pub use builder::{ClauseKind, ClauseStore, Fragment, JoinKind, Mode, OrderType, PageArgs, SqlBuilder};
pub use conditions::ConditionHash;
pub use config::{BuilderConfig, LogLevel};
pub use convert::{FromValue, Json};
pub use error::{SqlError, SqlResult};
pub use ident::Ident;
pub use model::{Field, FieldRef, Model, ModelBuilder, WhereCompare};
pub use pagination::Pagination;
pub use params::Params;
pub use statement::Statement;
pub use value::Value;

#[cfg(feature = "derive")]
pub use condsql_derive::{Model, ValueEnum};

/// Build a `Vec<Value>` of WHERE arguments.
///
/// ```ignore
/// builder.where_("age > @age AND name = @name", args![18, "bob"])
/// ```
#[macro_export]
macro_rules! args {
    () => {
        ::std::vec::Vec::<$crate::Value>::new()
    };
    ($($value:expr),+ $(,)?) => {
        ::std::vec![$($crate::Value::from($value)),+]
    };
}
