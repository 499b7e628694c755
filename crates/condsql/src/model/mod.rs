//! Typed predicate layer.
//!
//! Entities describe their table and columns through [`Model`] and
//! [`Field`] constants (normally generated by `#[derive(Model)]`).
//! [`ModelBuilder`] turns those descriptors plus a [`ConditionHash`]
//! into clauses on an underlying [`SqlBuilder`]:
//!
//! ```ignore
//! use condsql::{ConditionHash, Model, ModelBuilder, WhereCompare};
//!
//! #[derive(Model)]
//! #[orm(table = "orders")]
//! struct Order {
//!     id: i64,
//!     #[orm(column = "order_status")]
//!     status: i32,
//!     created_at: chrono::DateTime<chrono::Utc>,
//! }
//!
//! let o = Order::STATUS.alias("o");
//! let bag = ConditionHash::new().push("status", 5);
//! let sql = ModelBuilder::<Order>::with_conditions(bag)
//!     .table("o")
//!     .when_cmp(&o, None, WhereCompare::NotEqual)
//!     .between(&Order::CREATED_AT.alias("o"))
//!     .render()?;
//! // SELECT * FROM orders o WHERE o.order_status <> @order_status
//! ```
//!
//! [`ConditionHash`]: crate::ConditionHash
//! [`SqlBuilder`]: crate::SqlBuilder

mod builder;
mod compare;
mod field;


pub use builder::ModelBuilder;
pub use compare::{WHERE_COMPARE_SUFFIX, WhereCompare};
pub use field::{Field, FieldRef, Model};
