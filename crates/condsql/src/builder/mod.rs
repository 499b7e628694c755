//! Untyped statement assembler.
//!
//! [`SqlBuilder`] records clause fragments per [`ClauseKind`] and renders
//! MySQL-flavoured SQL for its [`Mode`]. Every method consumes and returns
//! the builder:
//!
//! ```ignore
//! use condsql::{args, SqlBuilder, OrderType};
//!
//! let stmt = SqlBuilder::new()
//!     .table_as("users", "u")
//!     .left_join("orders", "o", "o.user_id = u.id")
//!     .where_("u.age > @age AND u.name = @name", args![18, "bob"])
//!     .order_by("u.id", OrderType::Desc)
//!     .page(2, 20, true, "")
//!     .build()?;
//! ```
//!
//! `render(&self)` leaves the builder untouched, so it can be rendered again
//! or cloned and extended. `build(self)` consumes it together with its
//! parameters.

mod clause;
mod render;

#[cfg(test)]
mod tests;

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::config::BuilderConfig;
use crate::error::{SqlError, SqlResult};
use crate::params::{Params, clean_name};
use crate::value::Value;

pub use clause::{ClauseKind, ClauseStore, Fragment, PageArgs};

/// Statement kind produced by [`SqlBuilder::render`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Select,
    Insert,
    Update,
    Delete,
}

/// ORDER BY direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OrderType {
    #[default]
    Desc,
    Asc,
}

impl OrderType {
    pub fn as_sql(self) -> &'static str {
        match self {
            OrderType::Desc => "DESC",
            OrderType::Asc => "ASC",
        }
    }

    pub fn from_asc(asc: bool) -> Self {
        if asc { OrderType::Asc } else { OrderType::Desc }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Plain,
    Left,
    Right,
    Inner,
    Straight,
}

impl JoinKind {
    pub fn keyword(self) -> &'static str {
        match self {
            JoinKind::Plain => "JOIN",
            JoinKind::Left => "LEFT JOIN",
            JoinKind::Right => "RIGHT JOIN",
            JoinKind::Inner => "INNER JOIN",
            JoinKind::Straight => "STRAIGHT_JOIN",
        }
    }
}

fn param_regex() -> &'static Regex {
    static PARAM_RE: OnceLock<Regex> = OnceLock::new();
    PARAM_RE.get_or_init(|| Regex::new(r"@\w+").expect("invalid built-in parameter regex"))
}

fn plain_field_regex() -> &'static Regex {
    static FIELD_RE: OnceLock<Regex> = OnceLock::new();
    FIELD_RE.get_or_init(|| Regex::new(r"^\w+$").expect("invalid built-in field regex"))
}

/// `@name` tokens of `text`, in order of appearance.
pub fn param_tokens(text: &str) -> Vec<&str> {
    param_regex().find_iter(text).map(|m| m.as_str()).collect()
}

/// Dynamic statement builder.
#[derive(Debug, Clone, Default)]
pub struct SqlBuilder {
    mode: Mode,
    select_identity: bool,
    parts: ClauseStore,
    params: Params,
    config: BuilderConfig,
}

impl SqlBuilder {
    /// Create a builder in SELECT mode.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: BuilderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    // ==================== Tables & modes ====================

    /// Add a FROM table. SELECT accepts several (comma-joined); the other
    /// modes require exactly one.
    pub fn table(mut self, name: &str) -> Self {
        self.parts.add(ClauseKind::Table, Fragment::text(name));
        self
    }

    /// Add a FROM table with an alias (`name alias`).
    pub fn table_as(self, name: &str, alias: &str) -> Self {
        if alias.is_empty() {
            self.table(name)
        } else {
            self.table(&format!("{name} {alias}"))
        }
    }

    /// Switch to INSERT mode on `table`.
    pub fn insert(mut self, table: &str) -> Self {
        self.mode = Mode::Insert;
        self.table(table)
    }

    /// Switch to UPDATE mode on `table`.
    pub fn update(mut self, table: &str) -> Self {
        self.mode = Mode::Update;
        self.table(table)
    }

    /// Switch to DELETE mode on `table`.
    pub fn delete(mut self, table: &str) -> Self {
        self.mode = Mode::Delete;
        self.table(table)
    }

    // ==================== INSERT ====================

    /// INSERT column bound to a named parameter (the field without backticks).
    pub fn value(mut self, field: &str, value: impl Into<Value>) -> Self {
        let name = clean_name(field);
        self.parts.add(
            ClauseKind::InsertValue,
            Fragment::Column {
                field: field.to_string(),
                value: format!("@{name}"),
            },
        );
        self.params.add(&name, value);
        self
    }

    /// INSERT column with a literal SQL expression (`NOW()`, `DEFAULT`, ...).
    pub fn value_literal(mut self, field: &str, expr: &str) -> Self {
        self.parts.add(
            ClauseKind::InsertValue,
            Fragment::Column {
                field: field.to_string(),
                value: expr.to_string(),
            },
        );
        self
    }

    /// Add an `ON DUPLICATE KEY UPDATE field=value_expr` assignment.
    ///
    /// Ignored outside INSERT mode or when either argument is empty.
    pub fn duplicate(mut self, field: &str, value_expr: &str) -> Self {
        if !self.is_insert() || field.is_empty() || value_expr.is_empty() {
            return self;
        }
        self.parts.add(
            ClauseKind::DuplicateUpdate,
            Fragment::Duplicate {
                field: field.to_string(),
                value: value_expr.to_string(),
            },
        );
        self
    }

    /// Append `;SELECT LAST_INSERT_ID() AS id;` to the INSERT. Ignored in
    /// other modes.
    pub fn select_identity(mut self) -> Self {
        if self.is_insert() {
            self.select_identity = true;
        }
        self
    }

    // ==================== UPDATE ====================

    /// UPDATE assignment bound to a named parameter.
    ///
    /// A plain identifier renders `` `field`=@field ``. Other expressions
    /// take the parameter name from their first `@name` token, falling back
    /// to the last dotted segment without backticks (`` u.`Name` `` binds
    /// `Name`). When no name can be derived the call is dropped.
    pub fn set(mut self, field: &str, value: impl Into<Value>) -> Self {
        let name = if plain_field_regex().is_match(field) {
            field.to_string()
        } else {
            match param_tokens(field).first() {
                Some(token) => clean_name(token),
                None => field.rsplit('.').next().map(clean_name).unwrap_or_default(),
            }
        };

        if !plain_field_regex().is_match(&name) {
            tracing::warn!(field, "SET field has no usable parameter name, assignment dropped");
            return self;
        }

        self.parts
            .add(ClauseKind::UpdateValue, Fragment::text(format!("`{name}`=@{name}")));
        self.params.add(&name, value);
        self
    }

    /// UPDATE assignment with a literal expression: `field=expr`.
    pub fn set_literal(mut self, field: &str, expr: &str) -> Self {
        self.parts
            .add(ClauseKind::UpdateValue, Fragment::text(format!("{field}={expr}")));
        self
    }

    pub fn set_if(self, gate: bool, field: &str, value: impl Into<Value>) -> Self {
        if gate { self.set(field, value) } else { self }
    }

    // ==================== WHERE ====================

    /// Add a WHERE fragment (fragments are joined with `AND`).
    ///
    /// When the condition has `@name` tokens and `args` has the same number
    /// of scalar values, they are bound positionally. Otherwise every object
    /// argument contributes its fields as parameters and anything else is
    /// skipped. The fragment is appended either way.
    pub fn where_(mut self, condition: &str, args: Vec<Value>) -> Self {
        self.bind_args(condition, args);
        self.parts.add(ClauseKind::Where, Fragment::text(condition));
        self
    }

    pub fn where_if(self, gate: bool, condition: &str, args: Vec<Value>) -> Self {
        if gate { self.where_(condition, args) } else { self }
    }

    /// Add a WHERE fragment whose parameters come from the fields of `args`.
    pub fn where_object<S: Serialize + ?Sized>(self, condition: &str, args: &S) -> SqlResult<Self> {
        match serde_json::to_value(args)? {
            serde_json::Value::Object(map) => Ok(self.where_(condition, vec![Value::Object(map)])),
            _ => Err(SqlError::Serialization(format!(
                "WHERE arguments for `{condition}` must serialize to an object"
            ))),
        }
    }

    /// `field IN (@field_IN_0, @field_IN_1, ...)`; dots in `field` become
    /// `_` in the parameter names. An empty list renders `1=0`.
    pub fn where_in<V: Into<Value>>(self, field: &str, values: impl IntoIterator<Item = V>) -> Self {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            return self.where_("1=0", Vec::new());
        }
        let prefix = field.replace('.', "_").replace('`', "");
        let names: Vec<String> = (0..values.len())
            .map(|i| format!("@{prefix}_IN_{i}"))
            .collect();
        let condition = format!("{field} IN ({})", names.join(","));
        self.where_(&condition, values)
    }

    pub fn where_in_if<V: Into<Value>>(
        self,
        gate: bool,
        field: &str,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        if gate { self.where_in(field, values) } else { self }
    }

    fn bind_args(&mut self, condition: &str, args: Vec<Value>) {
        let tokens = param_tokens(condition);
        let positional = !tokens.is_empty()
            && tokens.len() == args.len()
            && !args.iter().any(|a| matches!(a, Value::Object(_)));

        if positional {
            for (token, arg) in tokens.into_iter().zip(args) {
                self.params.add(token, arg);
            }
            return;
        }

        for arg in args {
            match arg {
                Value::Object(map) => self.params.merge(&map),
                other => tracing::warn!(
                    condition,
                    arg_type = other.type_name(),
                    "argument count does not match parameters and value has no fields, skipped"
                ),
            }
        }
    }

    // ==================== JOIN ====================

    /// `<kind> JOIN table alias ON on`.
    pub fn join_kind(mut self, kind: JoinKind, table: &str, alias: &str, on: &str) -> Self {
        let target = if alias.is_empty() {
            table.to_string()
        } else {
            format!("{table} {alias}")
        };
        self.parts.add(
            ClauseKind::Join,
            Fragment::text(format!("{} {target} ON {on}", kind.keyword())),
        );
        self
    }

    pub fn join(self, table: &str, alias: &str, on: &str) -> Self {
        self.join_kind(JoinKind::Plain, table, alias, on)
    }

    pub fn left_join(self, table: &str, alias: &str, on: &str) -> Self {
        self.join_kind(JoinKind::Left, table, alias, on)
    }

    pub fn right_join(self, table: &str, alias: &str, on: &str) -> Self {
        self.join_kind(JoinKind::Right, table, alias, on)
    }

    pub fn inner_join(self, table: &str, alias: &str, on: &str) -> Self {
        self.join_kind(JoinKind::Inner, table, alias, on)
    }

    /// MySQL `STRAIGHT_JOIN table alias ON on`.
    pub fn straight_join(self, table: &str, alias: &str, on: &str) -> Self {
        self.join_kind(JoinKind::Straight, table, alias, on)
    }

    // ==================== SELECT list, grouping, ordering ====================

    /// Append SELECT columns. Without any, `*` is rendered.
    pub fn select(mut self, fields: &[&str]) -> Self {
        for field in fields {
            self.parts.add(ClauseKind::Select, Fragment::text(*field));
        }
        self
    }

    /// Forget the SELECT columns added so far.
    pub fn clear_select(mut self) -> Self {
        self.parts.remove(ClauseKind::Select);
        self
    }

    /// `ORDER BY field dir`; an empty field orders by `1`.
    pub fn order_by(mut self, field: &str, dir: OrderType) -> Self {
        let field = if field.is_empty() { "1" } else { field };
        self.parts
            .add(ClauseKind::OrderBy, Fragment::text(format!("{field} {dir}")));
        self
    }

    pub fn order_by_desc(self, field: &str) -> Self {
        self.order_by(field, OrderType::Desc)
    }

    pub fn order_by_asc(self, field: &str) -> Self {
        self.order_by(field, OrderType::Asc)
    }

    pub fn group_by(mut self, fields: &[&str]) -> Self {
        for field in fields {
            self.parts.add(ClauseKind::GroupBy, Fragment::text(*field));
        }
        self
    }

    /// `LIMIT offset,rows`, replacing an earlier limit.
    pub fn limit(mut self, offset: i64, rows: i64) -> Self {
        self.parts
            .replace(ClauseKind::Limit, Fragment::Limit { offset, rows });
        self
    }

    /// Append `FOR UPDATE` to the (row) SELECT.
    pub fn for_update(mut self) -> Self {
        self.parts.replace(ClauseKind::ForUpdate, Fragment::ForUpdate);
        self
    }

    /// Paginate a SELECT; replaces an earlier directive.
    ///
    /// With `emit_count`, a second statement
    /// `SELECT COUNT(0) AS Count[, totals] FROM (<unpaged>) AS CT` follows
    /// the row statement.
    pub fn page(mut self, page_index: i32, page_size: i32, emit_count: bool, totals: &str) -> Self {
        self.parts.replace(
            ClauseKind::Page,
            Fragment::Page(PageArgs::new(page_index, page_size, emit_count, totals)),
        );
        self
    }

    // ==================== Accessors ====================

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_select(&self) -> bool {
        self.mode == Mode::Select
    }

    pub fn is_insert(&self) -> bool {
        self.mode == Mode::Insert
    }

    pub fn is_update(&self) -> bool {
        self.mode == Mode::Update
    }

    pub fn is_delete(&self) -> bool {
        self.mode == Mode::Delete
    }

    /// Whether a page directive asks for the count statement.
    pub fn is_count_total(&self) -> bool {
        self.parts.page().is_some_and(|p| p.emit_count)
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn parts(&self) -> &ClauseStore {
        &self.parts
    }
}
