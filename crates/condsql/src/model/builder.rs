use std::fmt;
use std::marker::PhantomData;

use super::compare::WhereCompare;
use super::field::{Field, FieldRef, Model};
use crate::builder::{JoinKind, Mode, OrderType, SqlBuilder};
use crate::conditions::{ASC_KEY, ConditionHash, ORDER_BY_KEY, PAGE_INDEX_KEY, PAGE_SIZE_KEY};
use crate::config::BuilderConfig;
use crate::convert::FromValue;
use crate::error::{SqlError, SqlResult};
use crate::ident::Ident;
use crate::params::{Params, clean_name};
use crate::statement::Statement;
use crate::value::Value;

/// Typed predicate layer over [`SqlBuilder`].
///
/// Clauses are driven by [`Field`] descriptors and, for the conditional
/// methods (`when`, `between`, `set`, `order_by`, `page`), by the
/// [`ConditionHash`] supplied at construction: a clause is only emitted when
/// the bag holds a value of the field's type under the field's name.
///
/// Misuse (a conditional method without a bag, an empty field name or join
/// condition) does not panic. The offending call emits nothing and the first
/// such error is returned from [`render`](Self::render) /
/// [`build`](Self::build) as [`SqlError::Precondition`].
pub struct ModelBuilder<M> {
    builder: SqlBuilder,
    conditions: Option<ConditionHash>,
    build_error: Option<String>,
    _model: PhantomData<fn() -> M>,
}

impl<M> Clone for ModelBuilder<M> {
    fn clone(&self) -> Self {
        Self {
            builder: self.builder.clone(),
            conditions: self.conditions.clone(),
            build_error: self.build_error.clone(),
            _model: PhantomData,
        }
    }
}

impl<M> fmt::Debug for ModelBuilder<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelBuilder")
            .field("builder", &self.builder)
            .field("conditions", &self.conditions)
            .field("build_error", &self.build_error)
            .finish()
    }
}

impl<M: Model> Default for ModelBuilder<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Model> ModelBuilder<M> {
    /// Builder without a parameter bag; only the unconditional methods work.
    pub fn new() -> Self {
        Self {
            builder: SqlBuilder::new(),
            conditions: None,
            build_error: None,
            _model: PhantomData,
        }
    }

    /// Builder driven by `conditions`.
    pub fn with_conditions(conditions: ConditionHash) -> Self {
        Self {
            conditions: Some(conditions),
            ..Self::new()
        }
    }

    pub fn with_config(mut self, config: BuilderConfig) -> Self {
        self.builder = self.builder.with_config(config);
        self
    }

    fn map_builder(mut self, f: impl FnOnce(SqlBuilder) -> SqlBuilder) -> Self {
        self.builder = f(self.builder);
        self
    }

    /// Record a precondition violation; the first one wins.
    fn fail(mut self, message: impl Into<String>) -> Self {
        let message = message.into();
        tracing::debug!(model = M::TABLE, error = %message, "builder precondition violated");
        if self.build_error.is_none() {
            self.build_error = Some(message);
        }
        self
    }

    /// Render a column for the current mode: bare without an alias,
    /// backticked outside SELECT, `alias.column` otherwise.
    fn column_sql(&self, alias: Option<&str>, column: &str) -> String {
        match alias {
            None | Some("") => column.to_string(),
            Some(_) if !self.builder.is_select() => format!("`{column}`"),
            Some(alias) => format!("{alias}.{column}"),
        }
    }

    fn field_sql<E, T>(&self, field: &Field<E, T>) -> String {
        self.column_sql(field.alias_name(), field.column())
    }

    fn check_field<E, T>(&self, field: &Field<E, T>, op: &str) -> Result<(), String> {
        if field.name().is_empty() || field.column().is_empty() {
            Err(format!("{op}: field name is empty"))
        } else {
            Ok(())
        }
    }

    fn bag(&self, op: &str) -> Result<&ConditionHash, String> {
        self.conditions
            .as_ref()
            .ok_or_else(|| format!("{op}: no conditions supplied"))
    }

    /// Operator override from the `<column>_WhereCompare` bag key.
    fn compare_for(&self, column: &str) -> WhereCompare {
        let Some(conditions) = self.conditions.as_ref() else {
            return WhereCompare::Equal;
        };
        conditions.get(&WhereCompare::key_for(column), WhereCompare::Equal)
    }

    // ==================== Tables & modes ====================

    /// FROM the model's table with `alias` (may be empty).
    pub fn table(self, alias: &str) -> Self {
        self.table_of::<M>(alias)
    }

    /// FROM another model's table.
    pub fn table_of<E: Model>(self, alias: &str) -> Self {
        self.map_builder(|b| b.table_as(E::TABLE, alias))
    }

    pub fn insert(self) -> Self {
        self.map_builder(|b| b.insert(M::TABLE))
    }

    pub fn update(self) -> Self {
        self.map_builder(|b| b.update(M::TABLE))
    }

    pub fn delete(self) -> Self {
        self.map_builder(|b| b.delete(M::TABLE))
    }

    // ==================== Conditional WHERE ====================

    /// `<col> <op> @<column>` when the bag holds a `T` under the field name.
    ///
    /// The operator is `=` unless the bag carries `<column>_WhereCompare`.
    pub fn when<E, T>(self, field: &Field<E, T>) -> Self
    where
        T: FromValue + Into<Value>,
    {
        let compare = self.compare_for(field.column());
        self.when_inner(field, None, compare)
    }

    /// Like [`when`](Self::when), with an extra predicate on the bag value.
    pub fn when_with<E, T>(self, field: &Field<E, T>, predicate: impl Fn(&T) -> bool) -> Self
    where
        T: FromValue + Into<Value>,
    {
        let compare = self.compare_for(field.column());
        self.when_inner(field, Some(&predicate as &dyn Fn(&T) -> bool), compare)
    }

    /// `when` with an explicit operator; the bag override is not consulted.
    pub fn when_cmp<E, T>(
        self,
        field: &Field<E, T>,
        predicate: Option<&dyn Fn(&T) -> bool>,
        compare: WhereCompare,
    ) -> Self
    where
        T: FromValue + Into<Value>,
    {
        self.when_inner(field, predicate, compare)
    }

    pub fn when_if<E, T>(self, gate: bool, field: &Field<E, T>) -> Self
    where
        T: FromValue + Into<Value>,
    {
        if gate { self.when(field) } else { self }
    }

    fn when_inner<E, T>(
        self,
        field: &Field<E, T>,
        predicate: Option<&dyn Fn(&T) -> bool>,
        compare: WhereCompare,
    ) -> Self
    where
        T: FromValue + Into<Value>,
    {
        if let Err(e) = self.check_field(field, "when") {
            return self.fail(e);
        }
        let value = match self.bag("when") {
            Ok(bag) => lookup::<T>(bag, field.name(), predicate),
            Err(e) => return self.fail(e),
        };
        let Some(value) = value else {
            return self;
        };
        let column = self.field_sql(field);
        self.push_comparison(&column, field.column(), value.into(), compare)
    }

    /// String-expression form of [`when`](Self::when) for columns without a
    /// descriptor (`"b.Name"`, `` "`Key`" ``).
    ///
    /// `param_name` is both the bag key and the parameter name; when empty it
    /// defaults to the last dotted segment of `field_expr` without backticks.
    pub fn when_raw<T>(self, field_expr: &str, param_name: &str) -> Self
    where
        T: FromValue + Into<Value>,
    {
        if field_expr.is_empty() {
            return self.fail("when_raw: field expression is empty");
        }
        let param = if param_name.is_empty() {
            field_expr.rsplit('.').next().map(clean_name).unwrap_or_default()
        } else {
            param_name.to_string()
        };
        let compare = self.compare_for(&param);
        let value = match self.bag("when_raw") {
            Ok(bag) => lookup::<T>(bag, &param, None),
            Err(e) => return self.fail(e),
        };
        match value {
            Some(value) => self.push_comparison(field_expr, &param, value.into(), compare),
            None => self,
        }
    }

    fn push_comparison(self, column_sql: &str, param: &str, value: Value, compare: WhereCompare) -> Self {
        let value = match (compare, value) {
            (WhereCompare::Like, Value::Str(s)) => Value::Str(format!("%{s}%")),
            (_, v) => v,
        };
        let condition = format!("{column_sql} {} @{param}", compare.as_sql());
        self.map_builder(|b| b.where_(&condition, vec![value]))
    }

    // ==================== BETWEEN ====================

    /// `<col> BETWEEN @<column>1 AND @<column>2` when the bag holds exactly
    /// two `T` values under the field name. Date/time bounds are bound as
    /// RFC 3339 strings.
    pub fn between<E, T>(self, field: &Field<E, T>) -> Self
    where
        T: FromValue + Into<Value>,
    {
        self.between_inner(field, None)
    }

    pub fn between_with<E, T>(self, field: &Field<E, T>, predicate: impl Fn(&Vec<T>) -> bool) -> Self
    where
        T: FromValue + Into<Value>,
    {
        self.between_inner(field, Some(&predicate as &dyn Fn(&Vec<T>) -> bool))
    }

    pub fn between_if<E, T>(self, gate: bool, field: &Field<E, T>) -> Self
    where
        T: FromValue + Into<Value>,
    {
        if gate { self.between(field) } else { self }
    }

    fn between_inner<E, T>(self, field: &Field<E, T>, predicate: Option<&dyn Fn(&Vec<T>) -> bool>) -> Self
    where
        T: FromValue + Into<Value>,
    {
        if let Err(e) = self.check_field(field, "between") {
            return self.fail(e);
        }
        let bag = match self.bag("between") {
            Ok(bag) => bag,
            Err(e) => return self.fail(e),
        };
        let contained = match predicate {
            Some(pred) => bag.is_contains_with::<Vec<T>>(field.name(), |v| v.len() == 2 && pred(v)),
            None => bag.is_contains::<Vec<T>>(field.name(), 2),
        };
        if !contained {
            return self;
        }
        let Some(bounds) = bag.get_array::<T>(field.name()) else {
            return self;
        };
        let mut bounds = bounds.into_iter();
        match (bounds.next(), bounds.next()) {
            (Some(lo), Some(hi)) => self.between_values(field, lo, hi),
            _ => self,
        }
    }

    /// BETWEEN with explicit bounds.
    pub fn between_values<E, T>(self, field: &Field<E, T>, lo: impl Into<Value>, hi: impl Into<Value>) -> Self {
        if let Err(e) = self.check_field(field, "between") {
            return self.fail(e);
        }
        let column = field.column();
        let condition = format!(
            "{} BETWEEN @{column}1 AND @{column}2",
            self.field_sql(field)
        );
        let args = vec![lo.into().into_round_trip(), hi.into().into_round_trip()];
        self.map_builder(|b| b.where_(&condition, args))
    }

    // ==================== UPDATE assignments ====================

    /// `` `column`=@column `` from the bag value under the field name.
    pub fn set<E, T>(self, field: &Field<E, T>) -> Self
    where
        T: FromValue + Into<Value>,
    {
        self.set_inner(field, None)
    }

    pub fn set_with<E, T>(self, field: &Field<E, T>, predicate: impl Fn(&T) -> bool) -> Self
    where
        T: FromValue + Into<Value>,
    {
        self.set_inner(field, Some(&predicate as &dyn Fn(&T) -> bool))
    }

    fn set_inner<E, T>(self, field: &Field<E, T>, predicate: Option<&dyn Fn(&T) -> bool>) -> Self
    where
        T: FromValue + Into<Value>,
    {
        if let Err(e) = self.check_field(field, "set") {
            return self.fail(e);
        }
        let value = match self.bag("set") {
            Ok(bag) => lookup::<T>(bag, field.name(), predicate),
            Err(e) => return self.fail(e),
        };
        match value {
            Some(value) => {
                let column = field.column();
                self.map_builder(|b| b.set(column, value))
            }
            None => self,
        }
    }

    /// Assignment with an explicit value.
    pub fn set_value<E, T>(self, field: &Field<E, T>, value: impl Into<Value>) -> Self {
        if let Err(e) = self.check_field(field, "set") {
            return self.fail(e);
        }
        let column = field.column();
        self.map_builder(|b| b.set(column, value))
    }

    /// `column=expr` with a literal SQL expression.
    pub fn set_literal<E, T>(self, field: &Field<E, T>, expr: &str) -> Self {
        if let Err(e) = self.check_field(field, "set") {
            return self.fail(e);
        }
        let column = field.column();
        self.map_builder(|b| b.set_literal(column, expr))
    }

    pub fn set_if<E, T>(self, gate: bool, field: &Field<E, T>, value: impl Into<Value>) -> Self {
        if gate { self.set_value(field, value) } else { self }
    }

    // ==================== INSERT ====================

    /// INSERT `` `column` `` bound to `@column`.
    pub fn value<E, T>(self, field: &Field<E, T>, value: impl Into<Value>) -> Self {
        if let Err(e) = self.check_field(field, "value") {
            return self.fail(e);
        }
        let column = format!("`{}`", field.column());
        self.map_builder(|b| b.value(&column, value))
    }

    pub fn value_literal<E, T>(self, field: &Field<E, T>, expr: &str) -> Self {
        if let Err(e) = self.check_field(field, "value") {
            return self.fail(e);
        }
        let column = field.column();
        self.map_builder(|b| b.value_literal(column, expr))
    }

    /// `ON DUPLICATE KEY UPDATE column=expr` (INSERT only).
    pub fn duplicate<E, T>(self, field: &Field<E, T>, expr: &str) -> Self {
        let column = field.column();
        self.map_builder(|b| b.duplicate(column, expr))
    }

    pub fn select_identity(self) -> Self {
        self.map_builder(SqlBuilder::select_identity)
    }

    // ==================== Unconditional WHERE ====================

    /// `<col> <condition>`, e.g. `where_field(&User::AGE, "> @age", args![18])`.
    pub fn where_field<E, T>(self, field: &Field<E, T>, condition: &str, args: Vec<Value>) -> Self {
        if let Err(e) = self.check_field(field, "where") {
            return self.fail(e);
        }
        if condition.is_empty() {
            return self.fail("where: condition is empty");
        }
        let condition = format!("{} {condition}", self.field_sql(field));
        self.map_builder(|b| b.where_(&condition, args))
    }

    pub fn where_field_if<E, T>(self, gate: bool, field: &Field<E, T>, condition: &str, args: Vec<Value>) -> Self {
        if gate { self.where_field(field, condition, args) } else { self }
    }

    pub fn where_(self, condition: &str, args: Vec<Value>) -> Self {
        self.map_builder(|b| b.where_(condition, args))
    }

    pub fn where_if(self, gate: bool, condition: &str, args: Vec<Value>) -> Self {
        self.map_builder(|b| b.where_if(gate, condition, args))
    }

    /// `<col> IN (...)`; an empty list adds nothing.
    pub fn where_in<E, T, V>(self, field: &Field<E, T>, values: impl IntoIterator<Item = V>) -> Self
    where
        V: Into<Value>,
    {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            return self;
        }
        let column = if self.builder.is_select() {
            self.field_sql(field)
        } else {
            field.column().to_string()
        };
        self.map_builder(|b| b.where_in(&column, values))
    }

    // ==================== JOIN ====================

    fn join_on_kind<J: Model, E: Model, T>(self, kind: JoinKind, join: &Field<J, T>, equals: &Field<E, T>) -> Self {
        if let Err(e) = self
            .check_field(join, "join")
            .and_then(|_| self.check_field(equals, "join"))
        {
            return self.fail(e);
        }
        let on = format!("{} = {}", join.qualified(), equals.qualified());
        let alias = join.alias_name().unwrap_or("");
        self.map_builder(|b| b.join_kind(kind, J::TABLE, alias, &on))
    }

    fn join_cond_kind<J: Model, T>(self, kind: JoinKind, field: &Field<J, T>, condition: &str) -> Self {
        if let Err(e) = self.check_field(field, "join") {
            return self.fail(e);
        }
        if condition.is_empty() {
            return self.fail("join: condition is empty");
        }
        let on = format!("{} {condition}", field.qualified());
        let alias = field.alias_name().unwrap_or("");
        self.map_builder(|b| b.join_kind(kind, J::TABLE, alias, &on))
    }

    /// `JOIN <J table> <alias> ON join = equals`.
    pub fn join_on<J: Model, E: Model, T>(self, join: &Field<J, T>, equals: &Field<E, T>) -> Self {
        self.join_on_kind(JoinKind::Plain, join, equals)
    }

    pub fn left_join_on<J: Model, E: Model, T>(self, join: &Field<J, T>, equals: &Field<E, T>) -> Self {
        self.join_on_kind(JoinKind::Left, join, equals)
    }

    pub fn right_join_on<J: Model, E: Model, T>(self, join: &Field<J, T>, equals: &Field<E, T>) -> Self {
        self.join_on_kind(JoinKind::Right, join, equals)
    }

    pub fn inner_join_on<J: Model, E: Model, T>(self, join: &Field<J, T>, equals: &Field<E, T>) -> Self {
        self.join_on_kind(JoinKind::Inner, join, equals)
    }

    pub fn straight_join_on<J: Model, E: Model, T>(self, join: &Field<J, T>, equals: &Field<E, T>) -> Self {
        self.join_on_kind(JoinKind::Straight, join, equals)
    }

    /// `JOIN <J table> <alias> ON <field> <condition>`.
    pub fn join_cond<J: Model, T>(self, field: &Field<J, T>, condition: &str) -> Self {
        self.join_cond_kind(JoinKind::Plain, field, condition)
    }

    pub fn left_join_cond<J: Model, T>(self, field: &Field<J, T>, condition: &str) -> Self {
        self.join_cond_kind(JoinKind::Left, field, condition)
    }

    pub fn right_join_cond<J: Model, T>(self, field: &Field<J, T>, condition: &str) -> Self {
        self.join_cond_kind(JoinKind::Right, field, condition)
    }

    pub fn inner_join_cond<J: Model, T>(self, field: &Field<J, T>, condition: &str) -> Self {
        self.join_cond_kind(JoinKind::Inner, field, condition)
    }

    pub fn straight_join_cond<J: Model, T>(self, field: &Field<J, T>, condition: &str) -> Self {
        self.join_cond_kind(JoinKind::Straight, field, condition)
    }

    // ==================== SELECT list, ordering, paging ====================

    /// ORDER BY from the bag's `OrderBy` / `ASC` keys.
    ///
    /// The value comes from the request, so it must be a plain (optionally
    /// dotted or backticked) identifier; anything else is dropped with a
    /// warning.
    pub fn order_by(self) -> Self {
        let requested = match self.bag("order_by") {
            Ok(bag) if bag.is_contains::<String>(ORDER_BY_KEY, -1) => {
                let field = bag.get(ORDER_BY_KEY, String::new());
                let asc = bag.get(ASC_KEY, false);
                Some((field, asc))
            }
            Ok(_) => None,
            Err(e) => return self.fail(e),
        };
        let Some((field, asc)) = requested else {
            return self;
        };
        match Ident::parse(field.trim()) {
            Ok(ident) => {
                let column = ident.to_sql();
                self.map_builder(|b| b.order_by(&column, OrderType::from_asc(asc)))
            }
            Err(e) => {
                tracing::warn!(order_by = %field, error = %e, "invalid ORDER BY field dropped");
                self
            }
        }
    }

    pub fn order_by_field<E, T>(self, field: &Field<E, T>, dir: OrderType) -> Self {
        if let Err(e) = self.check_field(field, "order_by") {
            return self.fail(e);
        }
        let column = self.field_sql(field);
        self.map_builder(|b| b.order_by(&column, dir))
    }

    pub fn group_by<E, T>(self, field: &Field<E, T>) -> Self {
        if let Err(e) = self.check_field(field, "group_by") {
            return self.fail(e);
        }
        let column = self.field_sql(field);
        self.map_builder(|b| b.group_by(&[column.as_str()]))
    }

    /// Append `qualifier.column` for each field.
    pub fn select_fields(self, fields: &[&dyn FieldRef]) -> Self {
        let columns: Vec<String> = fields
            .iter()
            .map(|f| format!("{}.{}", f.qualifier(), f.column()))
            .collect();
        let refs: Vec<&str> = columns.iter().map(String::as_str).collect();
        self.map_builder(|b| b.select(&refs))
    }

    /// Append `qualifier.column select_alias`.
    pub fn select_as<E: Model, T>(self, field: &Field<E, T>, select_alias: &str) -> Self {
        if let Err(e) = self.check_field(field, "select") {
            return self.fail(e);
        }
        let column = if select_alias.is_empty() {
            field.qualified()
        } else {
            format!("{} {select_alias}", field.qualified())
        };
        self.map_builder(|b| b.select(&[column.as_str()]))
    }

    pub fn select(self, fields: &[&str]) -> Self {
        self.map_builder(|b| b.select(fields))
    }

    pub fn clear_select(self) -> Self {
        self.map_builder(SqlBuilder::clear_select)
    }

    pub fn limit(self, offset: i64, rows: i64) -> Self {
        self.map_builder(|b| b.limit(offset, rows))
    }

    pub fn for_update(self) -> Self {
        self.map_builder(SqlBuilder::for_update)
    }

    /// Paginate from the bag's `PageIndex` / `PageSize`, falling back to the
    /// configured defaults.
    pub fn page(self, emit_count: bool, totals: &str) -> Self {
        let (index, size) = match self.bag("page") {
            Ok(bag) => {
                let config = self.builder.config();
                (
                    bag.get(PAGE_INDEX_KEY, config.default_page_index),
                    bag.get(PAGE_SIZE_KEY, config.default_page_size),
                )
            }
            Err(e) => return self.fail(e),
        };
        self.page_with(index, size, emit_count, totals)
    }

    pub fn page_with(self, page_index: i32, page_size: i32, emit_count: bool, totals: &str) -> Self {
        self.map_builder(|b| b.page(page_index, page_size, emit_count, totals))
    }

    // ==================== Output ====================

    pub fn render(&self) -> SqlResult<String> {
        if let Some(message) = &self.build_error {
            return Err(SqlError::precondition(message.clone()));
        }
        self.builder.render()
    }

    pub fn build(self) -> SqlResult<Statement> {
        if let Some(message) = self.build_error {
            return Err(SqlError::precondition(message));
        }
        self.builder.build()
    }

    pub fn params(&self) -> &Params {
        self.builder.params()
    }

    pub fn conditions(&self) -> Option<&ConditionHash> {
        self.conditions.as_ref()
    }

    pub fn builder(&self) -> &SqlBuilder {
        &self.builder
    }

    pub fn into_builder(self) -> SqlBuilder {
        self.builder
    }

    pub fn mode(&self) -> Mode {
        self.builder.mode()
    }

    pub fn is_count_total(&self) -> bool {
        self.builder.is_count_total()
    }
}

/// The bag value under `key` as `T`, if present, coercible and accepted by
/// `predicate`.
fn lookup<T: FromValue>(bag: &ConditionHash, key: &str, predicate: Option<&dyn Fn(&T) -> bool>) -> Option<T> {
    let contained = match predicate {
        Some(pred) => bag.is_contains_with::<T>(key, pred),
        None => bag.is_contains::<T>(key, -1),
    };
    if !contained {
        return None;
    }
    bag.value(key).and_then(T::from_value)
}
