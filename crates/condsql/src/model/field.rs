use std::fmt;
use std::marker::PhantomData;

/// A table-backed entity.
///
/// Usually implemented with `#[derive(Model)]`, which also generates one
/// [`Field`] constant per struct field.
pub trait Model {
    /// Table name used in FROM / INSERT INTO / UPDATE / JOIN.
    const TABLE: &'static str;
}

/// Compile-time descriptor of one entity field.
///
/// `name` is the entity-level name (the parameter-bag key), `column` the SQL
/// column and `alias` the table alias used to qualify the column in SELECT
/// statements. `T` is the field's value type (the inner type for `Option`
/// fields) and drives bag coercion.
pub struct Field<M, T> {
    name: &'static str,
    column: &'static str,
    alias: Option<&'static str>,
    _marker: PhantomData<fn() -> (M, T)>,
}

impl<M, T> Field<M, T> {
    pub const fn new(name: &'static str, column: &'static str) -> Self {
        Self {
            name,
            column,
            alias: None,
            _marker: PhantomData,
        }
    }

    /// The same field qualified by a table alias.
    pub const fn alias(self, alias: &'static str) -> Self {
        Self {
            alias: Some(alias),
            ..self
        }
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }

    pub const fn column(&self) -> &'static str {
        self.column
    }

    pub const fn alias_name(&self) -> Option<&'static str> {
        self.alias
    }
}

impl<M: Model, T> Field<M, T> {
    /// Alias if set, otherwise the owning table.
    pub fn qualifier(&self) -> &'static str {
        self.alias.unwrap_or(M::TABLE)
    }

    /// `qualifier.column`
    pub fn qualified(&self) -> String {
        format!("{}.{}", self.qualifier(), self.column)
    }
}

impl<M, T> Clone for Field<M, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M, T> Copy for Field<M, T> {}

impl<M, T> fmt::Debug for Field<M, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("column", &self.column)
            .field("alias", &self.alias)
            .finish()
    }
}

/// Type-erased view of a [`Field`], for lists of fields with different value
/// types (`select_fields(&[&Order::ID, &Order::TOTAL])`).
pub trait FieldRef {
    fn name(&self) -> &'static str;
    fn column(&self) -> &'static str;
    fn alias(&self) -> Option<&'static str>;
    /// Alias if set, otherwise the owning table.
    fn qualifier(&self) -> &'static str;
}

impl<M: Model, T> FieldRef for Field<M, T> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn column(&self) -> &'static str {
        self.column
    }

    fn alias(&self) -> Option<&'static str> {
        self.alias
    }

    fn qualifier(&self) -> &'static str {
        Field::qualifier(self)
    }
}
