//! Derive macros for condsql
//!
//! Provides `#[derive(Model)]` and `#[derive(ValueEnum)]`.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod common;
mod model;
mod sql_ident;
mod value_enum;

/// Derive `Model` metadata and `Field` descriptors for a struct.
///
/// # Example
///
/// ```ignore
/// use condsql::Model;
///
/// #[derive(Model)]
/// #[orm(table = "users")]
/// struct User {
///     id: i64,
///     #[orm(column = "user_name")]
///     name: String,
///     age: Option<i32>,
/// }
///
/// // User::TABLE == "users"
/// // User::NAME: Field<User, String>, bag key "name", column "user_name"
/// // User::AGE: Field<User, i32>
/// ```
///
/// # Attributes
///
/// - `#[orm(table = "name")]` - Table name (required)
/// - `#[orm(column = "name")]` - Map field to a different column name
/// - `#[orm(name = "Key")]` - Parameter-bag key (defaults to the field name)
/// - `#[orm(skip)]` - Generate no descriptor for this field
#[proc_macro_derive(Model, attributes(orm))]
pub fn derive_model(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    model::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

/// Derive bag coercion for a fieldless enum.
///
/// Generates `FromValue` (accepting the variant name or its discriminant)
/// and `From<Enum> for Value` (the discriminant), so the enum can be used
/// as a `Field` value type.
///
/// # Example
///
/// ```ignore
/// use condsql::ValueEnum;
///
/// #[derive(Clone, Copy, ValueEnum)]
/// enum Status {
///     Pending = 0,
///     Paid = 1,
///     Shipped = 2,
/// }
/// ```
#[proc_macro_derive(ValueEnum)]
pub fn derive_value_enum(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    value_enum::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
