//! `#[orm(...)]` attribute parsing for the Model derive.

use syn::{DeriveInput, LitStr, Result};

use crate::sql_ident::parse_sql_ident;

/// Field-level `#[orm(...)]` options.
#[derive(Default)]
pub(super) struct FieldAttr {
    pub column: Option<String>,
    pub name: Option<String>,
    pub skip: bool,
}

/// Extract the table name from struct-level `#[orm(table = "...")]`.
pub(super) fn get_table_name(input: &DeriveInput) -> Result<String> {
    let mut table = None;
    for attr in input.attrs.iter().filter(|a| a.path().is_ident("orm")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("table") {
                let lit: LitStr = meta.value()?.parse()?;
                table = Some(parse_sql_ident(&lit, "table")?);
                Ok(())
            } else {
                Err(meta.error("unsupported struct attribute, expected `table`"))
            }
        })?;
    }
    table.ok_or_else(|| {
        syn::Error::new_spanned(
            &input.ident,
            "Model requires #[orm(table = \"table_name\")] attribute",
        )
    })
}

pub(super) fn get_field_attr(field: &syn::Field) -> Result<FieldAttr> {
    let mut out = FieldAttr::default();
    for attr in field.attrs.iter().filter(|a| a.path().is_ident("orm")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("column") {
                let lit: LitStr = meta.value()?.parse()?;
                let column = parse_sql_ident(&lit, "column")?;
                if column.contains('.') {
                    return Err(syn::Error::new(lit.span(), "column must not be qualified"));
                }
                out.column = Some(column);
            } else if meta.path.is_ident("name") {
                let lit: LitStr = meta.value()?.parse()?;
                let name = lit.value();
                if name.trim().is_empty() {
                    return Err(syn::Error::new(lit.span(), "name must not be empty"));
                }
                out.name = Some(name);
            } else if meta.path.is_ident("skip") {
                out.skip = true;
            } else {
                return Err(meta.error("unsupported field attribute, expected `column`, `name` or `skip`"));
            }
            Ok(())
        })?;
    }
    Ok(out)
}
