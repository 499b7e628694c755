//! Model derive macro implementation
//!
//! Emits `impl condsql::Model` with the table name and, in an inherent
//! impl, one `Field` constant per named field (`first_name` becomes
//! `FIRST_NAME`).

mod attrs;

use attrs::{get_field_attr, get_table_name};
use heck::ToShoutySnakeCase;
use proc_macro2::{Span, TokenStream};
use quote::{format_ident, quote};
use std::collections::HashSet;
use syn::ext::IdentExt;
use syn::{Data, DeriveInput, Fields, Result};

use crate::common::syn_types::value_type;
use crate::sql_ident::parse_sql_ident_with_span;

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let table_name = get_table_name(&input)?;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Model can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Model can only be derived for structs",
            ));
        }
    };

    let mut consts = Vec::new();
    let mut seen = HashSet::new();

    for field in fields {
        let attr = get_field_attr(field)?;
        if attr.skip {
            continue;
        }
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let field_name = ident.unraw().to_string();

        let column = match attr.column {
            Some(column) => column,
            None => parse_sql_ident_with_span(&field_name, ident.span(), "column")?,
        };
        let key = attr.name.unwrap_or_else(|| field_name.clone());

        let const_name = field_name.to_shouty_snake_case();
        if !seen.insert(const_name.clone()) {
            return Err(syn::Error::new_spanned(
                ident,
                format!("field descriptor `{const_name}` is generated twice"),
            ));
        }
        let const_ident = format_ident!("{}", const_name, span = Span::call_site());
        let ty = value_type(&field.ty);
        let vis = &field.vis;

        consts.push(quote! {
            #vis const #const_ident: ::condsql::Field<Self, #ty> =
                ::condsql::Field::new(#key, #column);
        });
    }

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::condsql::model::Model for #name #ty_generics #where_clause {
            const TABLE: &'static str = #table_name;
        }

        #[allow(dead_code)]
        impl #impl_generics #name #ty_generics #where_clause {
            #(#consts)*
        }
    })
}
