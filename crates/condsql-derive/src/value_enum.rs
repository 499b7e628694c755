use proc_macro2::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::{Data, DeriveInput, Fields, Result};

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "ValueEnum does not support generic enums",
        ));
    }

    let Data::Enum(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            &input,
            "ValueEnum can only be derived for enums",
        ));
    };
    if data.variants.is_empty() {
        return Err(syn::Error::new_spanned(
            &input,
            "ValueEnum requires at least one variant",
        ));
    }

    let mut name_arms = Vec::new();
    let mut code_arms = Vec::new();
    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                variant,
                "ValueEnum variants must not carry data",
            ));
        }
        let ident = &variant.ident;
        let label = ident.unraw().to_string();
        name_arms.push(quote! {
            if s.eq_ignore_ascii_case(#label) {
                return ::core::option::Option::Some(#name::#ident);
            }
        });
        code_arms.push(quote! {
            if code == #name::#ident as i64 {
                return ::core::option::Option::Some(#name::#ident);
            }
        });
    }

    Ok(quote! {
        impl #name {
            #[doc(hidden)]
            fn __condsql_from_code(code: i64) -> ::core::option::Option<Self> {
                #(#code_arms)*
                ::core::option::Option::None
            }
        }

        impl ::condsql::FromValue for #name {
            fn from_value(value: &::condsql::Value) -> ::core::option::Option<Self> {
                match value {
                    ::condsql::Value::Str(s) => {
                        let s = s.trim();
                        #(#name_arms)*
                        s.parse::<i64>().ok().and_then(Self::__condsql_from_code)
                    }
                    ::condsql::Value::I16(n) => Self::__condsql_from_code(i64::from(*n)),
                    ::condsql::Value::I32(n) => Self::__condsql_from_code(i64::from(*n)),
                    ::condsql::Value::I64(n) => Self::__condsql_from_code(*n),
                    _ => ::core::option::Option::None,
                }
            }
        }

        impl ::core::convert::From<#name> for ::condsql::Value {
            fn from(value: #name) -> Self {
                ::condsql::Value::I32(value as i32)
            }
        }
    })
}
