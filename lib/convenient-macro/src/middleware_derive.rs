//! `MiddlewareInfo` derive macro implementation.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{DeriveInput, parse2};

use crate::attrs::{EntityAttr, IntendedForAttrs, parse_middleware_attrs, to_snake_case};

/// Expand the `#[derive(MiddlewareInfo)]` macro.
pub fn expand_middleware_info(input: TokenStream) -> syn::Result<TokenStream> {
    let input: DeriveInput = parse2(input)?;
    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let options = parse_middleware_attrs(&input.attrs)?;
    let name = options
        .name
        .unwrap_or_else(|| to_snake_case(&ident.to_string()));

    let intended_for = options.intended_for.map(|intended_for| {
        let body = intended_for_expr(&intended_for);
        quote! {
            fn intended_for(&self) -> ::convenient::IntendedFor {
                #body
            }
        }
    });

    Ok(quote! {
        impl #impl_generics ::convenient::MiddlewareInfo for #ident #ty_generics #where_clause {
            fn name(&self) -> &'static str {
                #name
            }

            #intended_for
        }
    })
}

fn intended_for_expr(intended_for: &IntendedForAttrs) -> TokenStream {
    let mut expr = match &intended_for.methods {
        Some(methods) => quote! { ::convenient::IntendedFor::methods([#(#methods),*]) },
        None => quote! { ::convenient::IntendedFor::any() },
    };

    if let Some(scope) = intended_for.scope {
        let variant = format_ident!("{}", scope.variant());
        expr = quote! { #expr.scope(::convenient::Scope::#variant) };
    }

    if let Some(entities) = &intended_for.entities {
        let entities = entities.iter().map(|entity| match entity {
            EntityAttr::Builtin(variant) => {
                let variant = format_ident!("{}", variant);
                quote! { ::convenient::EntityKind::#variant }
            }
            EntityAttr::Custom(name) => quote! { ::convenient::EntityKind::custom(#name) },
        });
        expr = quote! { #expr.entities([#(#entities),*]) };
    }

    expr
}
