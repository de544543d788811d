use super::tokens;
use crate::discovery::AspectInfo;
use crate::error::Result;
use crate::model::{ConstValue, TypeSymbol};
use proc_macro2::{Literal, TokenStream};
use quote::quote;

/// Shape of the attribute's usage-site order field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderField {
    /// `order: Option<i32>`
    Optional,
    /// `order: i32`
    Plain,
    /// No such field; the override only affects the wrap order fixed at analysis
    Absent,
}

impl OrderField {
    pub fn of(attribute: &TypeSymbol, order_argument: &str) -> Self {
        match attribute.members.iter().find(|member| member.name == order_argument) {
            Some(member) if member.ty.is_option() => Self::Optional,
            Some(_) => Self::Plain,
            None => Self::Absent,
        }
    }
}

/// Expression rebuilding the attribute instance from its usage arguments
pub fn rehydrate(
    attribute_path: &str,
    aspect: &AspectInfo,
    order_argument: &str,
    order_field: OrderField,
) -> Result<TokenStream> {
    let path = tokens::path(attribute_path)?;
    let usage = &aspect.attribute;

    let mut fields = Vec::with_capacity(usage.named.len());
    for argument in &usage.named {
        let value = render(&argument.value)?;
        let value = if argument.name != order_argument {
            value
        } else {
            match order_field {
                OrderField::Optional => quote! { ::core::option::Option::Some(#value) },
                OrderField::Plain => value,
                OrderField::Absent => continue,
            }
        };
        fields.push((tokens::ident(&argument.name)?, value));
    }

    if !usage.arguments.is_empty() {
        let arguments = usage.arguments.iter().map(render).collect::<Result<Vec<_>>>()?;
        let assignments = fields.iter().map(|(field, value)| quote! { __aspect.#field = #value; });
        let binding = if fields.is_empty() {
            quote! { __aspect }
        } else {
            quote! { mut __aspect }
        };
        return Ok(quote! {{
            let #binding = #path::new(#(#arguments),*);
            #(#assignments)*
            __aspect
        }});
    }

    if fields.is_empty() {
        return Ok(quote! { <#path as ::core::default::Default>::default() });
    }

    let assignments = fields.iter().map(|(field, value)| quote! { #field: #value });
    Ok(quote! {
        #path {
            #(#assignments,)*
            ..::core::default::Default::default()
        }
    })
}

/// Render one constant as a Rust expression
pub fn render(value: &ConstValue) -> Result<TokenStream> {
    Ok(match value {
        ConstValue::Int(value) => {
            let magnitude = Literal::u64_unsuffixed(value.unsigned_abs());
            if *value < 0 {
                quote! { -#magnitude }
            } else {
                quote! { #magnitude }
            }
        }
        ConstValue::Bool(value) => quote! { #value },
        ConstValue::Str(value) => quote! { ::core::convert::Into::into(#value) },
        ConstValue::Char(value) => quote! { #value },
        ConstValue::Float(text) => {
            let literal: syn::LitFloat = tokens::parse(text)?;
            quote! { #literal }
        }
        ConstValue::Enum(variant) => {
            let variant = tokens::path(variant)?;
            quote! { #variant }
        }
        ConstValue::Type(name) => {
            let ty = tokens::ty(name)?;
            quote! { ::core::any::TypeId::of::<#ty>() }
        }
        ConstValue::Array(items) => {
            let items = items.iter().map(render).collect::<Result<Vec<_>>>()?;
            quote! { ::std::vec![#(#items),*] }
        }
        ConstValue::Null => quote! { ::core::option::Option::None },
    })
}
