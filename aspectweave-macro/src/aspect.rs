use darling::{ast, FromDeriveInput, FromField};
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, DeriveInput, Type};

#[derive(FromField)]
struct AspectField {
    ident: Option<syn::Ident>,
    ty: Type,
}

#[derive(FromDeriveInput)]
#[darling(attributes(aspect), supports(struct_named, struct_unit))]
struct AspectArgs {
    ident: syn::Ident,
    generics: syn::Generics,
    data: ast::Data<(), AspectField>,
    /// Kept as an expression so negative orders (`-1000`) parse as written.
    #[darling(default)]
    default_order: Option<syn::Expr>,
}

pub fn derive_aspect(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match AspectArgs::from_derive_input(&input) {
        Ok(args) => TokenStream::from(generate_aspect_impl(&args)),
        Err(err) => TokenStream::from(err.write_errors()),
    }
}

fn generate_aspect_impl(args: &AspectArgs) -> TokenStream2 {
    let struct_name = &args.ident;
    let (impl_generics, ty_generics, where_clause) = args.generics.split_for_impl();

    let default_order = match &args.default_order {
        Some(expr) => quote!(#expr),
        None => quote!(0),
    };

    let order_field = match &args.data {
        ast::Data::Struct(fields) => fields
            .iter()
            .find(|field| field.ident.as_ref().is_some_and(|ident| ident == "order")),
        ast::Data::Enum(_) => None,
    };

    let order_body = match order_field {
        Some(field) if is_option(&field.ty) => {
            quote!(self.order.unwrap_or(Self::DEFAULT_ORDER))
        }
        Some(_) => quote!(self.order),
        None => quote!(Self::DEFAULT_ORDER),
    };

    quote! {
        impl #impl_generics ::aspectweave::Aspect for #struct_name #ty_generics #where_clause {
            const DEFAULT_ORDER: i32 = #default_order;

            fn order(&self) -> i32 {
                #order_body
            }
        }
    }
}

/// True for `Option<T>` written with any path prefix
fn is_option(ty: &Type) -> bool {
    if let Type::Path(type_path) = ty {
        if let Some(segment) = type_path.path.segments.last() {
            return segment.ident == "Option";
        }
    }
    false
}
