use proc_macro::TokenStream;

mod aspect;

/// Derive macro implementing `aspectweave::Aspect` for an attribute struct
///
/// The default execution order is declared with `#[aspect(default_order = N)]`
/// and becomes the `DEFAULT_ORDER` constant. A field named `order`
/// (`Option<i32>` or `i32`) is the usage-site override and wins when set.
///
/// # Example
/// ```ignore
/// use aspectweave::Aspect;
///
/// #[derive(Aspect, Debug, Clone, Default)]
/// #[aspect(default_order = 1000)]
/// pub struct Retry {
///     pub order: Option<i32>,
///     pub max_attempts: u32,
/// }
/// ```
#[proc_macro_derive(Aspect, attributes(aspect))]
pub fn derive_aspect(input: TokenStream) -> TokenStream {
    aspect::derive_aspect(input)
}

/// Marks a generated interceptor with the call-site location it replaces
///
/// The attribute is consumed by build integration; on its own it passes the
/// item through unchanged.
///
/// # Example
/// ```ignore
/// #[aspectweave::intercepts("src/orders.rs", 42, 17)]
/// fn intercept_method_0() {}
/// ```
#[proc_macro_attribute]
pub fn intercepts(_attr: TokenStream, item: TokenStream) -> TokenStream {
    // Pass-through, the location is read by the weaving driver
    item
}
