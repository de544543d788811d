use crate::error::{GeneratorError, Result};
use syn::parse::Parse;

/// Parse model text into a syntax node, keeping the text on failure
pub fn parse<T: Parse>(text: &str) -> Result<T> {
    syn::parse_str::<T>(text).map_err(|source| GeneratorError::Tokens {
        text: text.to_string(),
        source,
    })
}

pub fn ty(text: &str) -> Result<syn::Type> {
    parse(text)
}

pub fn path(text: &str) -> Result<syn::Path> {
    parse(text)
}

pub fn ident(text: &str) -> Result<syn::Ident> {
    parse(text)
}

/// Spell a model path as seen from inside the crate under analysis
pub fn qualify(crate_name: &str, path: &str) -> String {
    let path = path.trim_start_matches("::");
    match path.strip_prefix(crate_name).and_then(|rest| rest.strip_prefix("::")) {
        Some(rest) if !crate_name.is_empty() => format!("crate::{rest}"),
        _ if path.starts_with("crate::") => path.to_string(),
        _ => format!("::{path}"),
    }
}
