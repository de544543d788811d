//! Rendering of distinct call sites into one generated module.

mod interceptor;
mod rehydrate;
mod tokens;

pub use rehydrate::render as render_constant;

use crate::call_site::{CallSite, CallSiteId};
use crate::config::WeaverConfig;
use crate::error::Result;
use crate::model::Compilation;
use crate::synthesis::synthesize;
use proc_macro2::TokenStream;
use quote::quote;
use std::collections::HashSet;

/// Output of one generator run
#[derive(Debug, Clone)]
pub struct GeneratedFile {
    pub file_name: String,
    pub module_name: String,
    /// Distinct call sites in id order
    pub call_sites: Vec<(CallSiteId, CallSite)>,
    pub tokens: TokenStream,
}

impl GeneratedFile {
    /// Source text of the generated module
    pub fn contents(&self) -> String {
        format!("// @generated by aspectweave-generator\n{}\n", self.tokens)
    }

    pub fn interceptors(&self) -> usize {
        self.call_sites.len()
    }
}

pub struct Emitter<'c> {
    config: &'c WeaverConfig,
}

impl<'c> Emitter<'c> {
    pub fn new(config: &'c WeaverConfig) -> Self {
        Self { config }
    }

    /// Render every distinct call site; `None` when nothing is woven
    pub fn emit(&self, compilation: &Compilation, targets: &[CallSite]) -> Result<Option<GeneratedFile>> {
        let distinct = dedupe(targets);
        if distinct.is_empty() {
            return Ok(None);
        }

        let mut call_sites = Vec::with_capacity(distinct.len());
        let mut interceptors = Vec::with_capacity(distinct.len());
        for (index, site) in distinct.into_iter().enumerate() {
            let id = CallSiteId(index);
            let description = synthesize(compilation, site)?;
            interceptors.push(interceptor::render(compilation, self.config, id, site, &description)?);
            tracing::trace!(call_site = index, location = %site.location, "rendered interceptor");
            call_sites.push((id, site.clone()));
        }

        let module = tokens::ident(&self.config.module_name)?;
        let tokens = quote! {
            #[allow(dead_code, unused_variables, clippy::all)]
            pub(crate) mod #module {
                #(#interceptors)*
            }
        };

        Ok(Some(GeneratedFile {
            file_name: self.config.file_name.clone(),
            module_name: self.config.module_name.clone(),
            call_sites,
            tokens,
        }))
    }
}

/// First occurrence of each distinct call site, in input order
pub fn dedupe(targets: &[CallSite]) -> Vec<&CallSite> {
    let mut seen = HashSet::new();
    targets.iter().filter(|site| seen.insert(*site)).collect()
}
