use super::{rehydrate, tokens};
use crate::call_site::{CallSite, CallSiteId};
use crate::config::WeaverConfig;
use crate::error::Result;
use crate::model::{Compilation, MethodSymbol, PassMode};
use crate::synthesis::{Capture, CoreReceiver, PipelineDescription};
use proc_macro2::{Literal, TokenStream};
use quote::{format_ident, quote};

/// Render the interceptor function replacing one call site
pub fn render(
    compilation: &Compilation,
    config: &WeaverConfig,
    id: CallSiteId,
    site: &CallSite,
    description: &PipelineDescription,
) -> Result<TokenStream> {
    let method = compilation.method(site.target)?;
    let rt = tokens::path(&config.runtime_path)?;
    let intercepts = tokens::path(&config.intercepts_attribute)?;
    let owner = tokens::ty(&tokens::qualify(
        &compilation.crate_name,
        &compilation.ty(method.owner)?.path,
    ))?;
    let name = format_ident!("{}", id.interceptor_name(&method.name));

    let file = site.location.file.as_str();
    let line = Literal::u32_unsuffixed(site.location.line);
    let column = Literal::u32_unsuffixed(site.location.column);

    let generics = generics(method)?;
    let parameters = parameters(method)?;
    let output = output(method)?;
    let asyncness = description.context.is_async.then(|| quote! { async });

    let method_slot = method_slot(method, site, description, &rt)?;
    let attribute_slots = attribute_slots(compilation, site, description, config, &rt)?;
    let provider = provider(site, &rt)?;
    let snapshot = snapshot(description, &rt)?;
    let by_ref = method
        .parameters
        .iter()
        .filter(|parameter| parameter.mode != PassMode::Value)
        .map(|parameter| {
            let name = tokens::ident(&parameter.name)?;
            Ok(quote! { let #name = #rt::ByRef::new(#name); })
        })
        .collect::<Result<Vec<_>>>()?;
    let core = core(compilation, method, description, &rt)?;

    let target = if description.context.has_target {
        quote! { ::core::option::Option::Some(this as &(dyn ::core::any::Any + ::core::marker::Send + ::core::marker::Sync)) }
    } else {
        quote! { ::core::option::Option::None }
    };

    // Highest Order first; the last wrap is the outermost stage
    let wraps = description.wrappers.iter().map(|stage| {
        let attribute = format_ident!("__aspect_{}", stage.aspect_index);
        quote! {
            .wrap(__provider, #attribute)
            .unwrap_or_else(|__error| __error.raise())
        }
    });

    let run = if description.blocking {
        quote! { __pipeline.run_blocking(__context) }
    } else {
        quote! { __pipeline.run(__context).await }
    };
    let finish = finish(method, &rt)?;

    Ok(quote! {
        #[#intercepts(#file, #line, #column)]
        #[inline]
        pub(crate) #asyncness fn #name #generics (this: &#owner, #(#parameters),*) #output {
            #method_slot
            #(#attribute_slots)*
            #provider
            #snapshot
            let __context = #rt::InvocationContext::new(#target, __provider, __method, __arguments);
            #(#by_ref)*
            let __pipeline = #rt::Pipeline::new(#core)
                #(#wraps)*;
            let __result = #run;
            #finish
        }
    })
}

fn generics(method: &MethodSymbol) -> Result<TokenStream> {
    if method.generics.is_empty() {
        return Ok(TokenStream::new());
    }
    let params = method
        .generics
        .iter()
        .map(|param| {
            let name = tokens::ident(&param.name)?;
            let bounds = param
                .bounds
                .iter()
                .map(|bound| tokens::parse::<syn::TypeParamBound>(bound))
                .collect::<Result<Vec<_>>>()?;
            // Captured into the type-erased snapshot and moved across the chain
            Ok(quote! {
                #name: #(#bounds +)* ::core::clone::Clone + ::core::marker::Send + ::core::marker::Sync + 'static
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(quote! { <#(#params),*> })
}

fn parameters(method: &MethodSymbol) -> Result<Vec<TokenStream>> {
    method
        .parameters
        .iter()
        .map(|parameter| {
            let name = tokens::ident(&parameter.name)?;
            let ty = tokens::ty(&parameter.ty.name)?;
            Ok(match parameter.mode {
                PassMode::Value => quote! { #name: #ty },
                PassMode::Ref | PassMode::Out => quote! { #name: &mut #ty },
            })
        })
        .collect()
}

fn output(method: &MethodSymbol) -> Result<TokenStream> {
    let value = method
        .returns
        .value
        .as_ref()
        .map(|value| tokens::ty(&value.name))
        .transpose()?;
    Ok(match (&value, &method.returns.error) {
        (Some(value), None) => quote! { -> #value },
        (None, None) => TokenStream::new(),
        (value, Some(error)) => {
            let error = tokens::ty(&error.name)?;
            let value = value.as_ref().map_or_else(|| quote! { () }, |value| quote! { #value });
            quote! { -> ::core::result::Result<#value, #error> }
        }
    })
}

fn method_slot(
    method: &MethodSymbol,
    site: &CallSite,
    description: &PipelineDescription,
    rt: &syn::Path,
) -> Result<TokenStream> {
    let type_name = description.context.type_name.as_str();
    let method_name = description.context.method_name.as_str();
    let is_async = description.context.is_async;

    let parameters = method.parameters.iter().map(|parameter| {
        let name = parameter.name.as_str();
        let ty = parameter.ty.name.as_str();
        let mode = match parameter.mode {
            PassMode::Value => quote! { Value },
            PassMode::Ref => quote! { Ref },
            PassMode::Out => quote! { Out },
        };
        let info = quote! { #rt::ParameterInfo::new(#name, #ty, #rt::PassMode::#mode) };
        if parameter.constraints.is_empty() {
            info
        } else {
            let constraints = parameter.constraints.iter().map(String::as_str);
            quote! { #info.with_constraints(&[#(#constraints),*]) }
        }
    });

    let generic_arguments = if site.generic_arguments.is_empty() {
        TokenStream::new()
    } else {
        let arguments = site.generic_arguments.iter().map(String::as_str);
        quote! { .with_generic_arguments(&[#(#arguments),*]) }
    };

    Ok(quote! {
        static __PARAMETERS: &[#rt::ParameterInfo] = &[#(#parameters),*];
        static __METHOD: #rt::MethodSlot = #rt::MethodSlot::new();
        let __method: &'static #rt::MethodHandle = __METHOD.get_or_init(|| {
            #rt::MethodHandle::new(#type_name, #method_name, __PARAMETERS, #is_async)
                #generic_arguments
        });
    })
}

fn attribute_slots(
    compilation: &Compilation,
    site: &CallSite,
    description: &PipelineDescription,
    config: &WeaverConfig,
    rt: &syn::Path,
) -> Result<Vec<TokenStream>> {
    let aspects: Vec<_> = site.aspects.iter().collect();
    let mut stages: Vec<_> = description.wrappers.iter().collect();
    stages.sort_by_key(|stage| stage.aspect_index);

    stages
        .into_iter()
        .map(|stage| {
            let attribute_path = tokens::qualify(&compilation.crate_name, &stage.attribute_path);
            let ty = tokens::ty(&attribute_path)?;
            let slot = format_ident!("__ASPECT_{}", stage.aspect_index);
            let binding = format_ident!("__aspect_{}", stage.aspect_index);
            let order_field = rehydrate::OrderField::of(
                compilation.ty(stage.attribute_type)?,
                &config.order_argument,
            );
            let value = rehydrate::rehydrate(
                &attribute_path,
                aspects[stage.aspect_index],
                &config.order_argument,
                order_field,
            )?;
            Ok(quote! {
                static #slot: #rt::AttributeSlot<#ty> = #rt::AttributeSlot::new();
                let #binding: &'static #ty = #slot.get_or_init(|| #value);
            })
        })
        .collect()
}

fn provider(site: &CallSite, rt: &syn::Path) -> Result<TokenStream> {
    let expression: syn::Expr = tokens::parse(&site.provider_access.expression("this"))?;
    Ok(quote! {
        let __provider: &dyn #rt::ServiceProvider = &#expression;
    })
}

fn snapshot(description: &PipelineDescription, rt: &syn::Path) -> Result<TokenStream> {
    let captures = description
        .context
        .captured
        .iter()
        .map(|argument| {
            let key = argument.name.as_str();
            let name = tokens::ident(&argument.name)?;
            Ok(match argument.capture {
                Capture::Value => quote! { .value(#key, ::core::clone::Clone::clone(&#name)) },
                Capture::Optional => quote! { .optional(#key, ::core::clone::Clone::clone(&#name)) },
                Capture::Referent => quote! { .value(#key, ::core::clone::Clone::clone(&*#name)) },
                Capture::OptionalReferent => {
                    quote! { .optional(#key, ::core::clone::Clone::clone(&*#name)) }
                }
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(quote! {
        let __arguments = #rt::Arguments::builder()
            #(#captures)*
            .build();
    })
}

fn core(
    compilation: &Compilation,
    method: &MethodSymbol,
    description: &PipelineDescription,
    rt: &syn::Path,
) -> Result<TokenStream> {
    let core = &description.core;

    let mut rebinds = Vec::new();
    let mut locks = Vec::new();
    let mut forwarded = Vec::new();
    for argument in &core.arguments {
        let name = tokens::ident(&argument.name)?;
        match argument.mode {
            PassMode::Value if argument.borrowed => {
                rebinds.push(quote! { let #name = #name; });
                forwarded.push(quote! { #name });
            }
            PassMode::Value => {
                rebinds.push(quote! { let #name = ::core::clone::Clone::clone(&#name); });
                forwarded.push(quote! { #name });
            }
            PassMode::Ref | PassMode::Out => {
                rebinds.push(quote! { let #name = &#name; });
                locks.push(quote! { let mut #name = #name.lock().await; });
                forwarded.push(quote! { &mut **#name });
            }
        }
    }

    let turbofish = if method.generics.is_empty() {
        TokenStream::new()
    } else {
        let names = method
            .generics
            .iter()
            .map(|param| tokens::ident(&param.name))
            .collect::<Result<Vec<_>>>()?;
        quote! { ::<#(#names),*> }
    };

    let method_name = tokens::ident(&core.method)?;
    let call = match &core.receiver {
        CoreReceiver::Instance => quote! { this.#method_name #turbofish (#(#forwarded),*) },
        CoreReceiver::Type(path) => {
            let owner = tokens::ty(&tokens::qualify(&compilation.crate_name, path))?;
            quote! { <#owner>::#method_name #turbofish (#(#forwarded),*) }
        }
    };
    let call = if core.awaits {
        quote! { #call.await }
    } else {
        call
    };

    let normalized = match (&method.returns.value, &core.fallible) {
        (None, None) => quote! {
            #call;
            ::core::result::Result::Ok(#rt::Outcome::void())
        },
        (Some(_), None) => quote! { ::core::result::Result::Ok(#rt::Outcome::new(#call)) },
        (None, Some(_)) => quote! { #rt::Outcome::from_result(#call.map(|()| #rt::VoidResult)) },
        (Some(_), Some(_)) => quote! { #rt::Outcome::from_result(#call) },
    };

    let this = description
        .context
        .has_target
        .then(|| quote! { let this = this; });

    Ok(quote! {
        |_context| {
            #this
            #(#rebinds)*
            ::std::boxed::Box::pin(async move {
                #(#locks)*
                #normalized
            })
        }
    })
}

fn finish(method: &MethodSymbol, rt: &syn::Path) -> Result<TokenStream> {
    let value = method
        .returns
        .value
        .as_ref()
        .map(|value| tokens::ty(&value.name))
        .transpose()?;
    Ok(match (value, &method.returns.error) {
        (None, None) => quote! { #rt::Pipeline::finish_void(__result) },
        (Some(value), None) => quote! { #rt::Pipeline::finish::<#value>(__result) },
        (Some(value), Some(error)) => {
            let error = tokens::ty(&error.name)?;
            quote! { #rt::Pipeline::finish_fallible::<#value, #error>(__result) }
        }
        (None, Some(error)) => {
            let error = tokens::ty(&error.name)?;
            quote! { #rt::Pipeline::finish_fallible::<#rt::VoidResult, #error>(__result).map(|_| ()) }
        }
    })
}
