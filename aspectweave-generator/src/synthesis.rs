//! Shape of the woven chain for one call site.

use crate::call_site::CallSite;
use crate::error::Result;
use crate::model::{Compilation, PassMode, TypeIdx, TypeRef};

/// Value carried through the chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogicalResultType {
    Void,
    Value(TypeRef),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreReceiver {
    Instance,
    Type(String),
}

/// How one argument reaches the original method on every run of the core
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardedArgument {
    pub name: String,
    pub ty: TypeRef,
    pub mode: PassMode,
    /// A shared reference (`&T`) forwarded as is
    pub borrowed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreStage {
    pub receiver: CoreReceiver,
    pub method: String,
    pub arguments: Vec<ForwardedArgument>,
    /// The original method is async and must be awaited
    pub awaits: bool,
    /// Error type of a `Result`-returning method
    pub fallible: Option<TypeRef>,
}

/// One aspect layered around the chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrapperStage {
    /// Position in the call site's ascending aspect set
    pub aspect_index: usize,
    pub attribute_type: TypeIdx,
    pub attribute_path: String,
    pub order: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capture {
    Value,
    /// `Option<T>`, recorded with its presence
    Optional,
    /// Clone of the referent of a shared or exclusive reference
    Referent,
    /// Referent is an `Option<T>`, recorded with its presence
    OptionalReferent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedArgument {
    pub name: String,
    pub capture: Capture,
}

/// Fields of the invocation context the emitter must populate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextShape {
    pub has_target: bool,
    pub type_name: String,
    pub method_name: String,
    pub is_async: bool,
    pub captured: Vec<CapturedArgument>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineDescription {
    pub result: LogicalResultType,
    pub core: CoreStage,
    /// In wrap order: highest Order first, so the last entry is outermost
    pub wrappers: Vec<WrapperStage>,
    pub context: ContextShape,
    /// Synchronous target: the chain is driven to completion before returning
    pub blocking: bool,
}

pub fn synthesize(compilation: &Compilation, site: &CallSite) -> Result<PipelineDescription> {
    let method = compilation.method(site.target)?;
    let owner = compilation.ty(method.owner)?;

    let result = match &method.returns.value {
        Some(ty) => LogicalResultType::Value(ty.clone()),
        None => LogicalResultType::Void,
    };

    let arguments = method
        .parameters
        .iter()
        .map(|parameter| ForwardedArgument {
            name: parameter.name.clone(),
            ty: parameter.ty.clone(),
            mode: parameter.mode,
            borrowed: parameter.mode == PassMode::Value && is_shared_reference(&parameter.ty),
        })
        .collect::<Vec<_>>();

    let captured = arguments
        .iter()
        .filter_map(|argument| {
            let capture = match argument.mode {
                PassMode::Out => return None,
                PassMode::Ref => referent_capture(&argument.ty),
                PassMode::Value if argument.borrowed => referent_capture(&argument.ty),
                PassMode::Value if argument.ty.is_option() => Capture::Optional,
                PassMode::Value => Capture::Value,
            };
            Some(CapturedArgument {
                name: argument.name.clone(),
                capture,
            })
        })
        .collect();

    let mut wrappers = site
        .aspects
        .iter()
        .enumerate()
        .map(|(aspect_index, aspect)| {
            Ok(WrapperStage {
                aspect_index,
                attribute_type: aspect.attribute_type,
                attribute_path: compilation.ty(aspect.attribute_type)?.path.clone(),
                order: aspect.order,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    // Highest Order wrapped first leaves the lowest outermost
    wrappers.reverse();

    let core = CoreStage {
        receiver: if method.is_static {
            CoreReceiver::Type(owner.path.clone())
        } else {
            CoreReceiver::Instance
        },
        method: method.name.clone(),
        arguments,
        awaits: method.returns.is_async(),
        fallible: method.returns.error.clone(),
    };

    Ok(PipelineDescription {
        result,
        context: ContextShape {
            has_target: !method.is_static,
            type_name: owner.path.clone(),
            method_name: method.name.clone(),
            is_async: method.returns.is_async(),
            captured,
        },
        core,
        wrappers,
        blocking: !method.returns.is_async(),
    })
}

fn referent_capture(ty: &TypeRef) -> Capture {
    if referent(ty).is_option() {
        Capture::OptionalReferent
    } else {
        Capture::Referent
    }
}

/// Type behind a leading `&`, `&'a` or `&mut`
fn referent(ty: &TypeRef) -> TypeRef {
    let name = ty.name.trim();
    let Some(rest) = name.strip_prefix('&') else {
        return ty.clone();
    };
    let mut rest = rest.trim_start();
    if let Some(lifetime) = rest.strip_prefix('\'') {
        rest = lifetime
            .split_once(char::is_whitespace)
            .map_or("", |(_, tail)| tail)
            .trim_start();
    }
    let rest = rest.strip_prefix("mut ").unwrap_or(rest).trim_start();
    TypeRef::new(rest)
}

fn is_shared_reference(ty: &TypeRef) -> bool {
    let name = ty.name.trim();
    name.starts_with('&') && !name.trim_start_matches('&').trim_start().starts_with("mut ")
}
