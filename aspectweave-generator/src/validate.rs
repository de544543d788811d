//! Call-site legality checks and whole-unit attribute checks.

use crate::access::{AccessConfig, find_provider_access};
use crate::call_site::CallSite;
use crate::config::{ConfigBound, WeaverConfig};
use crate::diagnostics::{Classification, Diagnostic};
use crate::discovery::{DiscoveryCache, OrderConvention, find_divergent_orders};
use crate::error::Result;
use crate::model::{AttributeUsage, Compilation, Invocation, Receiver, TypeIdx};

/// Decision for one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Rewrite(CallSite),
    /// This call stays as written; other calls of the method are unaffected
    Unmodified(Diagnostic),
    /// The method cannot be woven at all
    Skip(Diagnostic),
    /// No aspects apply
    NotWoven,
}

impl Verdict {
    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            Self::Unmodified(diagnostic) | Self::Skip(diagnostic) => Some(diagnostic),
            Self::Rewrite(_) | Self::NotWoven => None,
        }
    }
}

/// Verdict plus non-blocking notes about the call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assessment {
    pub verdict: Verdict,
    pub notes: Vec<Diagnostic>,
}

pub struct Validator<'c> {
    compilation: &'c Compilation,
    config: &'c WeaverConfig,
    marker_base: TypeIdx,
    convention: OrderConvention,
    access: AccessConfig,
    cache: DiscoveryCache,
}

impl<'c> Validator<'c> {
    pub fn new(compilation: &'c Compilation, config: &'c WeaverConfig, marker_base: TypeIdx) -> Self {
        Self {
            compilation,
            config,
            marker_base,
            convention: OrderConvention {
                argument: config.order_argument.clone(),
                constant: config.default_order_constant.clone(),
            },
            access: AccessConfig::from(config),
            cache: DiscoveryCache::new(),
        }
    }

    pub fn cache(&self) -> &DiscoveryCache {
        &self.cache
    }

    pub fn validate(&self, invocation: &Invocation) -> Result<Assessment> {
        let compilation = self.compilation;
        let aspects = self.cache.get_or_discover(
            compilation,
            invocation.method,
            self.marker_base,
            &self.convention,
        )?;
        if aspects.is_empty() {
            return Ok(Assessment {
                verdict: Verdict::NotWoven,
                notes: Vec::new(),
            });
        }

        let method = compilation.method(invocation.method)?;
        let subject = compilation.method_path(invocation.method);
        let location = invocation.location.clone();
        let notes = self.divergent_notes(invocation)?;
        let skip = |classification, subject: String| Assessment {
            verdict: Verdict::Skip(Diagnostic::new(classification, location.clone(), subject)),
            notes: notes.clone(),
        };

        if method.is_static || invocation.receiver == Receiver::Static {
            return Ok(skip(Classification::StaticUnsupported, subject));
        }

        if let Some(parameter) = method.parameters.iter().find(|parameter| parameter.ty.stack_only) {
            return Ok(skip(
                Classification::UnsupportedParameter,
                format!("{subject}({})", parameter.name),
            ));
        }

        let is_provider = |path: &str| self.config.is_provider_type(path);
        let Some(provider_access) =
            find_provider_access(compilation, invocation.method, &is_provider, &self.access)?
        else {
            return Ok(skip(Classification::ProviderNotFound, subject));
        };

        if invocation.receiver == Receiver::BaseDispatch {
            return Ok(Assessment {
                verdict: Verdict::Unmodified(Diagnostic::new(
                    Classification::Uninterceptable,
                    location.clone(),
                    subject,
                )),
                notes,
            });
        }

        Ok(Assessment {
            verdict: Verdict::Rewrite(CallSite {
                location: location.clone(),
                target: invocation.method,
                aspects,
                provider_access,
                generic_arguments: invocation.generic_arguments.clone(),
            }),
            notes,
        })
    }

    fn divergent_notes(&self, invocation: &Invocation) -> Result<Vec<Diagnostic>> {
        let divergent = find_divergent_orders(
            self.compilation,
            invocation.method,
            self.marker_base,
            &self.convention,
        )?;
        Ok(divergent
            .into_iter()
            .map(|declaration| {
                let attribute = self
                    .compilation
                    .ty(declaration.attribute_type)
                    .map(|ty| ty.path.clone())
                    .unwrap_or_default();
                Diagnostic::new(
                    Classification::DivergentOrder,
                    invocation.location.clone(),
                    format!(
                        "{attribute}: order {} kept, {} at {} ignored",
                        declaration.kept_order, declaration.ignored_order, declaration.location
                    ),
                )
            })
            .collect())
    }
}

/// Marker attributes attached to types or members instead of methods
pub fn check_marker_targets(compilation: &Compilation, marker_base: TypeIdx) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let mut check = |usages: &[AttributeUsage], subject: &str| {
        for usage in usages {
            if compilation.derives_from(usage.attribute, marker_base) {
                diagnostics.push(Diagnostic::new(
                    Classification::InvalidAspectTarget,
                    usage.location.clone(),
                    subject,
                ));
            }
        }
    };

    for ty in &compilation.types {
        check(&ty.attributes, &ty.path);
        for member in &ty.members {
            check(&member.attributes, &format!("{}::{}", ty.path, member.name));
        }
    }
    diagnostics
}

/// Literal configuration values outside their declared bounds
pub fn check_configuration(compilation: &Compilation, bounds: &[ConfigBound]) -> Vec<Diagnostic> {
    let usages = compilation
        .methods
        .iter()
        .flat_map(|method| method.attributes.iter())
        .chain(compilation.types.iter().flat_map(|ty| {
            ty.attributes
                .iter()
                .chain(ty.members.iter().flat_map(|member| member.attributes.iter()))
        }));

    let mut diagnostics = Vec::new();
    for usage in usages {
        let Ok(attribute) = compilation.ty(usage.attribute) else {
            continue;
        };
        let attribute_path = attribute.path.trim_start_matches("::");
        for bound in bounds {
            if bound.attribute.trim_start_matches("::") != attribute_path {
                continue;
            }
            let Some(value) = usage.named(&bound.argument).and_then(|value| value.as_int()) else {
                continue;
            };
            if !bound.contains(value) {
                diagnostics.push(Diagnostic::new(
                    Classification::InvalidConfiguration,
                    usage.location.clone(),
                    format!("{attribute_path}::{} = {value}", bound.argument),
                ));
            }
        }
    }
    diagnostics
}
