use crate::access::AccessPath;
use crate::discovery::AppliedAspectSet;
use crate::model::{Location, MethodIdx};

/// A call that will be redirected to an interceptor
///
/// Derived equality is the distinctness key: identical sites collapse to one
/// rewrite.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallSite {
    pub location: Location,
    pub target: MethodIdx,
    pub aspects: AppliedAspectSet,
    pub provider_access: AccessPath,
    /// Generic arguments spelled at the call, if any
    pub generic_arguments: Vec<String>,
}

/// Arena index of a distinct call site within one generated file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallSiteId(pub usize);

impl CallSiteId {
    /// Plain identifier, also for raw method names such as `r#type`
    pub fn interceptor_name(self, method: &str) -> String {
        let method = method.strip_prefix("r#").unwrap_or(method);
        format!("intercept_{method}_{}", self.0)
    }
}
