//! Immutable per-invocation data handed through the chain.

mod arguments;
mod method;

pub use arguments::{Argument, Arguments, ArgumentsBuilder};
pub use method::{MethodHandle, ParameterInfo, PassMode};

use crate::di::ServiceProvider;
use std::any::Any;
use std::fmt;

/// Context of one woven call
///
/// Built once before the chain runs. Cloning is cheap: the argument snapshot is
/// shared, everything else is a reference.
#[derive(Clone)]
pub struct InvocationContext<'a> {
    target: Option<&'a (dyn Any + Send + Sync)>,
    provider: &'a dyn ServiceProvider,
    method: &'static MethodHandle,
    arguments: Arguments,
}

impl<'a> InvocationContext<'a> {
    pub fn new(
        target: Option<&'a (dyn Any + Send + Sync)>,
        provider: &'a dyn ServiceProvider,
        method: &'static MethodHandle,
        arguments: Arguments,
    ) -> Self {
        Self {
            target,
            provider,
            method,
            arguments,
        }
    }

    /// Receiver of the call, absent for static contexts
    pub fn target(&self) -> Option<&'a (dyn Any + Send + Sync)> {
        self.target
    }

    /// Receiver downcast to its concrete type
    pub fn target_as<T: 'static>(&self) -> Option<&'a T> {
        self.target.and_then(|target| target.downcast_ref::<T>())
    }

    pub fn provider(&self) -> &'a dyn ServiceProvider {
        self.provider
    }

    pub fn method(&self) -> &'static MethodHandle {
        self.method
    }

    pub fn method_name(&self) -> &'static str {
        self.method.name()
    }

    /// Fully qualified name of the type declaring the method
    pub fn type_name(&self) -> &'static str {
        self.method.type_name()
    }

    pub fn arguments(&self) -> &Arguments {
        &self.arguments
    }
}

impl fmt::Debug for InvocationContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvocationContext")
            .field("has_target", &self.target.is_some())
            .field("method", &self.method)
            .field("arguments", &self.arguments)
            .finish_non_exhaustive()
    }
}
