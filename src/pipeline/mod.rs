//! Composition and execution of a woven call.
//!
//! Emitted interceptors build one [`Pipeline`] per invocation: the core stage
//! first, then one wrapper per aspect from the highest Order to the lowest, so
//! the lowest Order ends up outermost.

mod by_ref;
mod cache;

pub use by_ref::ByRef;
pub use cache::{AttributeSlot, MethodSlot};

use crate::aspect::{Aspect, Next, Outcome, StageFuture};
use crate::context::InvocationContext;
use crate::di::{ServiceProvider, ServiceProviderExt};
use crate::error::{Result, WeaveError};

/// Nested chain of stages for one call
pub struct Pipeline<'a> {
    head: Next<'a>,
    depth: usize,
}

impl<'a> Pipeline<'a> {
    /// Start from the core stage that invokes the original method
    pub fn new<F>(core: F) -> Self
    where
        F: Fn(InvocationContext<'a>) -> StageFuture<'a> + Send + Sync + 'a,
    {
        Self {
            head: Next::new(core),
            depth: 0,
        }
    }

    /// Layer the handler for `A` outside the current chain
    ///
    /// The handler is resolved here, before anything runs; a missing
    /// registration fails the whole call.
    pub fn wrap<A: Aspect>(self, provider: &dyn ServiceProvider, attribute: &'a A) -> Result<Self> {
        let handler = provider.resolve_handler::<A>()?;
        tracing::trace!(
            aspect = A::aspect_name(),
            order = attribute.order(),
            depth = self.depth + 1,
            "wrapping stage"
        );

        let inner = self.head;
        let head = Next::new(move |context| {
            let handler = handler.clone();
            let next = inner.clone();
            Box::pin(async move { handler.intercept(attribute, context, next).await })
        });

        Ok(Self {
            head,
            depth: self.depth + 1,
        })
    }

    /// Number of wrapper stages around the core
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub async fn run(&self, context: InvocationContext<'a>) -> Result<Outcome> {
        tracing::trace!(method = context.method_name(), stages = self.depth, "running pipeline");
        self.head.run(context).await
    }

    /// Drive the chain to completion on the calling thread for a synchronous target.
    pub fn run_blocking(&self, context: InvocationContext<'a>) -> Result<Outcome> {
        futures::executor::block_on(self.run(context))
    }

    /// Caller-visible value of an infallible method
    pub fn finish<T: 'static>(result: Result<Outcome>) -> T {
        match result.and_then(Outcome::downcast::<T>) {
            Ok(value) => value,
            Err(err) => err.raise(),
        }
    }

    pub fn finish_void(result: Result<Outcome>) {
        if let Err(err) = result {
            err.raise()
        }
    }

    /// Caller-visible value of a `Result`-returning method; its own `Err`
    /// comes back unchanged.
    pub fn finish_fallible<T: 'static, E: 'static>(result: Result<Outcome>) -> std::result::Result<T, E> {
        match result {
            Ok(outcome) => match outcome.downcast::<T>() {
                Ok(value) => Ok(value),
                Err(err) => err.raise(),
            },
            Err(WeaveError::Target(fault)) => match fault.downcast::<E>() {
                Ok(err) => Err(err),
                Err(fault) => WeaveError::Target(fault).raise(),
            },
            Err(err) => err.raise(),
        }
    }
}
