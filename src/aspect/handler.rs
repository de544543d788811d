use crate::aspect::{Aspect, Outcome};
use crate::context::InvocationContext;
use crate::error::Result;
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::sync::Arc;

/// Future returned by every stage of a woven pipeline
pub type StageFuture<'a> = BoxFuture<'a, Result<Outcome>>;

type Stage<'a> = dyn Fn(InvocationContext<'a>) -> StageFuture<'a> + Send + Sync + 'a;

/// Represents the rest of the chain below a handler
///
/// Unlike a one-shot continuation, `Next` may be run any number of times:
/// not at all to short-circuit, once to proceed, repeatedly to retry.
#[derive(Clone)]
pub struct Next<'a> {
    stage: Arc<Stage<'a>>,
}

impl<'a> Next<'a> {
    /// Create a new stage
    pub fn new<F>(stage: F) -> Self
    where
        F: Fn(InvocationContext<'a>) -> StageFuture<'a> + Send + Sync + 'a,
    {
        Self {
            stage: Arc::new(stage),
        }
    }

    /// Execute the remaining chain
    pub fn run(&self, context: InvocationContext<'a>) -> StageFuture<'a> {
        (self.stage)(context)
    }
}

/// The around-advice for one aspect type
///
/// Handlers are registered in the provider keyed by the aspect type `A` and
/// resolved once per woven call.
///
/// # Example
/// ```rust
/// use aspectweave::prelude::*;
///
/// #[derive(Aspect, Debug, Clone, Default)]
/// pub struct Audit {
///     pub order: Option<i32>,
/// }
///
/// pub struct AuditHandler;
///
/// #[async_trait]
/// impl AspectHandler<Audit> for AuditHandler {
///     async fn intercept<'a>(
///         &self,
///         _attribute: &Audit,
///         context: InvocationContext<'a>,
///         next: Next<'a>,
///     ) -> Result<Outcome> {
///         tracing::info!(method = context.method_name(), "audited call");
///         next.run(context).await
///     }
/// }
/// ```
#[async_trait]
pub trait AspectHandler<A: Aspect>: Send + Sync + 'static {
    async fn intercept<'a>(
        &self,
        attribute: &A,
        context: InvocationContext<'a>,
        next: Next<'a>,
    ) -> Result<Outcome>;
}
