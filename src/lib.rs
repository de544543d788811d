//! # aspectweave
//!
//! Run-time half of compile-time aspect weaving.
//!
//! The generator rewrites every eligible call to a method carrying aspect
//! attributes into a call to a generated interceptor. The interceptor builds a
//! [`Pipeline`] from the handlers registered in the receiver's
//! [`ServiceProvider`] and runs the original method at its core.
//!
//! ## Quick Start
//!
//! ```rust
//! use aspectweave::prelude::*;
//! use aspectweave::extensions::Retry;
//!
//! pub struct Gateway {
//!     services: Container,
//! }
//!
//! impl Gateway {
//!     // #[retry(max_attempts = 5)]
//!     pub async fn send(&self, payload: String) -> usize {
//!         payload.len()
//!     }
//! }
//!
//! let gateway = Gateway {
//!     services: ContainerBuilder::new().with_default_handlers().build(),
//! };
//! assert!(gateway.services.contains_handler::<Retry>());
//! ```
//!
//! ## Features
//!
//! - **Handler contract**: [`AspectHandler`] with a re-runnable [`Next`]
//! - **Provider abstraction**: [`ServiceProvider`] and the DashMap-backed [`Container`]
//! - **Per-call-site cache**: [`MethodSlot`] and [`AttributeSlot`]
//! - **Stock aspects** (`extensions` feature): logging, retry, parameter validation

extern crate self as aspectweave;

pub mod aspect;
pub mod context;
pub mod di;
pub mod error;
#[cfg(feature = "extensions")]
pub mod extensions;
pub mod pipeline;

pub use aspect::{Aspect, AspectHandler, Next, Outcome, StageFuture, VoidResult};
pub use context::{
    Argument, Arguments, ArgumentsBuilder, InvocationContext, MethodHandle, ParameterInfo, PassMode,
};
pub use di::{Container, ContainerBuilder, ServiceProvider, ServiceProviderExt};
pub use error::{Result, TargetFault, WeaveError};
pub use pipeline::{AttributeSlot, ByRef, MethodSlot, Pipeline};

// Macros share the trait's name; the alias keeps in-crate derives readable.
pub use aspectweave_macro::Aspect;
pub use aspectweave_macro::Aspect as DeriveAspect;
pub use aspectweave_macro::intercepts;

#[doc(hidden)]
pub use async_trait::async_trait;

pub mod prelude {
    pub use crate::{
        Aspect, AspectHandler, Container, ContainerBuilder, InvocationContext, Next, Outcome,
        Result, ServiceProvider, ServiceProviderExt, WeaveError, async_trait,
    };
}
