//! Aspect declarations and the handler contract.
//!
//! An aspect is a configuration struct attached (at analysis time) to a method.
//! Its behaviour lives in an [`AspectHandler`] registered in the provider under
//! the aspect's type.

mod handler;
mod outcome;

pub use handler::{AspectHandler, Next, StageFuture};
pub use outcome::{Outcome, VoidResult};

/// # Aspect
///
/// Marker trait for aspect configuration types. Usually derived:
///
/// ```rust
/// use aspectweave::Aspect;
///
/// #[derive(Aspect, Debug, Clone, Default)]
/// #[aspect(default_order = 100)]
/// pub struct Audit {
///     pub order: Option<i32>,
/// }
///
/// assert_eq!(Audit::default().order(), 100);
/// assert_eq!(Audit { order: Some(5) }.order(), 5);
/// ```
///
/// Lower orders run their "before" logic first and their "after" logic last.
pub trait Aspect: Send + Sync + 'static {
    /// Order used when the usage site does not override it.
    const DEFAULT_ORDER: i32 = 0;

    /// Effective order of this instance.
    fn order(&self) -> i32 {
        Self::DEFAULT_ORDER
    }

    /// Type identity used when reporting registry faults.
    fn aspect_name() -> &'static str
    where
        Self: Sized,
    {
        std::any::type_name::<Self>()
    }
}
