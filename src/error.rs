use std::any::Any;
use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, WeaveError>;

#[derive(Debug, Error)]
pub enum WeaveError {
    #[error("Handler not registered for aspect: {aspect}")]
    HandlerNotRegistered { aspect: String },

    #[error("Dependency not found: {type_name}")]
    DependencyNotFound { type_name: String },

    #[error("Failed to downcast type: {type_name}")]
    DowncastFailed { type_name: String },

    #[error("Pipeline produced a result that is not a {expected}")]
    ResultType { expected: &'static str },

    #[error("Argument not captured: {name}")]
    ArgumentMissing { name: String },

    #[error("Argument '{name}' is not a {expected}")]
    ArgumentType { name: String, expected: &'static str },

    #[error("Validation failed for '{method}': {message}")]
    Validation { method: String, message: String },

    #[error("Target method failed: {0}")]
    Target(TargetFault),

    #[error("Aspect handler failed: {0}")]
    Handler(Box<dyn std::error::Error + Send + Sync>),
}

impl WeaveError {
    /// Wrap an arbitrary handler error
    pub fn handler(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Handler(err.into())
    }

    /// True when the fault originated in the woven method itself
    pub fn is_target(&self) -> bool {
        matches!(self, Self::Target(_))
    }

    /// Surface a fault that has no un-woven equivalent at the call boundary.
    pub fn raise(self) -> ! {
        panic!("{self}")
    }
}

/// The `Err` value of a fallible woven method while it travels through the chain.
///
/// It is converted back to the caller's error type, unchanged, once the
/// outermost stage returns.
pub struct TargetFault {
    error: Box<dyn Any + Send + Sync>,
    description: String,
}

impl TargetFault {
    pub fn new<E>(error: E) -> Self
    where
        E: fmt::Debug + Send + Sync + 'static,
    {
        Self {
            description: format!("{error:?}"),
            error: Box::new(error),
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn is<E: 'static>(&self) -> bool {
        self.error.is::<E>()
    }

    /// Recover the original error, handing the fault back if the type differs
    pub fn downcast<E: 'static>(self) -> std::result::Result<E, Self> {
        match self.error.downcast::<E>() {
            Ok(error) => Ok(*error),
            Err(error) => Err(Self {
                error,
                description: self.description,
            }),
        }
    }
}

impl fmt::Debug for TargetFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TargetFault").field(&self.description).finish()
    }
}

impl fmt::Display for TargetFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct OrderRejected(u32);

    #[test]
    fn test_target_fault_round_trips_original_error() {
        let fault = TargetFault::new(OrderRejected(7));
        assert!(fault.is::<OrderRejected>());
        assert_eq!(fault.description(), "OrderRejected(7)");
        assert_eq!(fault.downcast::<OrderRejected>().unwrap(), OrderRejected(7));
    }

    #[test]
    fn test_target_fault_keeps_error_on_wrong_downcast() {
        let fault = TargetFault::new(OrderRejected(1));
        let fault = fault.downcast::<String>().unwrap_err();
        assert!(fault.is::<OrderRejected>());
    }

    #[test]
    #[should_panic(expected = "Handler not registered for aspect: Retry")]
    fn test_raise_panics_with_display_text() {
        WeaveError::HandlerNotRegistered {
            aspect: "Retry".into(),
        }
        .raise();
    }
}
