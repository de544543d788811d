use crate::error::{Result, TargetFault, WeaveError};
use std::any::Any;
use std::fmt;

/// Placeholder result for methods without a meaningful value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct VoidResult;

/// Type-erased logical result flowing back up the chain
pub struct Outcome {
    value: Box<dyn Any + Send>,
    type_name: &'static str,
}

impl Outcome {
    pub fn new<T: Send + 'static>(value: T) -> Self {
        Self {
            value: Box::new(value),
            type_name: std::any::type_name::<T>(),
        }
    }

    pub fn void() -> Self {
        Self::new(VoidResult)
    }

    /// Normalize a fallible method's return value, carrying `Err` as a target fault.
    pub fn from_result<T, E>(result: std::result::Result<T, E>) -> Result<Self>
    where
        T: Send + 'static,
        E: fmt::Debug + Send + Sync + 'static,
    {
        result
            .map(Self::new)
            .map_err(|err| WeaveError::Target(TargetFault::new(err)))
    }

    pub fn is_void(&self) -> bool {
        self.value.is::<VoidResult>()
    }

    pub fn is<T: 'static>(&self) -> bool {
        self.value.is::<T>()
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    pub fn downcast<T: 'static>(self) -> Result<T> {
        self.value
            .downcast::<T>()
            .map(|value| *value)
            .map_err(|_| WeaveError::ResultType {
                expected: std::any::type_name::<T>(),
            })
    }
}

impl fmt::Debug for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Outcome")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_void_outcome() {
        let outcome = Outcome::void();
        assert!(outcome.is_void());
        assert_eq!(outcome.downcast::<VoidResult>().unwrap(), VoidResult);
    }

    #[test]
    fn test_downcast_to_wrong_type_is_result_type_fault() {
        let err = Outcome::new(5_u64).downcast::<String>().unwrap_err();
        assert!(matches!(err, WeaveError::ResultType { .. }));
    }

    #[test]
    fn test_from_result_carries_err_as_target_fault() {
        let ok: std::result::Result<u8, String> = Ok(4);
        assert_eq!(Outcome::from_result(ok).unwrap().downcast::<u8>().unwrap(), 4);

        let failed: std::result::Result<u8, String> = Err("boom".into());
        let err = Outcome::from_result(failed).unwrap_err();
        assert!(err.is_target());
    }
}
