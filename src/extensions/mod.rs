//! Stock aspects built on the handler contract.

mod logging;
mod retry;
mod validation;

pub use logging::{LogExecution, LogExecutionHandler, LogLevel};
pub use retry::{Retry, RetryHandler};
pub use validation::{NOT_NULL, ValidateParameters, ValidateParametersHandler};

use crate::di::Container;

/// Register a handler for every aspect in this module
pub fn register_handlers(container: &mut Container) {
    container
        .register_handler::<LogExecution, _>(LogExecutionHandler)
        .register_handler::<Retry, _>(RetryHandler)
        .register_handler::<ValidateParameters, _>(ValidateParametersHandler);
}
