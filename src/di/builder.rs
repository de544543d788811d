use crate::aspect::{Aspect, AspectHandler};
use crate::di::Container;

/// Builder for the container handed to woven services
///
/// # Example
/// ```
/// use aspectweave::ContainerBuilder;
/// use aspectweave::extensions::{Retry, RetryHandler};
///
/// let container = ContainerBuilder::new()
///     .handler::<Retry, _>(RetryHandler)
///     .build();
/// assert!(container.contains_handler::<Retry>());
/// ```
pub struct ContainerBuilder {
    container: Container,
}

impl ContainerBuilder {
    pub fn new() -> Self {
        Self {
            container: Container::new(),
        }
    }

    /// Register a service instance
    pub fn register<T: 'static + Send + Sync>(mut self, instance: T) -> Self {
        self.container.register(instance);
        self
    }

    /// Register the handler for aspect `A`
    pub fn handler<A, H>(mut self, handler: H) -> Self
    where
        A: Aspect,
        H: AspectHandler<A>,
    {
        self.container.register_handler::<A, H>(handler);
        self
    }

    /// Register the handlers shipped in [`crate::extensions`]
    #[cfg(feature = "extensions")]
    pub fn with_default_handlers(mut self) -> Self {
        crate::extensions::register_handlers(&mut self.container);
        self
    }

    pub fn build(self) -> Container {
        self.container
    }
}

impl Default for ContainerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
