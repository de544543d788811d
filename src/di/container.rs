use crate::aspect::{Aspect, AspectHandler};
use crate::di::provider::{ServiceProvider, handler_key};
use dashmap::DashMap;
use std::any::{Any, TypeId};
use std::sync::Arc;

/// Thread-safe registry of services and aspect handlers.
#[derive(Clone, Default)]
pub struct Container {
    services: DashMap<TypeId, ServiceEntry>,
}

#[derive(Clone)]
struct ServiceEntry {
    instance: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl Container {
    pub fn new() -> Self {
        Self {
            services: DashMap::new(),
        }
    }

    pub fn register<T: 'static + Send + Sync>(&mut self, instance: T) -> &mut Self {
        self.services.insert(
            TypeId::of::<T>(),
            ServiceEntry {
                instance: Arc::new(instance),
                type_name: std::any::type_name::<T>(),
            },
        );
        self
    }

    /// Register the handler for aspect `A`, keyed by the aspect type
    pub fn register_handler<A, H>(&mut self, handler: H) -> &mut Self
    where
        A: Aspect,
        H: AspectHandler<A>,
    {
        let handler: Arc<dyn AspectHandler<A>> = Arc::new(handler);
        tracing::debug!(aspect = A::aspect_name(), "registering aspect handler");
        self.services.insert(
            handler_key::<A>(),
            ServiceEntry {
                instance: Arc::new(handler),
                type_name: std::any::type_name::<H>(),
            },
        );
        self
    }

    pub fn contains<T: 'static>(&self) -> bool {
        self.services.contains_key(&TypeId::of::<T>())
    }

    pub fn contains_handler<A: Aspect>(&self) -> bool {
        self.services.contains_key(&handler_key::<A>())
    }

    /// Names of every registered implementation type
    pub fn registered(&self) -> Vec<&'static str> {
        self.services.iter().map(|entry| entry.type_name).collect()
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl ServiceProvider for Container {
    fn get_service(&self, key: TypeId) -> Option<Arc<dyn Any + Send + Sync>> {
        self.services.get(&key).map(|entry| entry.instance.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aspect::{Next, Outcome};
    use crate::context::InvocationContext;
    use crate::di::ServiceProviderExt;
    use crate::error::{Result, WeaveError};
    use async_trait::async_trait;

    struct TestService {
        value: i32,
    }

    #[derive(crate::DeriveAspect)]
    struct Audit;

    #[derive(crate::DeriveAspect)]
    struct Unregistered;

    struct AuditHandler;

    #[async_trait]
    impl AspectHandler<Audit> for AuditHandler {
        async fn intercept<'a>(
            &self,
            _attribute: &Audit,
            context: InvocationContext<'a>,
            next: Next<'a>,
        ) -> Result<Outcome> {
            next.run(context).await
        }
    }

    #[test]
    fn test_register_and_resolve() {
        let mut container = Container::new();
        container.register(TestService { value: 42 });
        let service = container.resolve::<TestService>().unwrap();
        assert_eq!(service.value, 42);
    }

    #[test]
    fn test_resolve_missing_service() {
        let container = Container::new();
        assert!(matches!(
            container.resolve::<TestService>(),
            Err(WeaveError::DependencyNotFound { .. })
        ));
    }

    #[test]
    fn test_handler_is_keyed_by_aspect_type() {
        let mut container = Container::new();
        container.register_handler::<Audit, _>(AuditHandler);

        assert!(container.contains_handler::<Audit>());
        assert!(!container.contains::<Audit>());
        assert!(container.resolve_handler::<Audit>().is_ok());
    }

    #[test]
    fn test_missing_handler_is_fatal() {
        let container = Container::new();
        let err = container.resolve_handler::<Unregistered>().err().unwrap();
        assert!(matches!(err, WeaveError::HandlerNotRegistered { .. }));
    }

    #[test]
    fn test_resolve_through_arc_provider() {
        let mut container = Container::new();
        container.register(TestService { value: 7 });
        let shared: Arc<dyn ServiceProvider> = Arc::new(container);
        assert_eq!(shared.resolve::<TestService>().unwrap().value, 7);
    }
}
