use crate::aspect::{Aspect, AspectHandler};
use crate::error::{Result, WeaveError};
use std::any::{Any, TypeId};
use std::sync::Arc;

/// Dependency-resolution provider reachable from a woven receiver
///
/// Woven code only ever sees `&dyn ServiceProvider`; [`Container`](crate::Container)
/// is the stock implementation.
pub trait ServiceProvider: Send + Sync {
    /// Look up a registered instance by its type identity
    fn get_service(&self, key: TypeId) -> Option<Arc<dyn Any + Send + Sync>>;
}

impl<P: ServiceProvider + ?Sized> ServiceProvider for Arc<P> {
    fn get_service(&self, key: TypeId) -> Option<Arc<dyn Any + Send + Sync>> {
        (**self).get_service(key)
    }
}

/// Registry key for the handler of aspect `A`
pub(crate) fn handler_key<A: Aspect>() -> TypeId {
    TypeId::of::<dyn AspectHandler<A>>()
}

/// Typed resolution on top of [`ServiceProvider`]
pub trait ServiceProviderExt: ServiceProvider {
    fn resolve<T: Send + Sync + 'static>(&self) -> Result<Arc<T>> {
        let instance =
            self.get_service(TypeId::of::<T>())
                .ok_or_else(|| WeaveError::DependencyNotFound {
                    type_name: std::any::type_name::<T>().to_string(),
                })?;
        instance
            .downcast::<T>()
            .map_err(|_| WeaveError::DowncastFailed {
                type_name: std::any::type_name::<T>().to_string(),
            })
    }

    /// Resolve the handler registered for aspect `A`; a missing handler is fatal.
    fn resolve_handler<A: Aspect>(&self) -> Result<Arc<dyn AspectHandler<A>>> {
        let entry = self
            .get_service(handler_key::<A>())
            .ok_or_else(|| WeaveError::HandlerNotRegistered {
                aspect: A::aspect_name().to_string(),
            })?;

        // Handlers are stored as Arc<dyn Any> holding an Arc<dyn AspectHandler<A>>
        let wrapper = entry
            .downcast::<Arc<dyn AspectHandler<A>>>()
            .map_err(|_| WeaveError::DowncastFailed {
                type_name: format!("handler for {}", A::aspect_name()),
            })?;
        Ok(wrapper.as_ref().clone())
    }
}

impl<P: ServiceProvider + ?Sized> ServiceProviderExt for P {}
