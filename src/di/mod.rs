mod builder;
mod container;
mod provider;

pub use builder::ContainerBuilder;
pub use container::Container;
pub use provider::{ServiceProvider, ServiceProviderExt};
