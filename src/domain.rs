mod container;
pub mod service;
pub mod traits;

pub use container::{Container, ContainerSpec, ContainerState, Ulimit};
pub use service::{DEFAULT_IMAGE, Service, ServicePatch};
pub use traits::{ConfigStore, ContainerRuntime, Prompter};
