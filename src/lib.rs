pub mod cli;
pub mod domain;
pub mod error;
pub mod infra;
pub mod services;

// Make test_support available for integration tests
pub mod test_support;

pub use domain::{
    ConfigStore, Container, ContainerRuntime, ContainerSpec, ContainerState, Prompter, Service,
    ServicePatch,
};
pub use error::{ServiceError, ServiceResult};
pub use infra::{DockerAdapter, JsonFileStore, TerminalPrompter};
pub use services::{ServiceManager, ServiceRegistry, ServiceStatus};
