use super::{Container, ContainerSpec, ContainerState};
use anyhow::Result;
use serde_json::Value;
use std::fmt::Debug;

/// Trait for container runtime operations
pub trait ContainerRuntime: Send + Sync + Debug {
    /// Look up a container by name
    fn get_container(&self, name: &str) -> Result<Option<Container>>;

    /// Create a new (not yet started) container from a spec
    fn create_container(&self, spec: &ContainerSpec) -> Result<Container>;

    /// Report whether an existing container is running
    fn inspect_container(&self, container: &Container) -> Result<ContainerState>;

    /// Start an existing container
    fn start_container(&self, container: &Container) -> Result<()>;

    /// Remove a container, stopping it first if needed
    fn remove_container(&self, name: &str) -> Result<()>;
}

/// Backend persisting the plugin configuration document
pub trait ConfigStore: Send + Sync + Debug {
    /// Returns `None` when nothing has been written yet
    fn read(&self) -> Result<Option<Value>>;

    fn write(&self, document: &Value) -> Result<()>;
}

/// Supplies missing required fields and user confirmations
pub trait Prompter: Send + Sync + Debug {
    /// Ask for a value; an empty answer yields `default`, or is required when none is given
    fn input(&self, message: &str, default: Option<&str>) -> Result<String>;

    /// Ask a yes/no question, defaulting to "no"
    fn confirm(&self, message: &str) -> Result<bool>;
}
