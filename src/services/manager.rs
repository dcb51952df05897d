use crate::domain::service::validate_name;
use crate::domain::{
    Container, ContainerRuntime, ContainerState, DEFAULT_IMAGE, Prompter, Service, ServicePatch,
};
use crate::error::{ServiceError, ServiceResult};
use crate::services::ServiceRegistry;
use std::sync::Arc;
use tracing::{debug, info};

/// Container state of a registered service, as reported by `status`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceStatus {
    pub service: Service,
    pub is_default: bool,
    /// `None` when no container exists
    pub state: Option<ContainerState>,
}

/// Drives service lifecycle operations against the registry and the runtime.
///
/// Every mutating operation persists the registry as its last step, so a
/// failure anywhere earlier leaves the stored configuration untouched.
pub struct ServiceManager {
    registry: ServiceRegistry,
    runtime: Arc<dyn ContainerRuntime>,
    prompter: Arc<dyn Prompter>,
}

impl ServiceManager {
    pub fn new(
        registry: ServiceRegistry,
        runtime: Arc<dyn ContainerRuntime>,
        prompter: Arc<dyn Prompter>,
    ) -> Self {
        Self {
            registry,
            runtime,
            prompter,
        }
    }

    pub fn registry(&self) -> &ServiceRegistry {
        &self.registry
    }

    /// Registers a new service. Does not touch the runtime.
    pub fn create(
        &mut self,
        name: Option<String>,
        image: Option<String>,
        container_port: Option<u16>,
    ) -> ServiceResult<()> {
        let name = match name {
            Some(name) => name,
            None => self.prompter.input("Service name", None)?,
        };
        let name = name.trim().to_string();

        validate_name(&name).map_err(|reason| ServiceError::InvalidName {
            name: name.clone(),
            reason,
        })?;

        if self.registry.has(&name) {
            return Err(ServiceError::AlreadyExists(name));
        }

        let image = match image {
            Some(image) => image,
            None => self.prompter.input("Image", Some(DEFAULT_IMAGE))?,
        };
        let image = checked_image(image)?;

        self.registry
            .add(Service::new(name.clone(), image).with_port(container_port))?;
        self.registry.save()?;

        info!("Service {name} created");
        Ok(())
    }

    /// Applies `patch` to the target service. A running container keeps the
    /// old configuration until `start` is called with `restart`.
    pub fn upgrade(&mut self, name: Option<&str>, patch: ServicePatch) -> ServiceResult<()> {
        let mut service = self.registry.resolve(name)?.clone();

        if patch.is_empty() {
            info!("Nothing to change for {}", service.name);
            return Ok(());
        }

        let patch = ServicePatch {
            image: patch.image.map(checked_image).transpose()?,
            container_port: patch.container_port,
        };

        service.apply(patch);
        let service_name = service.name.clone();

        self.registry.upsert(service);
        self.registry.save()?;

        info!("Service {service_name} updated");
        Ok(())
    }

    /// Tears down the container and unregisters the service. Its volume is kept.
    pub fn destroy(&mut self, name: Option<&str>, yes: bool, force: bool) -> ServiceResult<()> {
        let service_name = self.registry.resolve(name)?.name.clone();

        if self.registry.is_default(&service_name) && !force {
            return Err(ServiceError::ProtectedDefault(service_name));
        }

        if !yes {
            let message = format!(
                "Are you sure you want to delete the \"{service_name}\" service? \
                 This action cannot be undone and all data will be lost."
            );

            if !self.prompter.confirm(&message)? {
                return Err(ServiceError::Aborted);
            }
        }

        self.stop(Some(service_name.as_str()))?;

        self.registry.remove(&service_name)?;
        self.registry.save()?;

        info!("Service {service_name} destroyed");
        Ok(())
    }

    /// Reconciles the runtime so the target's container exists and runs.
    /// Repeated calls without `restart` are no-ops after the first.
    pub fn start(&self, name: Option<&str>, restart: bool) -> ServiceResult<()> {
        let service = self.registry.resolve(name)?;
        let container_name = service.container_name();

        let mut container = self.runtime.get_container(&container_name)?;

        if container.is_some() && restart {
            info!("Removing {container_name} for restart...");
            self.runtime.remove_container(&container_name)?;
            container = None;
        }

        let container = match container {
            Some(container) => {
                debug!("Container {container_name} already exists");
                container
            }
            None => self.create_container(service)?,
        };

        if self.runtime.inspect_container(&container)?.is_running() {
            debug!("Container {} already running", container.name);
        } else {
            info!("Starting {}...", container.name);
            self.runtime.start_container(&container)?;
        }

        Ok(())
    }

    /// Removes the target's container. Data survives in the named volume.
    pub fn stop(&self, name: Option<&str>) -> ServiceResult<()> {
        let service = self.registry.resolve(name)?;
        let container_name = service.container_name();

        info!("Stopping {container_name}...");
        self.runtime.remove_container(&container_name)?;
        Ok(())
    }

    /// Container state of every registered service, in registry order
    pub fn status(&self) -> ServiceResult<Vec<ServiceStatus>> {
        self.registry
            .services()
            .iter()
            .map(|service| -> ServiceResult<ServiceStatus> {
                let state = match self.runtime.get_container(&service.container_name())? {
                    Some(container) => Some(self.runtime.inspect_container(&container)?),
                    None => None,
                };

                Ok(ServiceStatus {
                    service: service.clone(),
                    is_default: self.registry.is_default(&service.name),
                    state,
                })
            })
            .collect()
    }

    fn create_container(&self, service: &Service) -> ServiceResult<Container> {
        let spec = service.to_spec();
        info!("Creating {} from {}...", spec.name, spec.image);
        Ok(self.runtime.create_container(&spec)?)
    }
}

fn checked_image(image: String) -> ServiceResult<String> {
    let image = image.trim();
    if image.is_empty() {
        return Err(ServiceError::InvalidImage);
    }
    Ok(image.to_string())
}
