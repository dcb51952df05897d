mod manager;
mod registry;

pub use manager::{ServiceManager, ServiceStatus};
pub use registry::ServiceRegistry;
