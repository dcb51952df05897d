use crate::domain::{ConfigStore, Service};
use crate::error::{ServiceError, ServiceResult};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// On-disk shape of the plugin configuration
#[derive(Debug, Default, Serialize, Deserialize)]
struct ConfigDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    services: Vec<Service>,
}

/// Registered services plus the default-service pointer.
///
/// Invariants, held after every public call:
/// - no two services share a name
/// - `default`, when set, names a registered service
pub struct ServiceRegistry {
    default: Option<String>,
    services: Vec<Service>,
    store: Arc<dyn ConfigStore>,
}

impl ServiceRegistry {
    /// Empty registry backed by `store`, without reading it
    pub fn new(store: Arc<dyn ConfigStore>) -> Self {
        Self {
            default: None,
            services: Vec::new(),
            store,
        }
    }

    /// Reads the document from `store`, repairing invariant violations
    pub fn load(store: Arc<dyn ConfigStore>) -> ServiceResult<Self> {
        let document: ConfigDocument = match store.read()? {
            Some(value) => serde_json::from_value(value).context("parsing config document")?,
            None => ConfigDocument::default(),
        };

        let mut registry = Self::new(store);

        for service in document.services {
            if registry.has(&service.name) {
                warn!(
                    "Duplicate service '{}' in config, keeping the last one",
                    service.name
                );
            }
            registry.replace_or_append(service);
        }

        registry.default = match document.default {
            Some(name) if registry.has(&name) => Some(name),
            Some(name) => {
                warn!("Default service '{name}' is not registered, clearing it");
                None
            }
            None => None,
        };

        debug!(
            "Loaded {} service(s), default: {:?}",
            registry.services.len(),
            registry.default
        );

        Ok(registry)
    }

    pub fn services(&self) -> &[Service] {
        &self.services
    }

    pub fn default_name(&self) -> Option<&str> {
        self.default.as_deref()
    }

    pub fn is_default(&self, name: &str) -> bool {
        self.default.as_deref() == Some(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.services.iter().any(|service| service.name == name)
    }

    pub fn get(&self, name: &str) -> ServiceResult<&Service> {
        self.services
            .iter()
            .find(|service| service.name == name)
            .ok_or_else(|| ServiceError::NotFound(name.to_string()))
    }

    pub fn get_default(&self) -> ServiceResult<&Service> {
        let name = self.default.as_deref().ok_or(ServiceError::NoDefault)?;
        self.get(name)
    }

    /// Named service when `name` is given, the default one otherwise
    pub fn resolve(&self, name: Option<&str>) -> ServiceResult<&Service> {
        match name {
            Some(name) => self.get(name),
            None => self.get_default(),
        }
    }

    /// Checked insert: fails if the name is already registered
    pub fn add(&mut self, service: Service) -> ServiceResult<()> {
        if self.has(&service.name) {
            return Err(ServiceError::AlreadyExists(service.name));
        }

        self.upsert(service);
        Ok(())
    }

    /// Replaces the service with the same name in place, or appends it.
    /// The first service ever registered becomes the default.
    pub fn upsert(&mut self, service: Service) {
        if self.default.is_none() {
            self.default = Some(service.name.clone());
        }

        self.replace_or_append(service);
    }

    /// Removes `name`, clearing the default pointer if it pointed there.
    /// No other service is promoted to default.
    pub fn remove(&mut self, name: &str) -> ServiceResult<Service> {
        let index = self
            .services
            .iter()
            .position(|service| service.name == name)
            .ok_or_else(|| ServiceError::NotFound(name.to_string()))?;

        let removed = self.services.remove(index);

        if self.is_default(name) {
            self.default = None;
        }

        Ok(removed)
    }

    pub fn save(&self) -> ServiceResult<()> {
        let document = ConfigDocument {
            default: self.default.clone(),
            services: self.services.clone(),
        };

        let value = serde_json::to_value(&document).context("serializing config document")?;
        self.store.write(&value)?;
        Ok(())
    }

    fn replace_or_append(&mut self, service: Service) {
        match self.services.iter_mut().find(|s| s.name == service.name) {
            Some(existing) => *existing = service,
            None => self.services.push(service),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MemoryStore;
    use serde_json::json;

    fn registry_with(document: serde_json::Value) -> (ServiceRegistry, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::with_document(document));
        let registry = ServiceRegistry::load(store.clone()).unwrap();
        (registry, store)
    }

    fn assert_invariants(registry: &ServiceRegistry) {
        let mut names: Vec<&str> = registry
            .services()
            .iter()
            .map(|s| s.name.as_str())
            .collect();
        let total = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), total, "duplicate service names");

        if let Some(default) = registry.default_name() {
            assert!(registry.has(default), "default points to missing service");
        }
    }

    #[test]
    fn test_load_empty_store() {
        let store = Arc::new(MemoryStore::new());
        let registry = ServiceRegistry::load(store).unwrap();

        assert!(registry.services().is_empty());
        assert_eq!(registry.default_name(), None);
        assert!(matches!(registry.get_default(), Err(ServiceError::NoDefault)));
    }

    #[test]
    fn test_load_document_without_services() {
        let (registry, _) = registry_with(json!({}));
        assert!(registry.services().is_empty());
        assert_eq!(registry.default_name(), None);
    }

    #[test]
    fn test_load_repairs_dangling_default() {
        let (registry, _) = registry_with(json!({
            "default": "ghost",
            "services": [{"name": "logs", "image": "img"}]
        }));

        assert_eq!(registry.default_name(), None);
        assert_invariants(&registry);
    }

    #[test]
    fn test_load_collapses_duplicates() {
        let (registry, _) = registry_with(json!({
            "services": [
                {"name": "logs", "image": "old"},
                {"name": "search", "image": "img"},
                {"name": "logs", "image": "new"}
            ]
        }));

        assert_eq!(registry.services().len(), 2);
        assert_eq!(registry.services()[0].image, "new");
        assert_invariants(&registry);
    }

    #[test]
    fn test_load_rejects_malformed_document() {
        let store = Arc::new(MemoryStore::with_document(json!({"services": "nope"})));
        let result = ServiceRegistry::load(store);
        assert!(matches!(result, Err(ServiceError::Runtime(_))));
    }

    #[test]
    fn test_upsert_on_empty_sets_default() {
        let mut registry = ServiceRegistry::new(Arc::new(MemoryStore::new()));
        registry.upsert(Service::new("logs", "img"));

        assert_eq!(registry.default_name(), Some("logs"));
        assert_invariants(&registry);
    }

    #[test]
    fn test_upsert_keeps_existing_default() {
        let mut registry = ServiceRegistry::new(Arc::new(MemoryStore::new()));
        registry.upsert(Service::new("logs", "img"));
        registry.upsert(Service::new("search", "img"));

        assert_eq!(registry.default_name(), Some("logs"));
    }

    #[test]
    fn test_upsert_replaces_in_place() {
        let mut registry = ServiceRegistry::new(Arc::new(MemoryStore::new()));
        registry.upsert(Service::new("a", "img"));
        registry.upsert(Service::new("b", "img"));
        registry.upsert(Service::new("c", "img"));
        registry.upsert(Service::new("b", "img:2"));

        let names: Vec<&str> = registry.services().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(registry.get("b").unwrap().image, "img:2");
        assert_invariants(&registry);
    }

    #[test]
    fn test_add_rejects_duplicate() {
        let mut registry = ServiceRegistry::new(Arc::new(MemoryStore::new()));
        registry.add(Service::new("logs", "img")).unwrap();

        let result = registry.add(Service::new("logs", "other"));

        assert!(matches!(result, Err(ServiceError::AlreadyExists(name)) if name == "logs"));
        assert_eq!(registry.get("logs").unwrap().image, "img");
        assert_eq!(registry.services().len(), 1);
    }

    #[test]
    fn test_remove_default_does_not_promote() {
        let mut registry = ServiceRegistry::new(Arc::new(MemoryStore::new()));
        registry.upsert(Service::new("logs", "img"));
        registry.upsert(Service::new("search", "img"));

        registry.remove("logs").unwrap();

        assert_eq!(registry.default_name(), None);
        assert!(registry.has("search"));
        assert_invariants(&registry);
    }

    #[test]
    fn test_remove_non_default_keeps_default() {
        let mut registry = ServiceRegistry::new(Arc::new(MemoryStore::new()));
        registry.upsert(Service::new("logs", "img"));
        registry.upsert(Service::new("search", "img"));

        registry.remove("search").unwrap();

        assert_eq!(registry.default_name(), Some("logs"));
    }

    #[test]
    fn test_remove_missing_is_not_found() {
        let mut registry = ServiceRegistry::new(Arc::new(MemoryStore::new()));
        assert!(matches!(
            registry.remove("ghost"),
            Err(ServiceError::NotFound(name)) if name == "ghost"
        ));
    }

    #[test]
    fn test_resolve() {
        let (registry, _) = registry_with(json!({
            "default": "logs",
            "services": [
                {"name": "logs", "image": "img"},
                {"name": "search", "image": "img"}
            ]
        }));

        assert_eq!(registry.resolve(None).unwrap().name, "logs");
        assert_eq!(registry.resolve(Some("search")).unwrap().name, "search");
        assert!(matches!(
            registry.resolve(Some("ghost")),
            Err(ServiceError::NotFound(_))
        ));
    }

    #[test]
    fn test_save_writes_document() {
        let store = Arc::new(MemoryStore::new());
        let mut registry = ServiceRegistry::new(store.clone());
        registry.upsert(Service::new("logs", "img").with_port(Some(9200)));
        registry.save().unwrap();

        assert_eq!(
            store.document(),
            Some(json!({
                "default": "logs",
                "services": [{"name": "logs", "image": "img", "containerPort": 9200}]
            }))
        );
    }

    #[test]
    fn test_save_omits_empty_fields() {
        let store = Arc::new(MemoryStore::new());
        let registry = ServiceRegistry::new(store.clone());
        registry.save().unwrap();

        assert_eq!(store.document(), Some(json!({})));
    }

    #[test]
    fn test_save_propagates_store_failure() {
        let store = Arc::new(MemoryStore::new());
        store.set_fail_writes(true);
        let registry = ServiceRegistry::new(store);

        assert!(matches!(registry.save(), Err(ServiceError::Runtime(_))));
    }
}
