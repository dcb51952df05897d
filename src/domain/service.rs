use super::container::{ContainerSpec, Ulimit};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Image used when a service is created without an explicit one
pub const DEFAULT_IMAGE: &str = "docker.elastic.co/elasticsearch/elasticsearch:7.5.2";

/// Port Elasticsearch listens on inside the container
pub const INTERNAL_PORT: u16 = 9200;

/// Elasticsearch data directory inside the container
pub const DATA_DIR: &str = "/usr/share/elasticsearch/data";

/// Declared definition of one search-service instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub name: String,
    pub image: String,
    #[serde(
        rename = "containerPort",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub container_port: Option<u16>,
}

/// Partial update applied by `upgrade`; `None` means "leave untouched"
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServicePatch {
    pub image: Option<String>,
    pub container_port: Option<u16>,
}

impl ServicePatch {
    pub fn is_empty(&self) -> bool {
        self.image.is_none() && self.container_port.is_none()
    }
}

impl Service {
    pub fn new(name: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image: image.into(),
            container_port: None,
        }
    }

    pub fn with_port(mut self, port: Option<u16>) -> Self {
        self.container_port = port;
        self
    }

    pub fn container_name(&self) -> String {
        format!("elastic-{}.workspace", self.name)
    }

    pub fn volume_name(&self) -> String {
        format!("wocker-elastic-{}", self.name)
    }

    /// Published port mappings; empty when no host port is configured
    pub fn container_ports(&self) -> Vec<String> {
        self.container_port
            .map(|port| vec![format!("{port}:{INTERNAL_PORT}")])
            .unwrap_or_default()
    }

    /// Applies only the fields present in `patch`
    pub fn apply(&mut self, patch: ServicePatch) {
        if let Some(image) = patch.image {
            self.image = image;
        }
        if let Some(port) = patch.container_port {
            self.container_port = Some(port);
        }
    }

    /// Single-node cluster with memory locking disabled and a bounded heap
    pub fn to_spec(&self) -> ContainerSpec {
        let env = BTreeMap::from([
            ("node.name".to_string(), "elasticsearch".to_string()),
            ("cluster.name".to_string(), "elasticsearch".to_string()),
            (
                "cluster.initial_master_nodes".to_string(),
                "elasticsearch".to_string(),
            ),
            ("bootstrap.memory_lock".to_string(), "false".to_string()),
            ("ES_JAVA_OPTS".to_string(), "-Xms512m -Xmx512m".to_string()),
        ]);

        ContainerSpec {
            name: self.container_name(),
            image: self.image.clone(),
            ulimits: vec![Ulimit::unlimited("memlock")],
            env,
            volumes: vec![format!("{}:{DATA_DIR}", self.volume_name())],
            ports: self.container_ports(),
        }
    }
}

/// Checks that `name` is usable inside container and volume names
pub fn validate_name(name: &str) -> Result<(), &'static str> {
    let Some(first) = name.chars().next() else {
        return Err("name must not be empty");
    };

    if !first.is_ascii_alphanumeric() {
        return Err("name must start with a letter or digit");
    }

    if name
        .chars()
        .any(|c| !c.is_ascii_alphanumeric() && c != '_' && c != '.' && c != '-')
    {
        return Err("name may only contain letters, digits, '_', '.' and '-'");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_names() {
        let svc = Service::new("logs", DEFAULT_IMAGE);
        assert_eq!(svc.container_name(), "elastic-logs.workspace");
        assert_eq!(svc.volume_name(), "wocker-elastic-logs");
    }

    #[test]
    fn test_container_ports_empty_without_port() {
        let svc = Service::new("logs", "img");
        assert!(svc.container_ports().is_empty());
    }

    #[test]
    fn test_container_ports_maps_to_internal_port() {
        let svc = Service::new("logs", "img").with_port(Some(9300));
        assert_eq!(svc.container_ports(), vec!["9300:9200".to_string()]);
    }

    #[test]
    fn test_apply_image_only_keeps_port() {
        let mut svc = Service::new("logs", "img").with_port(Some(9200));
        svc.apply(ServicePatch {
            image: Some("img:2".into()),
            container_port: None,
        });
        assert_eq!(svc.image, "img:2");
        assert_eq!(svc.container_port, Some(9200));
    }

    #[test]
    fn test_apply_port_zero_is_present() {
        let mut svc = Service::new("logs", "img").with_port(Some(9200));
        svc.apply(ServicePatch {
            image: None,
            container_port: Some(0),
        });
        assert_eq!(svc.container_port, Some(0));
        assert_eq!(svc.image, "img");
    }

    #[test]
    fn test_to_spec() {
        let svc = Service::new("logs", "img").with_port(Some(9201));
        let spec = svc.to_spec();

        assert_eq!(spec.name, "elastic-logs.workspace");
        assert_eq!(spec.image, "img");
        assert_eq!(spec.ports, vec!["9201:9200".to_string()]);
        assert_eq!(
            spec.volumes,
            vec!["wocker-elastic-logs:/usr/share/elasticsearch/data".to_string()]
        );
        assert_eq!(spec.env["ES_JAVA_OPTS"], "-Xms512m -Xmx512m");
        assert_eq!(spec.env["bootstrap.memory_lock"], "false");
        assert_eq!(spec.ulimits, vec![Ulimit::unlimited("memlock")]);
    }

    #[test]
    fn test_serde_uses_container_port_key() {
        let svc: Service =
            serde_json::from_str(r#"{"name":"logs","image":"img","containerPort":9200}"#).unwrap();
        assert_eq!(svc.container_port, Some(9200));

        let without_port = serde_json::to_string(&Service::new("a", "b")).unwrap();
        assert_eq!(without_port, r#"{"name":"a","image":"b"}"#);
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("logs").is_ok());
        assert!(validate_name("logs_v2.eu-1").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("-logs").is_err());
        assert!(validate_name("lo gs").is_err());
        assert!(validate_name("logs/1").is_err());
    }
}
