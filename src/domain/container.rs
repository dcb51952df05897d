use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerState {
    Running,
    Stopped,
}

impl ContainerState {
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }
}

/// Handle to a container known to the runtime
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    pub name: String,
}

impl Container {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Resource limit; `-1` on either bound means "no limit"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ulimit {
    pub name: String,
    pub soft: i64,
    pub hard: i64,
}

impl Ulimit {
    pub fn unlimited(name: &str) -> Self {
        Self {
            name: name.to_string(),
            soft: -1,
            hard: -1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSpec {
    pub name: String,
    pub image: String,
    pub ulimits: Vec<Ulimit>,
    pub env: BTreeMap<String, String>,
    pub volumes: Vec<String>,
    pub ports: Vec<String>,
}
