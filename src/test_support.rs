use crate::domain::{
    ConfigStore, Container, ContainerRuntime, ContainerSpec, ContainerState, Prompter,
};
use anyhow::{Result, bail};
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::RwLock;

#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct MockContainer {
    pub name: String,
    pub state: ContainerState,
    pub spec: Option<ContainerSpec>,
}

/// In-memory runtime recording every call as `op:name`
#[derive(Debug)]
pub struct MockRuntime {
    containers: RwLock<HashMap<String, MockContainer>>,
    commands: RwLock<Vec<String>>,
    fail_on: RwLock<Option<String>>,
}

impl MockRuntime {
    pub fn new() -> Self {
        Self {
            containers: RwLock::new(HashMap::new()),
            commands: RwLock::new(Vec::new()),
            fail_on: RwLock::new(None),
        }
    }

    pub fn add_container(&self, name: &str, state: ContainerState) {
        self.containers.write().unwrap().insert(
            name.to_string(),
            MockContainer {
                name: name.to_string(),
                state,
                spec: None,
            },
        );
    }

    pub fn set_fail_on(&self, operation: &str) {
        *self.fail_on.write().unwrap() = Some(operation.to_string());
    }

    pub fn get_commands(&self) -> Vec<String> {
        self.commands.read().unwrap().clone()
    }

    /// Number of recorded calls starting with `prefix`
    pub fn count(&self, prefix: &str) -> usize {
        self.commands
            .read()
            .unwrap()
            .iter()
            .filter(|cmd| cmd.starts_with(prefix))
            .count()
    }

    pub fn container_exists(&self, name: &str) -> bool {
        self.containers.read().unwrap().contains_key(name)
    }

    pub fn get_state(&self, name: &str) -> Option<ContainerState> {
        self.containers
            .read()
            .unwrap()
            .get(name)
            .map(|c| c.state.clone())
    }

    pub fn get_spec(&self, name: &str) -> Option<ContainerSpec> {
        self.containers
            .read()
            .unwrap()
            .get(name)
            .and_then(|c| c.spec.clone())
    }

    fn record_command(&self, cmd: &str) {
        self.commands.write().unwrap().push(cmd.to_string());
    }

    fn check_fail(&self, operation: &str) -> Result<()> {
        if let Some(ref fail_on) = *self.fail_on.read().unwrap() {
            if fail_on == operation {
                bail!("Mock failure on: {}", operation);
            }
        }
        Ok(())
    }
}

impl Default for MockRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerRuntime for MockRuntime {
    fn get_container(&self, name: &str) -> Result<Option<Container>> {
        self.record_command(&format!("get_container:{}", name));
        self.check_fail("get_container")?;

        Ok(self.container_exists(name).then(|| Container::new(name)))
    }

    fn create_container(&self, spec: &ContainerSpec) -> Result<Container> {
        self.record_command(&format!("create:{}", spec.name));
        self.check_fail("create")?;

        self.containers.write().unwrap().insert(
            spec.name.clone(),
            MockContainer {
                name: spec.name.clone(),
                state: ContainerState::Stopped,
                spec: Some(spec.clone()),
            },
        );
        Ok(Container::new(spec.name.clone()))
    }

    fn inspect_container(&self, container: &Container) -> Result<ContainerState> {
        self.record_command(&format!("inspect:{}", container.name));
        self.check_fail("inspect")?;

        match self.get_state(&container.name) {
            Some(state) => Ok(state),
            None => bail!("No such container: {}", container.name),
        }
    }

    fn start_container(&self, container: &Container) -> Result<()> {
        self.record_command(&format!("start:{}", container.name));
        self.check_fail("start")?;

        if let Some(c) = self.containers.write().unwrap().get_mut(&container.name) {
            c.state = ContainerState::Running;
        }
        Ok(())
    }

    fn remove_container(&self, name: &str) -> Result<()> {
        self.record_command(&format!("remove:{}", name));
        self.check_fail("remove")?;

        self.containers.write().unwrap().remove(name);
        Ok(())
    }
}

/// Config store keeping the document in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    document: RwLock<Option<Value>>,
    writes: RwLock<usize>,
    fail_writes: RwLock<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(document: Value) -> Self {
        let store = Self::new();
        *store.document.write().unwrap() = Some(document);
        store
    }

    pub fn document(&self) -> Option<Value> {
        self.document.read().unwrap().clone()
    }

    pub fn write_count(&self) -> usize {
        *self.writes.read().unwrap()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        *self.fail_writes.write().unwrap() = fail;
    }
}

impl ConfigStore for MemoryStore {
    fn read(&self) -> Result<Option<Value>> {
        Ok(self.document())
    }

    fn write(&self, document: &Value) -> Result<()> {
        if *self.fail_writes.read().unwrap() {
            bail!("Mock failure on: write");
        }

        *self.document.write().unwrap() = Some(document.clone());
        *self.writes.write().unwrap() += 1;
        Ok(())
    }
}

/// Prompter answering from pre-seeded queues; fails when a queue runs dry
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    inputs: RwLock<VecDeque<String>>,
    confirms: RwLock<VecDeque<bool>>,
    asked: RwLock<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_inputs(self, inputs: &[&str]) -> Self {
        self.inputs
            .write()
            .unwrap()
            .extend(inputs.iter().map(|s| s.to_string()));
        self
    }

    pub fn with_confirms(self, answers: &[bool]) -> Self {
        self.confirms.write().unwrap().extend(answers);
        self
    }

    /// Every prompt message shown so far
    pub fn asked(&self) -> Vec<String> {
        self.asked.read().unwrap().clone()
    }
}

impl Prompter for ScriptedPrompter {
    fn input(&self, message: &str, default: Option<&str>) -> Result<String> {
        self.asked.write().unwrap().push(message.to_string());

        let Some(answer) = self.inputs.write().unwrap().pop_front() else {
            bail!("Unexpected prompt: {message}");
        };

        match default {
            Some(default) if answer.is_empty() => Ok(default.to_string()),
            _ => Ok(answer),
        }
    }

    fn confirm(&self, message: &str) -> Result<bool> {
        self.asked.write().unwrap().push(message.to_string());

        match self.confirms.write().unwrap().pop_front() {
            Some(answer) => Ok(answer),
            None => bail!("Unexpected confirmation: {message}"),
        }
    }
}
