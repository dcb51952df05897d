use crate::domain::{ContainerRuntime, ContainerState, Prompter, ServicePatch};
use crate::infra::{DockerAdapter, JsonFileStore, TerminalPrompter};
use crate::services::{ServiceManager, ServiceRegistry, ServiceStatus};
use anyhow::Result;
use clap::{Args, Subcommand};
use std::path::Path;
use std::sync::Arc;

#[derive(Args, Debug)]
pub struct ElasticCommand {
    #[command(subcommand)]
    pub action: ElasticAction,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum ElasticAction {
    /// Register a new Elasticsearch service
    Create {
        name: Option<String>,
        /// Container image
        #[arg(long)]
        image: Option<String>,
        /// Host port published to 9200
        #[arg(short = 'p', long)]
        container_port: Option<u16>,
    },
    /// Remove a service and its container
    Destroy {
        name: Option<String>,
        /// Allow destroying the default service
        #[arg(short, long)]
        force: bool,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Start Elasticsearch service
    Start {
        name: Option<String>,
        /// Recreate the container from the current configuration
        #[arg(short, long)]
        restart: bool,
    },
    /// Stop Elasticsearch service
    Stop { name: Option<String> },
    /// Change the image or port of a service
    Upgrade {
        name: Option<String>,
        /// Container image
        #[arg(short, long)]
        image: Option<String>,
        /// Host port published to 9200
        #[arg(short = 'p', long)]
        container_port: Option<u16>,
    },
    /// Show registered services and their containers
    Status,
}

/// Builds a manager over the config in `config_dir` for a single invocation
pub fn build_manager(
    config_dir: &Path,
    runtime: Arc<dyn ContainerRuntime>,
    prompter: Arc<dyn Prompter>,
) -> Result<ServiceManager> {
    let store = Arc::new(JsonFileStore::new(config_dir));
    let registry = ServiceRegistry::load(store)?;
    Ok(ServiceManager::new(registry, runtime, prompter))
}

pub fn run(cmd: ElasticCommand, config_dir: &Path, runtime_bin: &str) -> Result<()> {
    let runtime = Arc::new(DockerAdapter::new(runtime_bin));
    let prompter = Arc::new(TerminalPrompter::new());
    let mut manager = build_manager(config_dir, runtime, prompter)?;

    execute(&mut manager, cmd.action)
}

pub fn execute(manager: &mut ServiceManager, action: ElasticAction) -> Result<()> {
    match action {
        ElasticAction::Create {
            name,
            image,
            container_port,
        } => manager.create(name, image, container_port)?,
        ElasticAction::Destroy { name, force, yes } => {
            manager.destroy(name.as_deref(), yes, force)?
        }
        ElasticAction::Start { name, restart } => manager.start(name.as_deref(), restart)?,
        ElasticAction::Stop { name } => manager.stop(name.as_deref())?,
        ElasticAction::Upgrade {
            name,
            image,
            container_port,
        } => manager.upgrade(
            name.as_deref(),
            ServicePatch {
                image,
                container_port,
            },
        )?,
        ElasticAction::Status => print_status(&manager.status()?),
    }

    Ok(())
}

fn print_status(statuses: &[ServiceStatus]) {
    if statuses.is_empty() {
        println!("No services configured. Run 'wocker-elastic create' first.");
        return;
    }

    for status in statuses {
        let marker = if status.is_default { "*" } else { " " };
        let port = status
            .service
            .container_port
            .map(|port| port.to_string())
            .unwrap_or_else(|| "-".to_string());
        let state = match status.state {
            Some(ContainerState::Running) => "running",
            Some(ContainerState::Stopped) => "stopped",
            None => "absent",
        };

        println!(
            "{marker} {:<16} | {:<8} | {:<6} | {}",
            status.service.name, state, port, status.service.image
        );
    }
}
