use crate::domain::{Container, ContainerRuntime, ContainerSpec, ContainerState};
use anyhow::{Context, Result, bail};
use std::ffi::OsStr;
use std::process::{Command, Output};
use tracing::debug;

pub const DEFAULT_RUNTIME_BIN: &str = "docker";

/// Container runtime driven through a Docker-compatible CLI (`docker`, `podman`)
#[derive(Debug, Clone)]
pub struct DockerAdapter {
    binary: String,
}

impl DockerAdapter {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Runs the CLI and fails with its stderr on a non-zero exit
    fn output<I, S>(&self, args: I, context: &str) -> Result<Output>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let output = Command::new(&self.binary)
            .args(args)
            .output()
            .with_context(|| context.to_string())?;

        if !output.status.success() {
            bail!(
                "{} returned status {:?} ({context}): {}",
                self.binary,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        Ok(output)
    }
}

impl ContainerRuntime for DockerAdapter {
    /// `ps` exits 0 with no rows for an absent container, so any failure
    /// here means the runtime itself could not be reached.
    fn get_container(&self, name: &str) -> Result<Option<Container>> {
        let filter = format!("name={}", name_filter(name));
        let output = self.output(
            ["ps", "-a", "--filter", filter.as_str(), "--format", "{{.Names}}"],
            &format!("checking container {name}"),
        )?;

        let found = String::from_utf8_lossy(&output.stdout)
            .lines()
            .any(|line| line.trim() == name);

        Ok(found.then(|| Container::new(name)))
    }

    fn create_container(&self, spec: &ContainerSpec) -> Result<Container> {
        let args = create_args(spec);
        debug!("{} {}", self.binary, args.join(" "));

        self.output(&args, &format!("creating container {}", spec.name))?;
        Ok(Container::new(spec.name.clone()))
    }

    fn inspect_container(&self, container: &Container) -> Result<ContainerState> {
        let name = container.name.as_str();
        let output = self.output(
            ["container", "inspect", name, "--format", "{{.State.Running}}"],
            &format!("inspecting container {name}"),
        )?;

        Ok(match String::from_utf8_lossy(&output.stdout).trim() {
            "true" => ContainerState::Running,
            _ => ContainerState::Stopped,
        })
    }

    fn start_container(&self, container: &Container) -> Result<()> {
        self.output(
            ["start", container.name.as_str()],
            &format!("starting container {}", container.name),
        )?;
        Ok(())
    }

    fn remove_container(&self, name: &str) -> Result<()> {
        if self.get_container(name)?.is_none() {
            debug!("Container {name} does not exist, nothing to remove");
            return Ok(());
        }

        self.output(["rm", "-f", name], &format!("removing container {name}"))?;
        Ok(())
    }
}

/// Anchored regex matching exactly `name`; the runtime treats the filter as a regex
fn name_filter(name: &str) -> String {
    format!("^{}$", name.replace('.', "\\."))
}

fn create_args(spec: &ContainerSpec) -> Vec<String> {
    let mut args: Vec<String> = vec!["create".into(), "--name".into(), spec.name.clone()];

    for ulimit in &spec.ulimits {
        args.push("--ulimit".into());
        args.push(format!("{}={}:{}", ulimit.name, ulimit.soft, ulimit.hard));
    }

    for (key, value) in &spec.env {
        args.push("-e".into());
        args.push(format!("{key}={value}"));
    }

    for volume in &spec.volumes {
        args.push("-v".into());
        args.push(volume.clone());
    }

    for port in &spec.ports {
        args.push("-p".into());
        args.push(port.clone());
    }

    args.push(spec.image.clone());
    args
}
