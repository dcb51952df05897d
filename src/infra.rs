pub mod config;
pub mod docker_adapter;
pub mod prompt;

pub use config::JsonFileStore;
pub use docker_adapter::DockerAdapter;
pub use prompt::TerminalPrompter;
