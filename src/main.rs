use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use wocker_elastic::cli::{ElasticCommand, elastic};
use wocker_elastic::infra::config::{default_config_dir, expand_config_dir};
use wocker_elastic::infra::docker_adapter::DEFAULT_RUNTIME_BIN;

#[derive(Parser)]
#[command(
    name = "wocker-elastic",
    about = "Manage Elasticsearch services backed by containers"
)]
struct Cli {
    /// Configuration directory (default: ~/.config/wocker/plugins/elastic)
    #[arg(long, env = "WOCKER_ELASTIC_CONFIG_DIR", default_value_os_t = default_config_dir())]
    config_dir: PathBuf,

    /// Docker-compatible CLI used to manage containers
    #[arg(long, env = "WOCKER_ELASTIC_RUNTIME", default_value = DEFAULT_RUNTIME_BIN)]
    runtime_bin: String,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(flatten)]
    command: ElasticCommand,
}

fn setup_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .without_time()
        .compact()
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let config_dir = expand_config_dir(&cli.config_dir);
    elastic::run(cli.command, &config_dir, &cli.runtime_bin)
}
