use std::env;

use rampart_server::config::loader::load_config;
use rampart_server::{DataAccessLayer, run_topology_monitor};

/// How the configuration path was determined.
#[derive(Debug, Clone, Copy)]
enum ConfigSource {
    /// From --config CLI argument
    CliArgument,
    /// From RAMPART_CONFIG environment variable
    EnvironmentVariable,
    /// Default path (rampart.toml)
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CliArgument => write!(f, "CLI argument (--config)"),
            Self::EnvironmentVariable => write!(f, "environment variable (RAMPART_CONFIG)"),
            Self::Default => write!(f, "default"),
        }
    }
}

#[tokio::main]
async fn main() {
    // Load .env file if present (before anything else)
    if let Err(e) = dotenvy::dotenv() {
        if !matches!(e, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound) {
            eprintln!("Warning: Failed to load .env file: {e}");
        }
    }

    rampart_server::observability::init_tracing();

    let (config_path, source) = resolve_config_path();

    let cfg = match load_config(Some(&config_path)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(2);
        }
    };

    tracing::info!(
        path = %config_path,
        source = %source,
        service = %cfg.service.name,
        "Configuration loaded"
    );

    rampart_server::observability::apply_logging_level(&cfg.logging.level);

    if let Err(e) = run(cfg).await {
        eprintln!("Data access layer error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cfg: rampart_server::AppConfig) -> anyhow::Result<()> {
    let layer = DataAccessLayer::from_config(&cfg)?;

    let initial = layer.topology().await;
    tracing::info!(
        write_endpoint = %initial.write_endpoint,
        replicas = ?initial.replicas,
        cache_nodes = ?initial.cache_nodes,
        "Data access layer ready"
    );

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for shutdown signal");
        }
    };

    if let Some(report) = run_topology_monitor(layer, cfg.monitor_interval(), shutdown).await {
        tracing::info!(
            write_endpoint = %report.write_endpoint,
            replicas = ?report.replicas,
            cache_nodes_lost = report.cache_nodes_lost,
            "Final topology"
        );
    }

    Ok(())
}

/// Resolve the configuration file path.
///
/// Priority order:
/// 1. CLI argument: --config <path>
/// 2. Environment variable: RAMPART_CONFIG
/// 3. Default: rampart.toml
fn resolve_config_path() -> (String, ConfigSource) {
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            if let Some(path) = args.next() {
                return (path, ConfigSource::CliArgument);
            }
        }
    }

    if let Ok(path) = env::var("RAMPART_CONFIG") {
        if !path.is_empty() {
            return (path, ConfigSource::EnvironmentVariable);
        }
    }

    (
        rampart_server::config::loader::DEFAULT_CONFIG_FILE.to_string(),
        ConfigSource::Default,
    )
}
