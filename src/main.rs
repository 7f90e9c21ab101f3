use anyhow::{Context, Result};
use assetrunner::config::Config;
use assetrunner::gcp::{self, client::GcpClient, gke};
use assetrunner::k8s::{self, KubeClient};
use assetrunner::publisher::{FilePublisher, Publisher, StdoutPublisher};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

/// Collect GKE and Kubernetes resources as asset records
#[derive(Parser, Debug)]
#[command(name = "assetrunner", version, about, long_about = None)]
struct Args {
    /// Write NDJSON records to this file instead of stdout
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Log level (logs go to a file, never stdout)
    #[arg(long, value_enum, default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Collect GKE clusters
    Gcp {
        /// GCP project to collect from (repeatable)
        #[arg(short, long)]
        project: Vec<String>,
    },
    /// Collect nodes, pods and containers of a Kubernetes cluster
    K8s {
        /// Kubeconfig context to use
        #[arg(long)]
        context: Option<String>,
    },
    /// Run both collectors
    All {
        #[arg(short, long)]
        project: Vec<String>,
        #[arg(long)]
        context: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    // RUST_LOG narrows further; --log-level caps what reaches the file
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(tracing_level.to_string().to_lowercase()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("assetrunner started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("assetrunner").join("assetrunner.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".assetrunner").join("assetrunner.log");
    }
    PathBuf::from("assetrunner.log")
}

async fn run_gcp(config: &Config, cli_projects: &[String], sink: &dyn Publisher) -> Result<usize> {
    let client = GcpClient::new().await?;

    let mut projects = config.effective_projects(cli_projects);
    if projects.is_empty() {
        projects = gcp::projects::list_project_ids(&client)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to discover projects: {}", gcp::format_gcp_error(&e)))?;
        tracing::info!("Discovered {} projects", projects.len());
    }

    if projects.is_empty() {
        return Err(anyhow::anyhow!(
            "No GCP project configured. Set GOOGLE_CLOUD_PROJECT or use --project"
        ));
    }

    let count = gke::collect_gke_assets(&client, &projects, sink).await?;
    Ok(count)
}

async fn run_k8s(config: &Config, cli_context: Option<&str>, sink: &dyn Publisher) -> Result<usize> {
    let context = config.effective_kube_context(cli_context);
    let client = KubeClient::new(context.as_deref()).await?;
    let count = k8s::collect_k8s_assets(&client, sink).await?;
    Ok(count)
}

fn report(name: &str, result: &Result<usize>) {
    match result {
        Ok(count) => tracing::info!("{} collection published {} assets", name, count),
        Err(e) => {
            tracing::error!("{} collection failed: {:#}", name, e);
            eprintln!("Error: {} collection failed: {:#}", name, e);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level)?;

    let config = Config::load();
    let sink: Box<dyn Publisher> = match config.effective_output(args.output.as_deref()) {
        Some(path) => Box::new(FilePublisher::open(&path)?),
        None => Box::new(StdoutPublisher),
    };
    let sink = sink.as_ref();

    let results = match &args.command {
        Command::Gcp { project } => vec![("GKE", run_gcp(&config, project, sink).await)],
        Command::K8s { context } => {
            vec![("Kubernetes", run_k8s(&config, context.as_deref(), sink).await)]
        }
        Command::All { project, context } => {
            // Independent passes: one failing does not stop the other
            let (gke, kube) = tokio::join!(
                run_gcp(&config, project, sink),
                run_k8s(&config, context.as_deref(), sink)
            );
            vec![("GKE", gke), ("Kubernetes", kube)]
        }
    };

    for (name, result) in &results {
        report(name, result);
    }

    if results.iter().any(|(_, r)| r.is_err()) {
        return Err(anyhow::anyhow!("One or more collections failed"));
    }

    Ok(())
}
