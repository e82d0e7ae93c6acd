//! Runs task-management requests through the traced task manager.
//!
//! Usage:
//!
//! ```text
//! taskctl [--backend single|multi] [--config PATH] <request>...
//! ```
//!
//! Each request is handled in order against one shared in-memory store, so
//! later requests see the tasks created by earlier ones. Responses are
//! printed one per request. Before exiting, pending traces are flushed to
//! the configured exporter.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use eyre::{Result, WrapErr};
use tasktrace::{
    config::AppConfig,
    logging,
    observability::services::Tracer,
    orchestrator::TaskManager,
    task::adapters::memory::InMemoryTaskStore,
};
use tracing::{info, warn};

/// How long shutdown waits for pending traces.
const FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

/// Send natural-language requests to a task-management agent.
#[derive(Debug, Parser)]
#[command(name = "taskctl", version, about)]
struct Cli {
    /// Agent backend to use (`single` or `multi`); defaults to the
    /// configured backend.
    #[arg(short, long, env = "TASKTRACE_BACKEND")]
    backend: Option<String>,

    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Requests to run, in order.
    #[arg(required = true)]
    requests: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref(), |name| std::env::var(name).ok())
        .wrap_err("failed to load configuration")?;
    logging::init(&config.logging.filter);

    let exporter = config
        .observability
        .build_exporter()
        .wrap_err("failed to build trace exporter")?;
    let tracer = Tracer::start(config.observability.tracer_settings(), exporter)
        .wrap_err("failed to start tracer")?;
    let manager = TaskManager::new(
        Arc::new(InMemoryTaskStore::new()),
        tracer.clone(),
        config.orchestrator.manager_settings(),
    )
    .wrap_err("failed to build task manager")?;

    let selector = cli
        .backend
        .unwrap_or_else(|| manager.settings().default_backend.to_string());
    info!(backend = %selector, requests = cli.requests.len(), "running requests");

    let mut stdout = std::io::stdout().lock();
    for request in &cli.requests {
        let response = manager.process(request, &selector).await?;
        writeln!(stdout, "{response}").wrap_err("failed to write response")?;
    }

    if !tracer.shutdown(FLUSH_TIMEOUT).await {
        warn!("exiting with traces still pending export");
    }
    let stats = tracer.stats();
    info!(
        exported = stats.traces_exported,
        dropped = stats.traces_dropped,
        failures = stats.export_failures,
        "trace export finished"
    );
    Ok(())
}
