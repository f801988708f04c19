//! Toolbridge server entry point.
//!
//! Loads configuration from the environment (with CLI overrides), registers
//! the backend service adapters, and serves the HTTP transport until a
//! shutdown signal arrives.

use std::sync::Arc;

use clap::Parser;
use toolbridge_http::{HttpConfig, router, shutdown_signal};
use toolbridge_registry::{Dispatcher, Registry};
use toolbridge_services::{GithubService, LinearService};

#[derive(Parser, Debug)]
#[command(name = "toolbridge", version)]
#[command(about = "Toolbridge - unified tool control plane over backend services")]
struct Cli {
    /// Listen port (overrides TOOLBRIDGE_PORT)
    #[arg(long)]
    port: Option<u16>,
    /// Listen address (overrides TOOLBRIDGE_BIND)
    #[arg(long)]
    bind: Option<String>,
    /// Log output format (text, json)
    #[arg(long, default_value = "text")]
    log_format: String,
}

fn init_tracing(format: &str) {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env();
    let env_filter = match "info".parse() {
        Ok(directive) => env_filter.add_directive(directive),
        Err(_) => env_filter, // fallback to default if parsing fails
    };

    let builder = tracing_subscriber::fmt().with_env_filter(env_filter);
    let _ = match format {
        "json" => builder.json().try_init(),
        _ => builder.try_init(),
    };
}

/// Build the registry with every backend service registered.
fn build_registry() -> Result<Arc<Registry>, Box<dyn std::error::Error>> {
    let registry = Arc::new(Registry::new());
    registry.register(Arc::new(GithubService::from_env()))?;
    registry.register(Arc::new(LinearService::from_env()))?;
    tracing::info!(
        tools = registry.len(),
        "All backend services initialized and registered"
    );
    Ok(registry)
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = HttpConfig::from_env()?;
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(bind) = cli.bind {
        config.bind = bind;
    }

    let registry = build_registry()?;
    let dispatcher = Arc::new(Dispatcher::with_timeout(
        Arc::clone(&registry),
        config.handler_timeout(),
    ));
    let app = router(registry, dispatcher, &config);

    let addr = config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Starting Toolbridge server");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.log_format);

    if let Err(e) = run(cli).await {
        tracing::error!(error = %e, "Server failed");
        std::process::exit(1);
    }
}
