//! Bootstrap binary: loads `ServflowSettings`, discovers `APIConfig`
//! files, wires the action/integration registries, and serves the
//! resulting plans over HTTP (§4.I, §6).

mod bootstrap;
mod settings;

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use settings::{LogFormat, ServflowSettings};

#[derive(Parser)]
#[command(name = "servflow", about = "Configuration-driven HTTP and MCP action graph engine")]
struct Args {
    /// Path to the layered config file, merged over built-in defaults
    /// and under `SERVFLOW_*` environment variables.
    #[arg(long, default_value = "servflow.toml")]
    config: PathBuf,
}

fn init_tracing(format: LogFormat) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(env_filter);
    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let settings = ServflowSettings::load(&args.config)?;
    init_tracing(settings.log_format);

    let apis = bootstrap::build_mounted_apis(&settings).await?;
    tracing::info!(count = apis.len(), "mounted APIs");

    let router = servflow_http::build_router(apis);
    let addr: SocketAddr = settings.bind_addr.parse()?;
    tracing::info!(%addr, "servflow listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}
