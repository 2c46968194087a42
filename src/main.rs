//! fsgate - development file server with path-based access control

use clap::Parser;
use fsgate::access_control::FsPolicy;
use fsgate::config::{AppConfig, compile_aliases, load_config, normalize_config};
use fsgate::server::{PublicFileIndex, ServeContext, build_router};
use fsgate::util::find_available_port;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Development file server with path-based access control
#[derive(Parser, Debug)]
#[command(name = "fsgate")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, env = "FSGATE_CONFIG")]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "FSGATE_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Project root directory to serve
    #[arg(long, env = "FSGATE_ROOT")]
    root: Option<String>,

    /// Host to bind
    #[arg(long, env = "FSGATE_HOST")]
    host: Option<String>,

    /// Port to bind
    #[arg(long, env = "FSGATE_PORT")]
    port: Option<u16>,

    /// Disable strict path checking (serve anything readable)
    #[arg(long, env = "FSGATE_NO_STRICT")]
    no_strict: bool,
}

fn apply_cli_overrides(config: &mut AppConfig, args: &Args) {
    if let Some(root) = &args.root {
        config.root = root.clone();
    }
    if let Some(host) = &args.host {
        config.server.host = host.clone();
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if args.no_strict {
        config.fs.strict = false;
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "Starting fsgate");

    // Load configuration and bring every path to normalized absolute form
    let mut config = load_config(args.config.as_deref())
        .inspect_err(|e| error!(error = %e, "Failed to load configuration"))?;
    apply_cli_overrides(&mut config, &args);
    normalize_config(&mut config)
        .inspect_err(|e| error!(error = %e, "Failed to resolve configured paths"))?;

    // Build the access policy
    let policy = Arc::new(
        FsPolicy::new(&config.fs)
            .inspect_err(|e| error!(error = %e, "Failed to build access policy"))?,
    );
    if !policy.is_strict() {
        info!("Strict path checking is DISABLED; every readable file will be served");
    }

    let aliases = compile_aliases(&config.aliases)?;

    // Snapshot the public directory, if it exists
    let mut ctx = ServeContext::new(policy, config.root.clone())
        .with_aliases(aliases)
        .with_docs_url(config.docs_url.clone());
    if !config.public_dir.is_empty() && std::path::Path::new(&config.public_dir).is_dir() {
        let index = Arc::new(PublicFileIndex::scan(&config.public_dir));
        info!(
            dir = config.public_dir.as_str(),
            files = index.len(),
            "Public directory indexed"
        );
        ctx = ctx
            .with_public_dir(config.public_dir.clone())
            .with_public_files(index);
    }

    let router = build_router(Arc::new(ctx));

    let port = find_available_port(&config.server.host, config.server.port).await?;
    let listener = tokio::net::TcpListener::bind((config.server.host.as_str(), port)).await?;

    info!(
        root = config.root.as_str(),
        "Serving on http://{}:{}", config.server.host, port
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Received shutdown signal");
        })
        .await?;

    Ok(())
}
