use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};

use huddle_blob::FsBlobStore;
use huddle_server::api::{self, AppState};
use huddle_server::auth::AuthProvider;
use huddle_server::config::HuddleConfig;
use huddle_store::DocumentStore;

/// Huddle meeting backend HTTP server.
#[derive(Parser, Debug)]
#[command(name = "huddle-server", about = "Meeting document backend for shared meeting links")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "huddle.toml")]
    config: String,

    /// Override the bind host.
    #[arg(long)]
    host: Option<String>,

    /// Override the bind port.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration from TOML file, or use defaults if the file does not exist.
    let mut config: HuddleConfig = if Path::new(&cli.config).exists() {
        let contents = std::fs::read_to_string(&cli.config)?;
        toml::from_str(&contents)?
    } else {
        HuddleConfig::default()
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    if !Path::new(&cli.config).exists() {
        info!(path = %cli.config, "config file not found, using defaults");
    }

    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    let auth = Arc::new(AuthProvider::from_config(&config.auth)?);

    let blobs = Arc::new(FsBlobStore::new(&config.storage.upload_dir)?);
    info!(dir = %config.storage.upload_dir, "blob area ready");

    let store = Arc::new(DocumentStore::new(
        &config.storage.data_file,
        blobs.clone(),
    ));
    info!(path = %config.storage.data_file, "document store ready");

    let ui_path = config
        .ui
        .enabled
        .then(|| PathBuf::from(&config.ui.dist_path))
        .filter(|path| {
            if path.exists() {
                true
            } else {
                warn!(path = %path.display(), "UI directory not found, UI will not be served");
                false
            }
        });

    let state = AppState {
        store,
        blobs,
        auth,
    };
    let app = api::router(state, ui_path, config.server.max_upload_bytes);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!(%addr, "starting huddle server");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    // Serve with graceful shutdown on SIGINT / SIGTERM.
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

/// Wait for SIGINT (Ctrl+C) or SIGTERM, then return to trigger graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { info!("received SIGINT"); }
        () = terminate => { info!("received SIGTERM"); }
    }
}
