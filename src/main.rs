//! Tebex webhook receiver
//!
//! Runs an authenticated webhook endpoint that logs every delivery, and signs
//! bodies locally for testing integrations.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use axum::{routing::get, Router};
use clap::{Parser, Subcommand};
use tokio::io::AsyncReadExt;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use tebex_sdk::config::TebexConfig;
use tebex_sdk::metrics::WebhookMetrics;
use tebex_sdk::webhooks::{webhook_router, ClientIpSource, LoggingHandler, WebhookState};

/// Tebex webhook receiver
#[derive(Parser, Debug)]
#[command(name = "tebex-webhooks")]
#[command(version)]
#[command(about = "Receive and verify Tebex webhooks")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the webhook endpoint at /webhooks/tebex
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,

        /// Host to bind to
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,

        /// Read the client IP from this header instead of the TCP peer.
        /// Only set this behind a reverse proxy that overwrites the header.
        #[arg(long)]
        client_ip_header: Option<String>,
    },

    /// Print the X-Signature Tebex would send for a body
    Sign {
        /// File containing the raw body, or `-` for stdin
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(std::io::stderr)
        .init();

    let config = TebexConfig::from_env()?;

    match cli.command {
        Command::Serve {
            port,
            host,
            client_ip_header,
        } => serve(&config, &host, port, client_ip_header).await,
        Command::Sign { file } => sign(&config, file).await,
    }
}

async fn serve(
    config: &TebexConfig,
    host: &str,
    port: u16,
    client_ip_header: Option<String>,
) -> anyhow::Result<()> {
    let authenticator = config.webhook_authenticator()?;

    let client_ip = match client_ip_header {
        Some(header) => {
            tracing::warn!(header = %header, "Trusting client IP header; the proxy must overwrite it");
            ClientIpSource::Header(header)
        }
        None => ClientIpSource::Peer,
    };

    let metrics = Arc::new(WebhookMetrics::new());
    let state = WebhookState::new(authenticator, LoggingHandler)
        .with_client_ip(client_ip)
        .with_metrics(Arc::clone(&metrics));

    let app = Router::new()
        .nest("/webhooks/tebex", webhook_router(Arc::new(state)))
        .route(
            "/metrics",
            get(move || {
                let metrics = Arc::clone(&metrics);
                async move { metrics.to_prometheus_format() }
            }),
        )
        .route("/health", get(|| async { "OK" }))
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .with_context(|| format!("Invalid listen address {host}:{port}"))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    tracing::info!("Tebex webhook receiver listening on http://{}/webhooks/tebex", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Tebex webhook receiver stopped");
    Ok(())
}

async fn sign(config: &TebexConfig, file: PathBuf) -> anyhow::Result<()> {
    let authenticator = config.webhook_authenticator()?;

    let body = if file.as_os_str() == "-" {
        let mut buf = Vec::new();
        tokio::io::stdin().read_to_end(&mut buf).await?;
        buf
    } else {
        tokio::fs::read(&file)
            .await
            .with_context(|| format!("Failed to read {}", file.display()))?
    };

    println!("{}", authenticator.sign(&body));
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
