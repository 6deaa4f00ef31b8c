//! `journal-vault` — binary entry point.
//!
//! `journal-vault serve` (the default) startup sequence:
//! 1. Load and validate [`Config`] from environment variables, including the key.
//! 2. Initialise telemetry (JSON logs, optional OTLP export).
//! 3. Build the [`FieldCodec`] from the configured key.
//! 4. Seed the [`ProfileRegistry`] and load the optional profiles file.
//! 5. Spawn the profile refresh task when a profiles file is configured.
//! 6. Build the Axum router and serve until Ctrl-C / SIGTERM.
//!
//! `journal-vault keygen` prints a fresh `ENCRYPTION_KEY` and exits.

mod config;
mod profile;
mod server;
mod telemetry;

use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use field_codec::{EncryptionKey, FieldCodec};
use tracing::info;

use config::Config;
use profile::ProfileRegistry;
use server::state::AppState;

#[derive(Debug, Parser)]
#[command(name = "journal-vault", version, about = "Field-level encryption for journal records")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP service (default).
    Serve,
    /// Print a freshly generated ENCRYPTION_KEY and exit.
    Keygen,
}

#[tokio::main]
async fn main() -> Result<()> {
    match Cli::parse().command.unwrap_or(Command::Serve) {
        Command::Serve => serve().await,
        Command::Keygen => {
            println!("ENCRYPTION_KEY={}", EncryptionKey::generate().to_hex());
            Ok(())
        }
    }
}

async fn serve() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let mut cfg = Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e:#}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init_telemetry(cfg.otel_exporter_otlp_endpoint.as_deref(), &cfg.log_level)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        listen_port = cfg.listen_port,
        "journal-vault starting"
    );

    // -----------------------------------------------------------------------
    // 3. Codec
    // -----------------------------------------------------------------------
    let codec = FieldCodec::new(cfg.take_key()?);
    info!(key_fingerprint = %codec.key_fingerprint(), "encryption key loaded");

    // -----------------------------------------------------------------------
    // 4. Profiles
    // -----------------------------------------------------------------------
    let profiles = ProfileRegistry::new();
    if let Some(path) = &cfg.profiles_path {
        profile::load_from_file(path, &profiles).await?;
    }

    // -----------------------------------------------------------------------
    // 5. Background tasks
    // -----------------------------------------------------------------------
    let _profile_refresh = cfg.profiles_path.clone().map(|path| {
        profile::refresh_task(
            path,
            Duration::from_secs(cfg.profile_refresh_interval_secs),
            profiles.clone(),
        )
    });

    // -----------------------------------------------------------------------
    // 6. HTTP server
    // -----------------------------------------------------------------------
    let state = AppState::new(codec, profiles, cfg.profile_header_name.clone());
    let router = server::router::build(state);

    let addr: std::net::SocketAddr = ([0, 0, 0, 0], cfg.listen_port).into();
    info!(addr = %addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("journal-vault stopped");
    telemetry::shutdown_telemetry();
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
