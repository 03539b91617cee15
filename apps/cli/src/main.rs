mod args;
mod config;

use std::io;
use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Parser;
use tabstats_app::{AppConfig, AppPaths, AppState, ensure_app_data_dir};
use tabstats_app_api::{AppContext, IngestRequest, TabRenderDataRequest};
use tabstats_http_api::HttpState;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::args::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = config::load_or_create()?;
    if config.created {
        info!(
            file = %config.file.display(),
            port = config.config.port,
            "created default config"
        );
    }

    let paths = AppPaths::new(config.data_dir.clone());
    ensure_app_data_dir(&paths).context("create data dir")?;
    info!(data_dir = %paths.app_data_dir.display(), "using data dir");

    let app_state = AppState::new(AppConfig {
        db_path: paths.db_path.clone(),
        events_dir: paths.events_dir.clone(),
        reports: config.config.reports.clone(),
    });
    app_state.setup_db().context("failed to initialize database")?;
    let context = AppContext {
        app_state,
        app_data_dir: paths.app_data_dir,
    };

    match cli.command {
        Commands::Serve { port } => serve(context, port.unwrap_or(config.config.port)).await?,
        Commands::Ingest { dir } => {
            let stats = tabstats_app_api::ingest(&context, IngestRequest { dir })?;
            for issue in &stats.issues {
                warn!(file = %issue.file_path, message = %issue.message, "ingest issue");
            }
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        Commands::Report {
            interval,
            start,
            end,
            groups,
            tabs,
        } => {
            let table = tabstats_app_api::tab_render_data(
                &context,
                TabRenderDataRequest {
                    interval,
                    start,
                    end,
                    groups,
                    tabs,
                },
            )?;
            println!("{}", serde_json::to_string_pretty(&table)?);
        }
    }
    Ok(())
}

async fn serve(context: AppContext, port: u16) -> Result<()> {
    let ingest_state = context.app_state.clone();
    tokio::task::spawn_blocking(move || {
        if let Err(err) = ingest_state.refresh_data() {
            error!(%err, "failed to refresh data on startup");
        }
    });

    let router = tabstats_http_api::router(HttpState::new(context));
    let (listener, actual_port, used_fallback) = bind_port(port).await?;
    if used_fallback {
        warn!(port, actual_port, "configured port unavailable; using fallback for this run");
    }
    info!(url = %format!("http://127.0.0.1:{actual_port}"), "tabstats is running");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn bind_port(port: u16) -> Result<(tokio::net::TcpListener, u16, bool), io::Error> {
    if port == 0 {
        let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let actual_port = listener.local_addr()?.port();
        return Ok((listener, actual_port, false));
    }

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => Ok((listener, port, false)),
        Err(_) => {
            let listener =
                tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
            let actual_port = listener.local_addr()?.port();
            Ok((listener, actual_port, true))
        }
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutting down");
}
