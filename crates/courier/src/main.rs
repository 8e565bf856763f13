use std::net::SocketAddr;
use std::sync::Arc;

use color_eyre::eyre::Context;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use courier_worker::{CourierConfig, CourierWorker, WorkerEvent};

use crate::banner::print_banner;

mod banner;
mod error;
mod server;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    print_banner();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .from_env_lossy()
                .add_directive("courier=info".parse()?)
                .add_directive("courier_worker=info".parse()?)
                .add_directive("courier_gateway=info".parse()?)
                .add_directive("courier_db=info".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .init();

    let config = CourierConfig::from_env().wrap_err("Failed to read configuration")?;
    info!(gateway = %config.gateway.base_url, port = config.port, "Courier start");

    let mut worker = CourierWorker::new(&config).wrap_err("Failed to create worker")?;
    info!("Message log: {}", worker.store().path().display());

    if let Some(event_rx) = worker.take_event_receiver() {
        tokio::spawn(log_events(event_rx));
    }

    let app = server::router(Arc::new(worker));
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .wrap_err_with(|| format!("Failed to bind {addr}"))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .wrap_err("Server error")?;

    info!("Courier shutting down");
    Ok(())
}

async fn log_events(mut event_rx: mpsc::Receiver<WorkerEvent>) {
    while let Some(event) = event_rx.recv().await {
        match event {
            WorkerEvent::MessageSent { id, to, stored } => {
                tracing::debug!(%id, %to, stored, "📤 sent");
            }
            WorkerEvent::MessagesReceived { count, total } => {
                tracing::debug!(count, total, "💬 received");
            }
            WorkerEvent::StoreFailed { error } => {
                tracing::warn!(%error, "Message log write failed");
            }
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(?e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
