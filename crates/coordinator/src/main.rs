use std::net::SocketAddr;

use anyhow::Context;
use clap::Parser;
use cmd_util::env::config_service;
use common::{
    errors::MainError,
    http::serve_http,
    shutdown::ShutdownSignal,
};
use coordinator::{
    config::CoordinatorConfig,
    make_app,
    router::router,
};
use tokio::signal::unix::{
    signal,
    SignalKind,
};

fn main() -> Result<(), MainError> {
    let _guard = config_service();
    let config = CoordinatorConfig::parse();
    tracing::info!("Starting coordinator with config {config:?}");

    let tokio = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    tokio.block_on(run_server(config))?;
    Ok(())
}

async fn run_server(config: CoordinatorConfig) -> anyhow::Result<()> {
    let (shutdown_tx, mut shutdown_rx) = async_broadcast::broadcast(1);
    let st = make_app(config.clone(), ShutdownSignal::new(shutdown_tx))?;
    let addr = SocketAddr::from((config.host, config.port));
    tracing::info!("Coordinator listening on {addr}");

    let mut sigterm = signal(SignalKind::terminate()).context("installing SIGTERM handler")?;
    let shutdown = async move {
        let reason: std::borrow::Cow<'static, str> = tokio::select! {
            msg = shutdown_rx.recv() => match msg {
                Ok(msg) => msg.reason,
                Err(_) => "shutdown channel closed".into(),
            },
            _ = tokio::signal::ctrl_c() => "SIGINT".into(),
            _ = sigterm.recv() => "SIGTERM".into(),
        };
        tracing::info!("Shutting down: {reason}");
    };
    serve_http(router(st), addr, shutdown).await?;
    // Nothing to flush: every commit was already fsync'd when it was
    // acknowledged.
    tracing::info!("Done");
    Ok(())
}
