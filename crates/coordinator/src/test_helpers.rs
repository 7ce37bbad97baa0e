use std::{
    net::{
        Ipv4Addr,
        SocketAddr,
    },
    path::Path,
    sync::Arc,
};

use anyhow::Context;
use axum::{
    body::Body,
    extract::connect_info::MockConnectInfo,
    Router,
};
use common::shutdown::{
    ShutdownMessage,
    ShutdownSignal,
};
use http::{
    Request,
    StatusCode,
};
use http_body_util::BodyExt;
use serde::Serialize;
use tower::ServiceExt;

use crate::{
    config::CoordinatorConfig,
    manager::WorkManager,
    router::router,
    state::WorkRecord,
    CoordinatorState,
};

pub fn test_config(output: &Path, start_id: u64, end_id: u64) -> CoordinatorConfig {
    CoordinatorConfig {
        output: output.to_path_buf(),
        start_id,
        end_id,
        host: Ipv4Addr::LOCALHOST,
        port: 0,
    }
}

pub fn sample_record(id: u64, title: &str) -> WorkRecord {
    WorkRecord {
        id: id.to_string(),
        title: title.to_string(),
        metadata: serde_json::Map::new(),
        chapters: vec![serde_json::json!({"title": "Chapter 1", "text": "..."})],
    }
}

/// A coordinator wired to the real router over a caller-owned output
/// directory. The producer task is not spawned; tests drive refills
/// explicitly so dispatch stays deterministic.
pub struct TestCoordinator {
    pub st: CoordinatorState,
    pub shutdown_rx: async_broadcast::Receiver<ShutdownMessage>,
    router: Router,
}

impl TestCoordinator {
    pub fn setup(config: CoordinatorConfig) -> anyhow::Result<Self> {
        cmd_util::env::config_test();
        let (shutdown_tx, shutdown_rx) = async_broadcast::broadcast(1);
        let manager = Arc::new(WorkManager::open(config)?);
        let st = CoordinatorState {
            manager,
            shutdown: ShutdownSignal::new(shutdown_tx),
        };
        let router = router(st.clone()).layer(MockConnectInfo(SocketAddr::from((
            Ipv4Addr::LOCALHOST,
            4099,
        ))));
        Ok(Self {
            st,
            shutdown_rx,
            router,
        })
    }

    pub fn refill(&self) -> usize {
        self.st.manager.refill_queue()
    }

    pub async fn get(&self, uri: &str) -> anyhow::Result<(StatusCode, serde_json::Value)> {
        let req = Request::builder().uri(uri).body(Body::empty())?;
        self.request(req).await
    }

    pub async fn post(&self, uri: &str) -> anyhow::Result<(StatusCode, serde_json::Value)> {
        let req = Request::builder()
            .method("POST")
            .uri(uri)
            .body(Body::empty())?;
        self.request(req).await
    }

    pub async fn post_json<T: Serialize>(
        &self,
        uri: &str,
        body: &T,
    ) -> anyhow::Result<(StatusCode, serde_json::Value)> {
        self.post_raw(uri, serde_json::to_string(body)?).await
    }

    pub async fn post_raw(
        &self,
        uri: &str,
        body: impl Into<Body>,
    ) -> anyhow::Result<(StatusCode, serde_json::Value)> {
        let req = Request::builder()
            .method("POST")
            .uri(uri)
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(body.into())?;
        self.request(req).await
    }

    async fn request(
        &self,
        req: Request<Body>,
    ) -> anyhow::Result<(StatusCode, serde_json::Value)> {
        let response = self.router.clone().oneshot(req).await?;
        let (parts, body) = response.into_parts();
        let bytes = body.collect().await?.to_bytes();
        let json = serde_json::from_slice(&bytes).with_context(|| {
            format!(
                "couldn't deserialize as json: {}",
                String::from_utf8_lossy(&bytes)
            )
        })?;
        Ok((parts.status, json))
    }
}
