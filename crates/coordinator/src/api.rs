use std::net::SocketAddr;

use axum::extract::{
    ConnectInfo,
    State,
};
use common::http::{
    extract::{
        Json,
        Query,
    },
    HttpResponseError,
};
use serde::{
    Deserialize,
    Serialize,
};

use crate::{
    knobs::DEFAULT_WORK_BATCH_SIZE,
    manager::{
        FileStatus,
        Progress,
    },
    rotation,
    state::WorkRecord,
    CoordinatorState,
};

#[derive(Serialize)]
pub struct StatusResponse {
    status: &'static str,
    message: String,
}

impl StatusResponse {
    fn success(message: String) -> Self {
        Self {
            status: "success",
            message,
        }
    }
}

#[derive(Deserialize)]
pub struct WorkBatchQueryArgs {
    batch_size: Option<usize>,
}

#[derive(Serialize)]
pub struct WorkBatchResponse {
    work_ids: Vec<u64>,
}

pub async fn work_batch(
    State(st): State<CoordinatorState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    Query(args): Query<WorkBatchQueryArgs>,
) -> Result<Json<WorkBatchResponse>, HttpResponseError> {
    let batch_size = args.batch_size.unwrap_or(*DEFAULT_WORK_BATCH_SIZE);
    let work_ids = st.manager.get_batch(batch_size, Some(peer.ip()));
    Ok(Json(WorkBatchResponse { work_ids }))
}

pub async fn work_completed(
    State(st): State<CoordinatorState>,
    Json(record): Json<WorkRecord>,
) -> Result<Json<StatusResponse>, HttpResponseError> {
    let id = st.manager.submit_completed(record)?;
    Ok(Json(StatusResponse::success(format!(
        "Work {id} saved successfully"
    ))))
}

#[derive(Deserialize)]
pub struct WorkPrivateQueryArgs {
    work_id: u64,
}

pub async fn work_private(
    State(st): State<CoordinatorState>,
    Query(args): Query<WorkPrivateQueryArgs>,
) -> Result<Json<StatusResponse>, HttpResponseError> {
    st.manager.submit_private(args.work_id)?;
    Ok(Json(StatusResponse::success(format!(
        "Work {} marked as private",
        args.work_id
    ))))
}

pub async fn progress(
    State(st): State<CoordinatorState>,
) -> Result<Json<Progress>, HttpResponseError> {
    Ok(Json(st.manager.progress()))
}

pub async fn file_status(
    State(st): State<CoordinatorState>,
) -> Result<Json<FileStatus>, HttpResponseError> {
    Ok(Json(st.manager.file_status()))
}

#[derive(Serialize)]
pub struct RotateFileResponse {
    status: &'static str,
    rotated_file: [String; 2],
    compressed_path: String,
}

pub async fn rotate_file(
    State(st): State<CoordinatorState>,
) -> Result<Json<RotateFileResponse>, HttpResponseError> {
    let outcome = rotation::rotate_results(&st.manager).await?;
    Ok(Json(RotateFileResponse {
        status: "success",
        compressed_path: outcome.compressed_path.display().to_string(),
        rotated_file: [outcome.rotated_name, outcome.compressed_name],
    }))
}

#[derive(Deserialize)]
pub struct CleanupFileQueryArgs {
    filename: String,
}

pub async fn cleanup_file(
    State(st): State<CoordinatorState>,
    Query(args): Query<CleanupFileQueryArgs>,
) -> Result<Json<StatusResponse>, HttpResponseError> {
    rotation::cleanup_segment(&st.manager, &args.filename)?;
    Ok(Json(StatusResponse::success(format!(
        "Removed {}",
        args.filename
    ))))
}

pub async fn shutdown(
    State(st): State<CoordinatorState>,
) -> Result<Json<StatusResponse>, HttpResponseError> {
    st.shutdown.signal("shutdown requested over HTTP");
    Ok(Json(StatusResponse::success(
        "Coordinator shutting down".to_string(),
    )))
}
