use axum::{
    routing::{
        get,
        post,
    },
    Router,
};

use crate::{
    api,
    CoordinatorState,
};

pub fn router(st: CoordinatorState) -> Router {
    Router::new()
        .route("/work-batch", get(api::work_batch))
        .route("/work-completed", post(api::work_completed))
        .route("/work-private", post(api::work_private))
        .route("/progress", get(api::progress))
        .route("/file-status", get(api::file_status))
        .route("/rotate-file", post(api::rotate_file))
        .route("/cleanup-file", post(api::cleanup_file))
        .route("/shutdown", post(api::shutdown))
        .with_state(st)
}
