use std::{
    borrow::Cow,
    future::Future,
    net::SocketAddr,
};

use axum::{
    response::{
        IntoResponse,
        Response,
    },
    Router,
};
use http::StatusCode;
use serde::{
    Deserialize,
    Serialize,
};
use tokio::net::TcpSocket;

use crate::errors::ErrorMetadataAnyhowExt;

pub mod extract;

const HTTP_SERVER_TCP_BACKLOG: u32 = 1024;

/// The JSON body every error response carries.
#[derive(Serialize, Deserialize)]
pub struct ResponseErrorMessage {
    code: Cow<'static, str>,
    message: Cow<'static, str>,
}

#[derive(Debug)]
pub struct HttpError {
    /// HTTP Status Code
    status_code: StatusCode,
    /// Stable machine-readable error code sent in the HTTP response
    error_code: Cow<'static, str>,
    /// Detailed caller-facing error message sent in the HTTP response
    msg: Cow<'static, str>,
}

impl HttpError {
    pub fn new<S, T>(status_code: StatusCode, error_code: S, msg: T) -> Self
    where
        S: Into<Cow<'static, str>>,
        T: Into<Cow<'static, str>>,
    {
        Self {
            status_code,
            error_code: error_code.into(),
            msg: msg.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        self.status_code
    }

    pub fn error_code(&self) -> &str {
        &self.error_code
    }

    pub fn message(&self) -> &str {
        &self.msg
    }

    pub fn into_response(self) -> Response {
        (
            self.status_code,
            axum::Json(ResponseErrorMessage {
                code: self.error_code,
                message: self.msg,
            }),
        )
            .into_response()
    }
}

/// `HttpResponseError` converts `anyhow::Error` chains into HTTP responses
/// at the boundary of the service: the `ErrorMetadata` classification picks
/// the status code, and the full chain is logged exactly once, in
/// `IntoResponse`, since that is the exit point of the HTTP layer.
#[derive(Debug)]
pub struct HttpResponseError {
    trace: anyhow::Error,
    http_error: HttpError,
}

impl IntoResponse for HttpResponseError {
    fn into_response(self) -> Response {
        if self.http_error.status_code.is_server_error() {
            tracing::error!("{:#}", self.trace);
        } else {
            tracing::warn!("{:#}", self.trace);
        }
        self.http_error.into_response()
    }
}

impl From<anyhow::Error> for HttpResponseError {
    fn from(err: anyhow::Error) -> HttpResponseError {
        let http_error = HttpError {
            status_code: err.http_status(),
            error_code: err.short_msg().to_string().into(),
            msg: err.msg().to_string().into(),
        };
        Self {
            trace: err,
            http_error,
        }
    }
}

impl From<HttpResponseError> for anyhow::Error {
    fn from(value: HttpResponseError) -> Self {
        value.trace
    }
}

/// Bind `addr` with `SO_REUSEADDR` and `TCP_NODELAY` and serve `router`
/// until the `shutdown` future resolves. Connection peer addresses are made
/// available to handlers via `ConnectInfo<SocketAddr>`.
pub async fn serve_http<F>(router: Router, addr: SocketAddr, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let socket = TcpSocket::new_v4()?;
    socket.set_reuseaddr(true)?;
    socket.set_nodelay(true)?;
    socket.bind(addr)?;
    let listener = socket.listen(HTTP_SERVER_TCP_BACKLOG)?;

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await?;
    Ok(())
}
