use std::borrow::Cow;

use http::StatusCode;

pub const INTERNAL_SERVER_ERROR: &str = "InternalServerError";
pub const INTERNAL_SERVER_ERROR_MSG: &str = "Your request couldn't be completed. Try again later.";

/// `ErrorMetadata` can be attached to an `anyhow` error chain via
/// `.context(e /* ErrorMetadata */)` to classify it. The classification
/// decides the HTTP status at the service boundary; `short_msg` is a stable
/// machine-matchable tag and `msg` the human-readable description.
#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
#[error("{msg}")]
pub struct ErrorMetadata {
    pub code: ErrorCode,
    /// Short ScreamingCamelCase tag, e.g. `UnsafeFilename`. Usable in tests
    /// for string matching.
    pub short_msg: Cow<'static, str>,
    /// Longer, descriptive, caller-facing message.
    pub msg: Cow<'static, str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    BadRequest,
    NotFound,
    OperationalInternalServerError,
}

impl ErrorCode {
    fn http_status_code(&self) -> StatusCode {
        match self {
            ErrorCode::BadRequest => StatusCode::BAD_REQUEST,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::OperationalInternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ErrorMetadata {
    /// Bad Request. Maps to 400 in HTTP.
    pub fn bad_request(
        short_msg: impl Into<Cow<'static, str>>,
        msg: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            code: ErrorCode::BadRequest,
            short_msg: short_msg.into(),
            msg: msg.into(),
        }
    }

    /// Resource not found. Maps to 404 in HTTP.
    pub fn not_found(
        short_msg: impl Into<Cow<'static, str>>,
        msg: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            code: ErrorCode::NotFound,
            short_msg: short_msg.into(),
            msg: msg.into(),
        }
    }

    /// An operational fault the service knows how to name (disk full, failed
    /// fsync, rotation conflict). Maps to 500 in HTTP.
    pub fn operational_internal_server_error(
        short_msg: impl Into<Cow<'static, str>>,
        msg: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            code: ErrorCode::OperationalInternalServerError,
            short_msg: short_msg.into(),
            msg: msg.into(),
        }
    }

    pub fn is_bad_request(&self) -> bool {
        self.code == ErrorCode::BadRequest
    }
}

/// Recover the `ErrorMetadata` classification from an `anyhow::Error`.
/// Untagged errors classify as an internal server error.
pub trait ErrorMetadataAnyhowExt {
    fn is_bad_request(&self) -> bool;
    fn short_msg(&self) -> &str;
    fn msg(&self) -> &str;
    fn http_status(&self) -> StatusCode;
}

impl ErrorMetadataAnyhowExt for anyhow::Error {
    fn is_bad_request(&self) -> bool {
        if let Some(e) = self.downcast_ref::<ErrorMetadata>() {
            return e.is_bad_request();
        }
        false
    }

    fn short_msg(&self) -> &str {
        if let Some(e) = self.downcast_ref::<ErrorMetadata>() {
            return &e.short_msg;
        }
        INTERNAL_SERVER_ERROR
    }

    fn msg(&self) -> &str {
        if let Some(e) = self.downcast_ref::<ErrorMetadata>() {
            return &e.msg;
        }
        INTERNAL_SERVER_ERROR_MSG
    }

    fn http_status(&self) -> StatusCode {
        if let Some(e) = self.downcast_ref::<ErrorMetadata>() {
            return e.code.http_status_code();
        }
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// Return `Result<(), MainError>` from `main` so exit errors print their
/// `Display` chain instead of the noisier `Debug` form.
pub struct MainError(anyhow::Error);

impl<T: Into<anyhow::Error>> From<T> for MainError {
    fn from(e: T) -> Self {
        let err: anyhow::Error = e.into();
        tracing::error!("Fatal error: {err:#}");
        Self(err)
    }
}

impl std::fmt::Debug for MainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
