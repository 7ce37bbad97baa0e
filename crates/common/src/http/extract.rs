use axum::{
    extract::{
        FromRequest,
        FromRequestParts,
        Request,
    },
    http::request::Parts,
    response::{
        IntoResponse,
        Response,
    },
};
use serde::{
    de::DeserializeOwned,
    Serialize,
};

use crate::{
    errors::ErrorMetadata,
    http::HttpResponseError,
};

/// Wrapper around `axum::extract::Query` that rejects with our
/// `HttpResponseError` shape (and therefore a 400) instead of axum's
/// `QueryRejection`, so malformed client input is logged and reported
/// uniformly.
pub struct Query<T>(pub T);

impl<S, T> FromRequestParts<S> for Query<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = HttpResponseError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let t = axum::extract::Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| {
                anyhow::anyhow!(ErrorMetadata::bad_request("BadQueryArgs", e.to_string()))
            })?;
        Ok(Self(t.0))
    }
}

/// Wrapper around `axum::Json` that rejects with our `HttpResponseError`
/// shape (a 400 for malformed bodies, where axum would answer 422 for
/// well-formed JSON of the wrong shape).
pub struct Json<T>(pub T);

impl<S, T> FromRequest<S> for Json<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = HttpResponseError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let t = axum::Json::<T>::from_request(req, state).await.map_err(|e| {
            anyhow::anyhow!(ErrorMetadata::bad_request("BadJsonBody", e.body_text()))
        })?;
        Ok(Self(t.0))
    }
}

impl<T> IntoResponse for Json<T>
where
    T: Serialize,
{
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}
