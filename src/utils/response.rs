use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Error body shared by every JSON endpoint: a human-readable `error` the
/// client can show as-is, plus a stable machine-readable `code`.
#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub error: String,
    pub code: String,
}

pub fn ok<T>(data: T) -> Response
where
    T: Serialize,
{
    (StatusCode::OK, Json(data)).into_response()
}

pub fn created<T>(data: T) -> Response
where
    T: Serialize,
{
    (StatusCode::CREATED, Json(data)).into_response()
}

pub fn error(code: &str, message: impl Into<String>, status: StatusCode) -> Response {
    let body = ApiErrorResponse {
        error: message.into(),
        code: code.to_string(),
    };

    (status, Json(body)).into_response()
}

/// Plain-text failure, used where the caller is a machine that only logs the
/// body (the payment processor's webhook delivery).
pub fn plain_error(message: impl Into<String>, status: StatusCode) -> Response {
    (status, message.into()).into_response()
}
