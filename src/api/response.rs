//! JSON response envelopes and error → status mapping
//!
//! Success bodies carry `"status": "ok"` next to their payload; failures are
//! `{"status": "error", "error": {"code": <http status>, "message": ...}}`.

use crate::error::Error;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{Map, Value};

/// HTTP status for a crate error kind
pub fn status_for(err: &Error) -> StatusCode {
    match err {
        Error::Validation(_) => StatusCode::BAD_REQUEST,
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        Error::UnsupportedConversion(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        Error::Conversion(_) => StatusCode::UNPROCESSABLE_ENTITY,
        Error::Storage(_) | Error::Config(_) | Error::Io(_) | Error::Serialization(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// An error ready to be sent to the client
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

#[derive(Serialize)]
struct ApiErrorBody<'a> {
    status: &'static str,
    error: ApiErrorDetail<'a>,
}

#[derive(Serialize)]
struct ApiErrorDetail<'a> {
    code: u16,
    message: &'a str,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Unauthorized")
    }

    pub fn unsupported_media_type(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNSUPPORTED_MEDIA_TYPE, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        tracing::debug!(kind = err.kind_code(), "Mapping error to response");
        Self::new(status_for(&err), err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = self.status.as_u16(), message = %self.message, "Request failed");
        } else {
            tracing::warn!(status = self.status.as_u16(), message = %self.message, "Request rejected");
        }
        let body = ApiErrorBody {
            status: "error",
            error: ApiErrorDetail {
                code: self.status.as_u16(),
                message: &self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

/// `{"status": "ok", ...fields}`
pub fn ok(fields: Value) -> Json<Value> {
    let mut body = Map::new();
    body.insert("status".to_string(), Value::String("ok".to_string()));
    if let Value::Object(fields) = fields {
        body.extend(fields);
    }
    Json(Value::Object(body))
}
