//! HTTP exception value objects and the default filter.
//!
//! An [`HttpException`] carries a status code and a response body that is
//! either a bare message string or the structured
//! `{ statusCode, message, error }` object. Handlers return them as errors;
//! the [`HttpExceptionFilter`] (or a custom [`ExceptionFilter`]) turns them
//! into responses.

use std::error::Error;
use std::fmt;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;

use crate::exception::ExceptionFilter;

/// Response body of an [`HttpException`].
#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum HttpExceptionBody {
    /// A bare message, serialized as a JSON string.
    Message(String),
    /// The structured shape most constructors produce.
    Object {
        #[serde(rename = "statusCode")]
        status_code: u16,
        message: String,
        error: String,
    },
}

/// An HTTP error as a value: status code plus response body.
#[derive(Clone, Debug)]
pub struct HttpException {
    status: StatusCode,
    body: HttpExceptionBody,
}

macro_rules! stock_exception {
    ($(#[$doc:meta])* $name:ident, $status:expr) => {
        $(#[$doc])*
        pub fn $name(message: impl Into<String>) -> Self {
            Self::with_error($status, message, canonical_reason($status))
        }
    };
}

impl HttpException {
    /// Exception with a bare message body.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: HttpExceptionBody::Message(message.into()),
        }
    }

    /// Exception with the structured `{ statusCode, message, error }` body.
    pub fn with_error(
        status: StatusCode,
        message: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            status,
            body: HttpExceptionBody::Object {
                status_code: status.as_u16(),
                message: message.into(),
                error: error.into(),
            },
        }
    }

    stock_exception!(bad_request, StatusCode::BAD_REQUEST);
    stock_exception!(unauthorized, StatusCode::UNAUTHORIZED);
    stock_exception!(forbidden, StatusCode::FORBIDDEN);
    stock_exception!(not_found, StatusCode::NOT_FOUND);
    stock_exception!(method_not_allowed, StatusCode::METHOD_NOT_ALLOWED);
    stock_exception!(not_acceptable, StatusCode::NOT_ACCEPTABLE);
    stock_exception!(request_timeout, StatusCode::REQUEST_TIMEOUT);
    stock_exception!(conflict, StatusCode::CONFLICT);
    stock_exception!(gone, StatusCode::GONE);
    stock_exception!(payload_too_large, StatusCode::PAYLOAD_TOO_LARGE);
    stock_exception!(unprocessable_entity, StatusCode::UNPROCESSABLE_ENTITY);
    stock_exception!(internal_server_error, StatusCode::INTERNAL_SERVER_ERROR);
    stock_exception!(not_implemented, StatusCode::NOT_IMPLEMENTED);
    stock_exception!(bad_gateway, StatusCode::BAD_GATEWAY);
    stock_exception!(service_unavailable, StatusCode::SERVICE_UNAVAILABLE);
    stock_exception!(gateway_timeout, StatusCode::GATEWAY_TIMEOUT);

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &HttpExceptionBody {
        &self.body
    }
}

fn canonical_reason(status: StatusCode) -> String {
    status
        .canonical_reason()
        .unwrap_or("Unknown Error")
        .to_string()
}

impl fmt::Display for HttpException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.body {
            HttpExceptionBody::Message(message) => write!(f, "{}: {message}", self.status),
            HttpExceptionBody::Object { message, .. } => write!(f, "{}: {message}", self.status),
        }
    }
}

impl Error for HttpException {}

impl IntoResponse for HttpException {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Default exception filter.
///
/// [`HttpException`]s are rendered as declared; anything else becomes a
/// timestamped 500 so no error escapes without a response.
#[derive(Default)]
pub struct HttpExceptionFilter;

impl ExceptionFilter for HttpExceptionFilter {
    fn catch(&self, error: Box<dyn Error + Send + Sync>) -> Response {
        if let Some(exception) = error.downcast_ref::<HttpException>() {
            return exception.clone().into_response();
        }

        tracing::error!(%error, "unhandled exception");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "statusCode": StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
                "message": "Internal Server Error",
                "timestamp": chrono::Utc::now().to_rfc3339(),
            })),
        )
            .into_response()
    }
}
