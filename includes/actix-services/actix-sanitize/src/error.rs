//! Error and Result module

use actix_web::{ResponseError, http::StatusCode};
use derive_more::{Display, Error, From};

/// Errors which occur when rewriting a request with sanitized content
#[derive(Debug, Display, From, Error)]
#[non_exhaustive]
pub enum Error {
    #[display("Failed to re-encode sanitized query-string")]
    Query(serde_urlencoded::ser::Error),

    #[display("Sanitized query produced an invalid uri")]
    InvalidUri(actix_http::uri::InvalidUri),

    #[display("Failed to rebuild request uri")]
    InvalidUriParts(actix_http::uri::InvalidUriParts),

    #[display("Request body exceeds the {limit} byte limit")]
    #[from(skip)]
    BodyLimitExceeded { limit: usize },

    #[display("Failed to read request body")]
    Payload(actix_web::error::PayloadError),

    #[display("Failed to re-encode sanitized json body")]
    Json(serde_json::Error),
}

impl ResponseError for Error {
    /// Returns `413 Payload Too Large` for oversized bodies
    /// and `500 Internal Server Error` otherwise.
    fn status_code(&self) -> StatusCode {
        match self {
            Self::BodyLimitExceeded { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
