//! Error and Result module

use actix_web::ResponseError;
use derive_more::{Display, Error, From};

/// Errors which occur when rendering error pages or running wrapped actions
#[derive(Debug, Display, From, Error)]
#[non_exhaustive]
pub enum Error {
    #[display("Invalid page type {page_type}. Available types are {available}")]
    #[from(skip)]
    UnsupportedPageType { page_type: String, available: String },

    #[display("Failed to read error page template")]
    Io(std::io::Error),

    #[display("Failed to compile or render error page template")]
    Template(minijinja::Error),

    #[display("Wrapped action panicked: {_0}")]
    #[from(skip)]
    ActionPanicked(#[error(not(source))] String),
}

impl ResponseError for Error {
    /// Returns `500 Internal Server Error`.
    fn status_code(&self) -> actix_web::http::StatusCode {
        actix_web::http::StatusCode::INTERNAL_SERVER_ERROR
    }
}
