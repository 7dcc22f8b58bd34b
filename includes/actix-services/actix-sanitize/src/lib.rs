//! Actix-Web Middleware for sanitizing untrusted request input.
//!
//! Query parameters and json or url-encoded bodies are decoded,
//! every value is passed through a [`LeafSanitizer`] and the request
//! is rewritten before reaching the wrapped services. By default
//! unsafe markup is stripped from every string with [`ammonia`].
//!
//! # Example
//!
//! ```
//! use actix_web::{App, web};
//! use actix_sanitize::{SanitizeOptions, Sanitizer};
//! use serde_json::Value;
//!
//! async fn create(body: web::Json<Value>) -> web::Json<Value> {
//!     body
//! }
//!
//! let app = App::new()
//!     .wrap(Sanitizer::default())
//!     .service(web::resource("/items").route(web::post().to(create)));
//!
//! let rejecting = Sanitizer::with_options(SanitizeOptions::new().sanitizer(
//!     |_key: &str, value: Value| match value.as_str() {
//!         Some(text) if text.contains("<") => Err(actix_web::error::ErrorBadRequest("markup")),
//!         _ => Ok(value),
//!     },
//! ));
//! ```
mod error;
mod factory;
mod payload;
pub mod sanitizer;
mod service;

pub use error::Error;
pub use factory::{DEFAULT_BODY_LIMIT, SanitizeOptions, Sanitizer};
pub use sanitizer::{LeafSanitizer, MarkupSanitizer, sanitize, sanitize_map, sanitize_seq};
pub use service::SanitizeService;
