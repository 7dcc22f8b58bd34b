//! Centralized error handling for Actix-Web.
//!
//! Every error raised by the wrapped services is logged once and
//! answered with a `500 Internal Server Error` page rendered from
//! bundled (or custom) templates.
//!
//! # Example
//!
//! ```
//! use actix_web::{App, HttpResponse, dev::ServiceRequest, error, web};
//! use actix_errorpage::{ErrorHandler, ErrorPageRenderer, Urls, async_wrapper};
//!
//! async fn fallback(req: ServiceRequest) -> Result<actix_web::dev::ServiceResponse, error::Error> {
//!     Err(error::ErrorInternalServerError(format!("nothing at {}", req.path())))
//! }
//!
//! let urls = Urls::new()
//!     .link("assets", "https://cdn.example.com")
//!     .assets_version("1.0.0");
//!
//! let app = App::new()
//!     .wrap(ErrorHandler::new().renderer(ErrorPageRenderer::new(urls, false)))
//!     .route("/", web::get().to(|| async { HttpResponse::Ok().finish() }))
//!     .default_service(async_wrapper(fallback));
//! ```

mod error;
mod factory;
pub mod log;
pub mod page;
pub mod renderer;
mod service;
mod wrapper;

pub use error::Error;
pub use factory::ErrorHandler;
pub use log::{ErrorLog, LogEntry, TracingLog};
pub use page::{ErrorDetails, ErrorPages, PageType, RenderedPage, Urls, render_page};
pub use renderer::{ErrorPageRenderer, RenderErrorPage};
pub use service::{ErrorBody, ErrorHandlerService};
pub use wrapper::async_wrapper;
