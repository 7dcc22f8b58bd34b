//! Actix-Web middleware for issuing transient (session) cookies.
//!
//! Cookies whose name matches a configured pattern lose their
//! `Expires` and `Max-Age` attributes before the response headers are
//! sent. Cookies expiring at the epoch are deletions and are kept as-is.
//!
//! # Example
//!
//! ```
//! use actix_web::{App, HttpResponse, web};
//! use actix_transient::TransientCookies;
//!
//! async fn index() -> HttpResponse {
//!     HttpResponse::Ok()
//!         .append_header(("Set-Cookie", "_session.sig=xyz; Max-Age=3600"))
//!         .append_header(("Set-Cookie", "theme=dark; Max-Age=3600"))
//!         .finish()
//! }
//!
//! let app = App::new()
//!     .wrap(TransientCookies::new([r"\.sig$"]).unwrap())
//!     .route("/", web::get().to(index));
//! ```
mod cookie;
mod error;
mod factory;
mod service;

pub use cookie::{cookie_name, is_deletion, rewrite_cookie};
pub use error::Error;
pub use factory::{TransientCookies, transient};
pub use service::TransientService;
