use std::future::{Ready, ready};
use std::rc::Rc;

use actix_web::{
    Error,
    body::BoxBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
};

use crate::sanitizer::{LeafSanitizer, MarkupSanitizer};
use crate::service::{SanitizeInner, SanitizeService};

/// Default maximum size of a buffered request body (2MiB), the same
/// as the `web::Json` extractor limit.
pub const DEFAULT_BODY_LIMIT: usize = 2 * 1024 * 1024;

/// [`Sanitizer`] configuration.
///
/// Every setter overrides a single option, anything left alone keeps
/// its default.
#[derive(Clone)]
pub struct SanitizeOptions {
    pub(crate) sanitizer: Rc<dyn LeafSanitizer>,
    pub(crate) sanitize_query: bool,
    pub(crate) sanitize_body: bool,
    pub(crate) body_limit: usize,
}

impl SanitizeOptions {
    /// Markup sanitization of both query and body.
    #[inline]
    pub fn new() -> Self {
        Self {
            sanitizer: Rc::new(MarkupSanitizer::new()),
            sanitize_query: true,
            sanitize_body: true,
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }

    /// Replace the [`LeafSanitizer`] applied to every top-level key.
    pub fn sanitizer<L: LeafSanitizer + 'static>(mut self, sanitizer: L) -> Self {
        self.sanitizer = Rc::new(sanitizer);
        self
    }

    /// Enable or disable query-string sanitization.
    pub fn sanitize_query(mut self, enabled: bool) -> Self {
        self.sanitize_query = enabled;
        self
    }

    /// Enable or disable request body sanitization.
    pub fn sanitize_body(mut self, enabled: bool) -> Self {
        self.sanitize_body = enabled;
        self
    }

    /// Maximum number of body bytes buffered for sanitization.
    pub fn body_limit(mut self, limit: usize) -> Self {
        self.body_limit = limit;
        self
    }
}

impl Default for SanitizeOptions {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

/// Http Request Sanitizer
///
/// Rewrites the query-string and json or url-encoded bodies of incoming
/// requests, passing every top-level value through a [`LeafSanitizer`]
/// before other services get to see them.
///
/// # Example
///
/// ```
/// use actix_web::{App, web};
/// use actix_sanitize::{SanitizeOptions, Sanitizer};
///
/// async fn index(query: web::Query<Vec<(String, String)>>) -> String {
///     format!("{:?}", query.into_inner())
/// }
///
/// let app = App::new()
///     .wrap(Sanitizer::with_options(SanitizeOptions::new().sanitize_body(false)))
///     .route("/", web::get().to(index));
/// ```
pub struct Sanitizer {
    options: SanitizeOptions,
}

impl Sanitizer {
    /// Creates a new `Sanitizer` middleware instance using default options.
    #[inline]
    pub fn new() -> Self {
        Self::with_options(SanitizeOptions::default())
    }

    /// Creates a new `Sanitizer` middleware instance using the given options.
    #[inline]
    pub fn with_options(options: SanitizeOptions) -> Self {
        Self { options }
    }
}

impl Default for Sanitizer {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl From<SanitizeOptions> for Sanitizer {
    #[inline]
    fn from(options: SanitizeOptions) -> Self {
        Self::with_options(options)
    }
}

impl<S> Transform<S, ServiceRequest> for Sanitizer
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error> + 'static,
    S::Future: 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type InitError = ();
    type Transform = SanitizeService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SanitizeService(Rc::new(SanitizeInner {
            service: Rc::new(service),
            options: self.options.clone(),
        }))))
    }
}
