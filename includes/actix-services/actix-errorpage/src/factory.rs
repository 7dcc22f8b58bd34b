use std::future::{Ready, ready};
use std::rc::Rc;

use actix_web::{
    Error,
    body::{BoxBody, MessageBody},
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
};

use crate::log::{ErrorLog, TracingLog};
use crate::renderer::RenderErrorPage;
use crate::service::{ErrorHandlerInner, ErrorHandlerService};

/// Centralized error handling middleware
///
/// Captures every error produced by the wrapped services, logs it and
/// replaces the response with a `500 Internal Server Error` page.
/// Errors returned by the wrapped service (rather than attached to its
/// response) are passed on as an [`InternalError`](actix_web::error::InternalError)
/// already holding that page.
///
/// `ErrorHandler` must be registered with `App::wrap()` method, and
/// should be the last (outermost) middleware so it observes every error.
///
/// # Example
///
/// ```
/// use actix_web::{App, error, web};
/// use actix_errorpage::{ErrorHandler, ErrorPageRenderer, Urls};
///
/// async fn broken() -> Result<&'static str, error::Error> {
///     Err(error::ErrorBadRequest("sensitive error message"))
/// }
///
/// let urls = Urls::new().link("help", "https://help.example.com");
/// let app = App::new()
///     .wrap(ErrorHandler::new().renderer(ErrorPageRenderer::new(urls, false)))
///     .route("/broken", web::get().to(broken));
/// ```
pub struct ErrorHandler {
    logger: Rc<dyn ErrorLog>,
    renderer: Option<Rc<dyn RenderErrorPage>>,
}

impl ErrorHandler {
    /// Creates a new `ErrorHandler` logging through `tracing`
    /// and responding without a body.
    #[inline]
    pub fn new() -> Self {
        Self {
            logger: Rc::new(TracingLog),
            renderer: None,
        }
    }

    /// Replace the [`ErrorLog`] errors are reported to.
    pub fn logger<L: ErrorLog + 'static>(mut self, logger: L) -> Self {
        self.logger = Rc::new(logger);
        self
    }

    /// Assign a [`RenderErrorPage`] used to build error response bodies.
    pub fn renderer<R: RenderErrorPage + 'static>(mut self, renderer: R) -> Self {
        self.renderer = Some(Rc::new(renderer));
        self
    }
}

impl Default for ErrorHandler {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<S, B> Transform<S, ServiceRequest> for ErrorHandler
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type InitError = ();
    type Transform = ErrorHandlerService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ErrorHandlerService(Rc::new(ErrorHandlerInner {
            service: Rc::new(service),
            logger: Rc::clone(&self.logger),
            renderer: self.renderer.clone(),
        }))))
    }
}
