//! Failure capture for request actions
use std::{
    any::Any,
    future::Future,
    panic::{self, AssertUnwindSafe},
    rc::Rc,
};

use actix_service::fn_service;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use futures_util::FutureExt;

use crate::error::Error;

/// Wrap a request action so every failure reaches the error pipeline.
///
/// Returned errors are forwarded as-is, while panics raised either
/// while building the future or while polling it are converted into
/// [`Error::ActionPanicked`]. The resulting service is usable anywhere
/// actix-web accepts a service factory.
///
/// # Example
///
/// ```
/// use actix_web::{App, HttpResponse, dev::ServiceRequest, error};
/// use actix_errorpage::{ErrorHandler, async_wrapper};
///
/// async fn action(req: ServiceRequest) -> Result<actix_web::dev::ServiceResponse, error::Error> {
///     if req.path() == "/fail" {
///         return Err(error::ErrorServiceUnavailable("backend offline"));
///     }
///     Ok(req.into_response(HttpResponse::Ok().finish()))
/// }
///
/// let app = App::new()
///     .wrap(ErrorHandler::new())
///     .default_service(async_wrapper(action));
/// ```
pub fn async_wrapper<F, Fut, E>(
    action: F,
) -> impl ServiceFactory<
    ServiceRequest,
    Config = (),
    Response = ServiceResponse,
    Error = actix_web::Error,
    InitError = (),
>
where
    F: Fn(ServiceRequest) -> Fut + 'static,
    Fut: Future<Output = Result<ServiceResponse, E>> + 'static,
    E: Into<actix_web::Error>,
{
    let action = Rc::new(action);
    fn_service(move |req: ServiceRequest| {
        let action = Rc::clone(&action);
        async move {
            let fut = panic::catch_unwind(AssertUnwindSafe(|| action(req))).map_err(panicked)?;
            match AssertUnwindSafe(fut).catch_unwind().await {
                Ok(res) => res.map_err(Into::into),
                Err(payload) => Err(panicked(payload).into()),
            }
        }
    })
}

fn panicked(payload: Box<dyn Any + Send>) -> Error {
    let message = payload
        .downcast_ref::<&str>()
        .map(|msg| msg.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_owned());
    tracing::debug!("captured panic: {message}");
    Error::ActionPanicked(message)
}
