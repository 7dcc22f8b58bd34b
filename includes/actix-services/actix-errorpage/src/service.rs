use std::{
    error::Error as StdError,
    fmt,
    ops::Deref,
    pin::Pin,
    rc::Rc,
    task::{Context, Poll},
};

use actix_web::{
    HttpResponse,
    body::{BodySize, BoxBody, MessageBody},
    dev::{Service, ServiceRequest, ServiceResponse, forward_ready},
    error::{Error as ActixError, InternalError},
    http::{StatusCode, header},
    web::Bytes,
};
use futures_core::future::LocalBoxFuture;
use pin_project::pin_project;

use crate::log::{ErrorLog, LogEntry};
use crate::page::RenderedPage;
use crate::renderer::RenderErrorPage;

/// Assembled error handling service
#[derive(Clone)]
pub struct ErrorHandlerService<S>(pub(crate) Rc<ErrorHandlerInner<S>>);

impl<S> Deref for ErrorHandlerService<S> {
    type Target = ErrorHandlerInner<S>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

pub struct ErrorHandlerInner<S> {
    pub(crate) service: Rc<S>,
    pub(crate) logger: Rc<dyn ErrorLog>,
    pub(crate) renderer: Option<Rc<dyn RenderErrorPage>>,
}

impl<S> ErrorHandlerInner<S> {
    #[inline]
    fn report<E: fmt::Display + fmt::Debug>(&self, target: &Target, err: &E) {
        self.logger
            .error(&LogEntry::new(&target.method, &target.url, err));
    }

    fn error_page(&self, err: &ActixError) -> Option<RenderedPage> {
        self.renderer
            .as_ref()?
            .render(err)
            .inspect_err(|err| tracing::error!("failed to render error page: {err}"))
            .ok()
    }
}

impl<S, B> Service<ServiceRequest> for ErrorHandlerService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let this = Rc::clone(&self.0);
        let target = Target::from(&req);
        Box::pin(async move {
            let res = match this.service.call(req).await {
                Ok(res) => res,
                Err(err) => {
                    this.report(&target, &err);
                    let page = this.error_page(&err);
                    let res = error_response(
                        HttpResponse::new(StatusCode::INTERNAL_SERVER_ERROR),
                        page,
                    );
                    // the request went down with the inner service, so the
                    // page is carried by the error itself
                    return Err(InternalError::from_response(err, res).into());
                }
            };

            let handled = res.response().error().map(|err| {
                this.report(&target, err);
                this.error_page(err)
            });
            let Some(page) = handled else {
                // headers are committed from here on, so any later error
                // can only be reported and passed along with the body
                let report = Report {
                    logger: Rc::clone(&this.logger),
                    target,
                };
                return Ok(res
                    .map_body(|_, body| ErrorBody::new(body, report))
                    .map_into_boxed_body());
            };

            let (http_req, http_res) = res.into_parts();
            Ok(ServiceResponse::new(http_req, error_response(http_res, page)))
        })
    }
}

/// Request identity used in error log records.
struct Target {
    method: String,
    url: String,
}

impl From<&ServiceRequest> for Target {
    fn from(req: &ServiceRequest) -> Self {
        Self {
            method: req.method().to_string(),
            url: req.uri().to_string(),
        }
    }
}

/// Replace status and body of an errored response with the rendered page.
fn error_response<B>(res: HttpResponse<B>, page: Option<RenderedPage>) -> HttpResponse {
    let content_type = page.as_ref().and_then(RenderedPage::header_value);
    let content = page.map(|page| page.content).unwrap_or_default();

    let mut res = res.set_body(BoxBody::new(content));
    *res.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;

    let headers = res.headers_mut();
    headers.remove(header::CONTENT_TYPE);
    headers.remove(header::CONTENT_LENGTH);
    if let Some(content_type) = content_type {
        headers.insert(header::CONTENT_TYPE, content_type);
    }
    res
}

struct Report {
    logger: Rc<dyn ErrorLog>,
    target: Target,
}

/// Response body wrapper reporting errors raised after headers were sent.
///
/// The first body error is logged once and then forwarded unchanged.
#[pin_project]
pub struct ErrorBody<B> {
    #[pin]
    body: B,
    report: Option<Report>,
}

impl<B> ErrorBody<B> {
    fn new(body: B, report: Report) -> Self {
        Self {
            body,
            report: Some(report),
        }
    }
}

impl<B: MessageBody> MessageBody for ErrorBody<B> {
    type Error = Box<dyn StdError>;

    #[inline]
    fn size(&self) -> BodySize {
        self.body.size()
    }

    fn poll_next(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Bytes, Self::Error>>> {
        let this = self.project();
        match this.body.poll_next(cx) {
            Poll::Ready(Some(Ok(chunk))) => Poll::Ready(Some(Ok(chunk))),
            Poll::Ready(Some(Err(err))) => {
                let err: Box<dyn StdError> = err.into();
                if let Some(report) = this.report.take() {
                    let Target { method, url } = &report.target;
                    report.logger.error(&LogEntry::new(method, url, &err));
                }
                Poll::Ready(Some(Err(err)))
            }
            Poll::Ready(None) => Poll::Ready(None),
            Poll::Pending => Poll::Pending,
        }
    }

    fn try_into_bytes(self) -> Result<Bytes, Self> {
        let Self { body, report } = self;
        body.try_into_bytes().map_err(|body| Self { body, report })
    }
}
