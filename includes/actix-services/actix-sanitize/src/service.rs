use std::{ops::Deref, rc::Rc};

use actix_web::{
    body::BoxBody,
    dev::{Service, ServiceRequest, ServiceResponse, forward_ready},
    error::Error as ActixError,
};
use futures_core::future::LocalBoxFuture;

use crate::factory::SanitizeOptions;
use crate::payload;

/// Assembled request sanitization service
#[derive(Clone)]
pub struct SanitizeService<S>(pub(crate) Rc<SanitizeInner<S>>);

impl<S> Deref for SanitizeService<S> {
    type Target = SanitizeInner<S>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

pub struct SanitizeInner<S> {
    pub(crate) service: Rc<S>,
    pub(crate) options: SanitizeOptions,
}

impl<S> Service<ServiceRequest> for SanitizeService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = ActixError> + 'static,
    S::Future: 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        let this = Rc::clone(&self.0);
        Box::pin(async move {
            let options = &this.options;
            if options.sanitize_query {
                payload::sanitize_query(&mut req, options.sanitizer.as_ref())
                    .inspect_err(|err| tracing::debug!("query sanitization failed: {err}"))?;
            }
            if options.sanitize_body {
                payload::sanitize_body(&mut req, options.sanitizer.as_ref(), options.body_limit)
                    .await
                    .inspect_err(|err| tracing::debug!("body sanitization failed: {err}"))?;
            }
            this.service.call(req).await
        })
    }
}
