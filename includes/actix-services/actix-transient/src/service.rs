use std::{ops::Deref, rc::Rc};

use actix_web::{
    body::BoxBody,
    dev::{Service, ServiceRequest, ServiceResponse, forward_ready},
    error::Error as ActixError,
};
use futures_core::future::LocalBoxFuture;
use regex::Regex;

use crate::cookie::rewrite_headers;

/// Assembled transient cookie service
#[derive(Clone)]
pub struct TransientService<S>(pub(crate) Rc<TransientInner<S>>);

impl<S> Deref for TransientService<S> {
    type Target = TransientInner<S>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

pub struct TransientInner<S> {
    pub(crate) service: Rc<S>,
    pub(crate) patterns: Vec<Regex>,
}

impl<S> Service<ServiceRequest> for TransientService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = ActixError> + 'static,
    S::Future: 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let this = Rc::clone(&self.0);
        Box::pin(async move {
            let mut res = this.service.call(req).await?;
            // headers are final once the response leaves this service
            rewrite_headers(res.headers_mut(), &this.patterns);
            Ok(res)
        })
    }
}
