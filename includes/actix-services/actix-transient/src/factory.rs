use std::future::{Ready, ready};
use std::rc::Rc;

use actix_service::{IntoServiceFactory, ServiceFactory, ServiceFactoryExt, boxed};
use actix_web::{
    Error,
    body::BoxBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
};
use regex::Regex;

use crate::error::Error as PatternError;
use crate::service::{TransientInner, TransientService};

/// Transient cookie middleware
///
/// Removes the `Expires` and `Max-Age` attributes of every `Set-Cookie`
/// header whose cookie name matches one of the configured patterns,
/// so the client discards the cookie when its session ends.
///
/// # Example
///
/// ```
/// use actix_web::{App, HttpResponse, web};
/// use actix_transient::TransientCookies;
///
/// async fn login() -> HttpResponse {
///     HttpResponse::Ok()
///         .insert_header(("Set-Cookie", "session.sig=abc; Max-Age=3600"))
///         .finish()
/// }
///
/// let cookies = TransientCookies::new([r"\.sig$"]).unwrap();
/// let app = App::new()
///     .wrap(cookies)
///     .route("/login", web::post().to(login));
/// ```
#[derive(Clone, Default)]
pub struct TransientCookies {
    patterns: Vec<Regex>,
}

impl TransientCookies {
    /// Compile a new `TransientCookies` instance from cookie name patterns.
    pub fn new<I, S>(patterns: I) -> Result<Self, PatternError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|pattern| Regex::new(pattern.as_ref()))
            .collect::<Result<Vec<_>, _>>()
            .inspect_err(|err| tracing::error!("invalid cookie pattern: {err}"))?;
        Ok(Self { patterns })
    }

    /// Add another compiled cookie name pattern.
    pub fn pattern(mut self, pattern: Regex) -> Self {
        self.patterns.push(pattern);
        self
    }

    /// Configured cookie name patterns.
    #[inline]
    pub fn patterns(&self) -> &[Regex] {
        &self.patterns
    }
}

impl<S> Transform<S, ServiceRequest> for TransientCookies
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error> + 'static,
    S::Future: 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type InitError = ();
    type Transform = TransientService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(TransientService(Rc::new(TransientInner {
            service: Rc::new(service),
            patterns: self.patterns.clone(),
        }))))
    }
}

/// Apply [`TransientCookies`] to a single handler service.
///
/// The middleware is in place before the handler is first called,
/// so every cookie the handler sets is rewritten.
///
/// # Example
///
/// ```
/// use actix_web::{App, HttpResponse, web};
/// use actix_transient::{TransientCookies, transient};
///
/// async fn login() -> HttpResponse {
///     HttpResponse::Ok()
///         .insert_header(("Set-Cookie", "session.sig=abc; Max-Age=3600"))
///         .finish()
/// }
///
/// let cookies = TransientCookies::new([r"\.sig$"]).unwrap();
/// let app = App::new()
///     .service(web::service("/login").finish(transient(cookies, web::post().to(login))));
/// ```
pub fn transient<F, U>(
    cookies: TransientCookies,
    handler: F,
) -> impl ServiceFactory<
    ServiceRequest,
    Config = (),
    Response = ServiceResponse,
    Error = Error,
    InitError = (),
>
where
    F: IntoServiceFactory<U, ServiceRequest>,
    U: ServiceFactory<ServiceRequest, Config = (), Response = ServiceResponse, Error = Error>
        + 'static,
{
    let handler = boxed::factory(handler.into_factory().map_init_err(|_| ()));
    actix_service::apply(cookies, handler)
}
