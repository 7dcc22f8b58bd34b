use std::sync::Arc;

use actix_errorpage::{ErrorHandler, ErrorPageRenderer, ErrorPages, async_wrapper};
use actix_sanitize::Sanitizer;
use actix_transient::{TransientCookies, transient};
use actix_web::{
    App, HttpRequest, HttpResponse, HttpServer,
    body::BoxBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    error::{self, Error},
    http::header,
    web,
};
use serde::Serialize;
use serde_json::Value;

use crate::core::configuration::{Configuration, SanitizeConfiguration};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_HOST: &str = "localhost";
const FAILURE_PATH: &str = "/fail";
const SESSION_MAX_AGE: u32 = 60 * 60 * 24;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub struct HttpAdapter<'a> {
    configuration: &'a Configuration,
}

impl<'a> HttpAdapter<'a> {
    pub fn new(configuration: &'a Configuration) -> Self {
        Self { configuration }
    }

    pub async fn run(&self) -> Result<(), std::io::Error> {
        let host = self
            .configuration
            .network
            .as_ref()
            .and_then(|f| f.host.clone())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = self
            .configuration
            .network
            .as_ref()
            .and_then(|f| f.port)
            .unwrap_or(DEFAULT_PORT);

        let pipeline = Pipeline::new(self.configuration).map_err(std::io::Error::other)?;

        tracing::info!("listening on {host}:{port}");
        HttpServer::new(move || application(&pipeline))
            .bind((host.as_str(), port))?
            .run()
            .await
    }
}

/// Thread-safe middleware settings, instantiated once per worker.
#[derive(Clone)]
pub struct Pipeline {
    renderer: ErrorPageRenderer,
    sanitize: SanitizeConfiguration,
    cookies: TransientCookies,
}

impl Pipeline {
    /// Validate and compile the middleware settings of a [`Configuration`].
    pub fn new(configuration: &Configuration) -> Result<Self, BoxError> {
        let pages = configuration.error_pages.clone().unwrap_or_default();
        let mut renderer =
            ErrorPageRenderer::new(pages.urls, pages.show_error_details.unwrap_or(false));
        if let Some(dir) = pages.templates.as_ref() {
            let templates = ErrorPages::from_dir(dir)
                .inspect_err(|err| tracing::error!("invalid error templates in {dir:?}: {err}"))?;
            renderer = renderer.pages(Arc::new(templates));
        }

        let patterns = configuration
            .cookies
            .as_ref()
            .map(|c| c.patterns())
            .unwrap_or_default();
        let cookies = TransientCookies::new(patterns)?;

        Ok(Self {
            renderer,
            sanitize: configuration.sanitize.clone().unwrap_or_default(),
            cookies,
        })
    }
}

/// Assemble the application: errors are handled outermost,
/// then input is sanitized before reaching any route.
pub fn application(
    pipeline: &Pipeline,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<BoxBody>,
        Error = Error,
        InitError = (),
    > + use<>,
> {
    App::new()
        .wrap(Sanitizer::with_options(pipeline.sanitize.options()))
        .wrap(ErrorHandler::new().renderer(pipeline.renderer.clone()))
        .route("/echo", web::get().to(echo))
        .route("/echo", web::post().to(echo))
        .route("/echo/{label}", web::get().to(echo))
        .route("/echo/{label}", web::post().to(echo))
        .service(
            web::service("/session")
                .finish(transient(pipeline.cookies.clone(), web::get().to(session))),
        )
        .default_service(async_wrapper(fallback))
}

#[derive(Debug, Serialize)]
struct Echo {
    label: Option<String>,
    query: Vec<(String, String)>,
    body: Option<Value>,
}

async fn echo(req: HttpRequest, body: Option<web::Json<Value>>) -> Result<HttpResponse, Error> {
    let query = web::Query::<Vec<(String, String)>>::from_query(req.query_string())?;
    Ok(HttpResponse::Ok().json(Echo {
        label: req.match_info().get("label").map(str::to_owned),
        query: query.into_inner(),
        body: body.map(web::Json::into_inner),
    }))
}

async fn session() -> HttpResponse {
    HttpResponse::Ok()
        .append_header((
            header::SET_COOKIE,
            format!("session=guest; Path=/; HttpOnly; Max-Age={SESSION_MAX_AGE}"),
        ))
        .append_header((
            header::SET_COOKIE,
            format!("session.sig=unsigned; Path=/; HttpOnly; Max-Age={SESSION_MAX_AGE}"),
        ))
        .append_header((
            header::SET_COOKIE,
            "theme=light; Path=/; Max-Age=31536000",
        ))
        .body("session started")
}

async fn fallback(req: ServiceRequest) -> Result<ServiceResponse, Error> {
    if req.path() == FAILURE_PATH {
        return Err(error::ErrorInternalServerError("requested failure"));
    }
    Ok(req.into_response(HttpResponse::NotFound().finish()))
}
