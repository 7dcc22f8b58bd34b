use std::io;

use actix_errorpage::{ErrorHandler, ErrorPageRenderer, RenderedPage, Urls, async_wrapper};
use actix_web::{
    App, HttpResponse, body,
    dev::{ServiceRequest, ServiceResponse},
    error::{self, ErrorBadRequest},
    http::header,
    test::{self, TestRequest},
    web::{self, Bytes},
};
use futures_util::stream;

mod common;

async fn broken() -> Result<&'static str, error::Error> {
    Err(ErrorBadRequest("sensitive error message"))
}

async fn fine() -> &'static str {
    "all good"
}

async fn interrupted() -> HttpResponse {
    let chunks: Vec<Result<Bytes, io::Error>> = vec![
        Ok(Bytes::from_static(b"partial")),
        Err(io::Error::other("stream broke")),
    ];
    HttpResponse::Ok().streaming(stream::iter(chunks))
}

async fn fallback(req: ServiceRequest) -> Result<ServiceResponse, error::Error> {
    let path = req.path().to_owned();
    match path.as_str() {
        "/fail" => Err(error::ErrorServiceUnavailable("backend offline")),
        "/panic" => panic!("fallback exploded"),
        _ => Ok(req.into_response(HttpResponse::NotFound().finish())),
    }
}

async fn item(path: web::Path<u32>) -> Result<String, error::Error> {
    match path.into_inner() {
        0 => Err(ErrorBadRequest("no item zero")),
        id => Ok(format!("item {id}")),
    }
}

fn text_page(_: &error::Error) -> Result<RenderedPage, actix_errorpage::Error> {
    Ok(RenderedPage::new("text/plain", "Error content here"))
}

#[actix_web::test]
async fn logs_and_hides_error() {
    common::setup();
    let recorder = common::Recorder::default();

    let srv = test::init_service(
        App::new()
            .wrap(ErrorHandler::new().logger(recorder.clone()))
            .route("/x", web::get().to(broken)),
    )
    .await;

    let req = TestRequest::with_uri("/x").to_request();
    let res = test::call_service(&srv, req).await;
    assert_eq!(res.status().to_string(), "500 Internal Server Error");
    assert!(res.headers().get(header::CONTENT_TYPE).is_none());
    assert_eq!(common::get_body(res).await, "");
    assert_eq!(
        recorder.messages(),
        vec!["Error occurred processing GET /x: sensitive error message".to_owned()]
    );
}

#[actix_web::test]
async fn renders_custom_page() {
    common::setup();
    let recorder = common::Recorder::default();

    let srv = test::init_service(
        App::new()
            .wrap(
                ErrorHandler::new()
                    .logger(recorder.clone())
                    .renderer(text_page),
            )
            .route("/x", web::get().to(broken)),
    )
    .await;

    let req = TestRequest::with_uri("/x").to_request();
    let res = test::call_service(&srv, req).await;
    assert_eq!(res.status().to_string(), "500 Internal Server Error");
    assert_eq!(
        res.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/plain"
    );
    assert_eq!(common::get_body(res).await, "Error content here");
    assert_eq!(recorder.messages().len(), 1);
}

#[actix_web::test]
async fn renders_bundled_page() {
    common::setup();

    let urls = Urls::new().link("help", "https://help.example.com");
    let srv = test::init_service(
        App::new()
            .wrap(
                ErrorHandler::new()
                    .logger(common::Recorder::default())
                    .renderer(ErrorPageRenderer::new(urls, false)),
            )
            .route("/x", web::get().to(broken)),
    )
    .await;

    let req = TestRequest::with_uri("/x").to_request();
    let res = test::call_service(&srv, req).await;
    assert_eq!(res.status().to_string(), "500 Internal Server Error");
    assert_eq!(
        res.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/html; charset=utf-8"
    );

    let body = common::get_body(res).await;
    assert!(body.contains("Sorry, there is a problem with the service"));
    assert!(body.contains("help.example.com"));
    assert!(!body.contains("sensitive error message"));
}

#[actix_web::test]
async fn captures_pipeline_errors() {
    common::setup();
    let recorder = common::Recorder::default();

    let srv = test::init_service(
        App::new()
            .wrap(ErrorHandler::new().logger(recorder.clone()))
            .default_service(async_wrapper(fallback)),
    )
    .await;

    let req = TestRequest::with_uri("/fail?reason=1").to_request();
    let res = common::respond(&srv, req).await;
    assert_eq!(res.status().to_string(), "500 Internal Server Error");
    assert_eq!(common::read_body(res).await, "");

    let req = TestRequest::post().uri("/panic").to_request();
    let res = common::respond(&srv, req).await;
    assert_eq!(res.status().to_string(), "500 Internal Server Error");

    let req = TestRequest::with_uri("/missing").to_request();
    let res = common::respond(&srv, req).await;
    assert_eq!(res.status().to_string(), "404 Not Found");

    assert_eq!(
        recorder.messages(),
        vec![
            "Error occurred processing GET /fail?reason=1: backend offline".to_owned(),
            "Error occurred processing POST /panic: Wrapped action panicked: fallback exploded"
                .to_owned(),
        ]
    );
}

#[actix_web::test]
async fn reports_errors_after_headers_sent() {
    common::setup();
    let recorder = common::Recorder::default();

    let srv = test::init_service(
        App::new()
            .wrap(
                ErrorHandler::new()
                    .logger(recorder.clone())
                    .renderer(text_page),
            )
            .route("/stream", web::get().to(interrupted)),
    )
    .await;

    let req = TestRequest::with_uri("/stream").to_request();
    let res = test::call_service(&srv, req).await;
    assert_eq!(res.status().to_string(), "200 OK");
    assert!(recorder.messages().is_empty());

    assert!(body::to_bytes(res.into_body()).await.is_err());
    assert_eq!(
        recorder.messages(),
        vec!["Error occurred processing GET /stream: stream broke".to_owned()]
    );
}

#[actix_web::test]
async fn passes_successful_responses() {
    common::setup();
    let recorder = common::Recorder::default();

    let srv = test::init_service(
        App::new()
            .wrap(
                ErrorHandler::new()
                    .logger(recorder.clone())
                    .renderer(text_page),
            )
            .route("/", web::get().to(fine)),
    )
    .await;

    let req = TestRequest::with_uri("/").to_request();
    let res = test::call_service(&srv, req).await;
    assert_eq!(res.status().to_string(), "200 OK");
    assert_eq!(common::get_body(res).await, "all good");
    assert!(recorder.messages().is_empty());
}

#[actix_web::test]
async fn routes_with_path_parameters() {
    common::setup();
    let recorder = common::Recorder::default();

    let srv = test::init_service(
        App::new()
            .wrap(
                ErrorHandler::new()
                    .logger(recorder.clone())
                    .renderer(text_page),
            )
            .route("/items/{id}", web::get().to(item)),
    )
    .await;

    let req = TestRequest::with_uri("/items/7").to_request();
    let res = test::call_service(&srv, req).await;
    assert_eq!(res.status().to_string(), "200 OK");
    assert_eq!(common::get_body(res).await, "item 7");

    let req = TestRequest::with_uri("/items/0").to_request();
    let res = test::call_service(&srv, req).await;
    assert_eq!(res.status().to_string(), "500 Internal Server Error");
    assert_eq!(common::get_body(res).await, "Error content here");
    assert_eq!(
        recorder.messages(),
        vec!["Error occurred processing GET /items/0: no item zero".to_owned()]
    );
}

#[actix_web::test]
async fn renders_page_for_service_errors() {
    common::setup();

    let srv = test::init_service(
        App::new()
            .wrap(
                ErrorHandler::new()
                    .logger(common::Recorder::default())
                    .renderer(text_page),
            )
            .default_service(async_wrapper(fallback)),
    )
    .await;

    let req = TestRequest::with_uri("/fail").to_request();
    let res = common::respond(&srv, req).await;
    assert_eq!(res.status().to_string(), "500 Internal Server Error");
    assert_eq!(
        res.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/plain"
    );
    assert_eq!(common::read_body(res).await, "Error content here");
}
