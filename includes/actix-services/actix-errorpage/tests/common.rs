use std::{cell::RefCell, rc::Rc, sync::Once};

use actix_errorpage::{ErrorLog, LogEntry};
use actix_web::{
    Error, HttpResponse,
    body::{self, BoxBody},
    dev::{Service, ServiceResponse},
};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

static START: Once = Once::new();

/// Setup function that is only run once, even if called multiple times.
pub fn setup() {
    START.call_once(|| {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .expect("setting default subscriber failed");
    });
}

/// Convert `ServiceResponse` into body content string
#[allow(dead_code)]
pub async fn get_body(res: ServiceResponse<BoxBody>) -> String {
    let content = res.into_body();
    let data = body::to_bytes(content).await.expect("missing body");
    std::str::from_utf8(&data)
        .expect("invalid body")
        .to_string()
}

/// Call the service and resolve errors into the response they carry
#[allow(dead_code)]
pub async fn respond<S, R>(srv: &S, req: R) -> HttpResponse
where
    S: Service<R, Response = ServiceResponse<BoxBody>, Error = Error>,
{
    match srv.call(req).await {
        Ok(res) => res.into_parts().1,
        Err(err) => err.error_response(),
    }
}

/// Convert `HttpResponse` into body content string
#[allow(dead_code)]
pub async fn read_body(res: HttpResponse) -> String {
    let data = body::to_bytes(res.into_body()).await.expect("missing body");
    std::str::from_utf8(&data)
        .expect("invalid body")
        .to_string()
}

/// `ErrorLog` keeping every message for later inspection
#[derive(Clone, Default)]
#[allow(dead_code)]
pub struct Recorder(Rc<RefCell<Vec<String>>>);

#[allow(dead_code)]
impl Recorder {
    pub fn messages(&self) -> Vec<String> {
        self.0.borrow().clone()
    }
}

impl ErrorLog for Recorder {
    fn error(&self, entry: &LogEntry<'_>) {
        self.0.borrow_mut().push(entry.message.clone());
    }
}
