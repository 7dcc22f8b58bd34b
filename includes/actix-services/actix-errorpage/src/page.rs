//! Error page templates and rendering

use std::{collections::BTreeMap, fmt, fs, path::Path, str::FromStr};

use actix_web::{http::header::HeaderValue, mime};
use minijinja::{Environment, context};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::Error;

const LAYOUT: &str = "layout.html";
const ERROR_500: &str = "500.html";

const ASSETS_VERSION_FALLBACK: &str = "none";
const PAGE_TITLE: &str = "Error";

static BUNDLED: Lazy<ErrorPages> = Lazy::new(|| {
    ErrorPages::from_sources(
        include_str!("../templates/layout.html"),
        include_str!("../templates/500.html"),
    )
    .expect("bundled error templates must compile")
});

/// Supported error page kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum PageType {
    /// `500 Internal Server Error`
    InternalServerError,
}

impl PageType {
    /// Every page type with a bundled template.
    pub const ALL: &'static [PageType] = &[PageType::InternalServerError];

    /// Stringwise identifier used when parsing page types.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InternalServerError => "500",
        }
    }

    #[inline]
    fn template(&self) -> &'static str {
        match self {
            Self::InternalServerError => ERROR_500,
        }
    }

    /// Parse any displayable value by its string form,
    /// so `500` and `"500"` select the same page.
    pub fn parse<T: fmt::Display + ?Sized>(value: &T) -> Result<Self, Error> {
        value.to_string().parse()
    }

    fn available() -> String {
        Self::ALL
            .iter()
            .map(PageType::code)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for PageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for PageType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|page| page.code() == s)
            .copied()
            .ok_or_else(|| Error::UnsupportedPageType {
                page_type: s.to_owned(),
                available: Self::available(),
            })
    }
}

/// Links exposed to the error templates.
///
/// `assetsVersion` is used for cache-busting asset links and
/// falls back to `"none"` when a page is rendered without one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Urls {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assets_version: Option<String>,
    #[serde(flatten)]
    pub links: BTreeMap<String, String>,
}

impl Urls {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a named link such as `help` or `assets`.
    pub fn link<N: Into<String>, U: Into<String>>(mut self, name: N, url: U) -> Self {
        self.links.insert(name.into(), url.into());
        self
    }

    /// Assign the assets version used for cache-busting.
    pub fn assets_version<V: Into<String>>(mut self, version: V) -> Self {
        self.assets_version = Some(version.into());
        self
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.links.get(name).map(String::as_str)
    }

    fn default_assets_version(&mut self) {
        if self.assets_version.as_deref().is_none_or(str::is_empty) {
            self.assets_version = Some(ASSETS_VERSION_FALLBACK.to_owned());
        }
    }
}

/// Error information exposed to templates when details are enabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorDetails {
    pub status: u16,
    pub message: String,
    pub debug: String,
}

impl From<&actix_web::Error> for ErrorDetails {
    fn from(err: &actix_web::Error) -> Self {
        Self {
            status: err.as_response_error().status_code().as_u16(),
            message: err.to_string(),
            debug: format!("{err:?}"),
        }
    }
}

/// Rendered page content and its content type.
///
/// `content_type` is either a short name (`html`, `text`, `json`)
/// or a complete mime type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    pub content_type: String,
    pub content: String,
}

impl RenderedPage {
    pub fn new<T: Into<String>, C: Into<String>>(content_type: T, content: C) -> Self {
        Self {
            content_type: content_type.into(),
            content: content.into(),
        }
    }

    /// Resolve [`RenderedPage::content_type`] into a mime type.
    pub fn mime(&self) -> Option<mime::Mime> {
        match self.content_type.to_ascii_lowercase().as_str() {
            "" => None,
            "html" => Some(mime::TEXT_HTML_UTF_8),
            "text" | "txt" => Some(mime::TEXT_PLAIN_UTF_8),
            "json" => Some(mime::APPLICATION_JSON),
            other => other.parse().ok(),
        }
    }

    /// Resolve [`RenderedPage::content_type`] into a `Content-Type` header value.
    pub fn header_value(&self) -> Option<HeaderValue> {
        self.mime()
            .and_then(|mime| HeaderValue::from_str(mime.as_ref()).ok())
    }
}

/// Compiled set of error page templates.
///
/// The page template is rendered first with `{details, urls}` and the
/// result is wrapped into the layout template with `{title, body, urls}`.
pub struct ErrorPages {
    env: Environment<'static>,
}

impl ErrorPages {
    /// Templates bundled with the crate, compiled once on first use.
    #[inline]
    pub fn bundled() -> &'static ErrorPages {
        &BUNDLED
    }

    /// Compile the layout and `500` templates from source.
    pub fn from_sources<L, P>(layout: L, error_500: P) -> Result<Self, Error>
    where
        L: Into<String>,
        P: Into<String>,
    {
        let mut env = Environment::new();
        env.add_template_owned(LAYOUT, layout.into())?;
        env.add_template_owned(ERROR_500, error_500.into())?;
        Ok(Self { env })
    }

    /// Compile `layout.html` and `500.html` from a template directory.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self, Error> {
        let dir = dir.as_ref();
        let read = |name: &str| {
            let path = dir.join(name);
            fs::read_to_string(&path)
                .inspect_err(|err| tracing::error!("failed to read template {path:?}: {err}"))
        };
        Self::from_sources(read(LAYOUT)?, read(ERROR_500)?)
    }

    /// Render a page of the requested type.
    ///
    /// `urls` is updated in place with the `assetsVersion` fallback.
    pub fn render_page<T: fmt::Display + ?Sized>(
        &self,
        page_type: &T,
        details: Option<&ErrorDetails>,
        mut urls: Option<&mut Urls>,
    ) -> Result<RenderedPage, Error> {
        let page = PageType::parse(page_type)?;
        if let Some(urls) = urls.as_deref_mut() {
            urls.default_assets_version();
        }
        let urls = urls.as_deref();

        let body = self
            .env
            .get_template(page.template())?
            .render(context! { details => details, urls => urls })?;
        let content = self.env.get_template(LAYOUT)?.render(context! {
            title => PAGE_TITLE,
            body => body,
            urls => urls,
        })?;
        tracing::trace!("rendered {page} error page");
        Ok(RenderedPage::new("html", content))
    }
}

/// Render a page of the requested type with the bundled templates.
///
/// # Example
///
/// ```
/// use actix_errorpage::{Urls, render_page};
///
/// let mut urls = Urls::new().link("help", "https://help.example.com");
/// let page = render_page("500", None, Some(&mut urls)).unwrap();
/// assert_eq!(page.content_type, "html");
/// assert_eq!(urls.assets_version.as_deref(), Some("none"));
///
/// assert!(render_page(&404, None, None).is_err());
/// ```
#[inline]
pub fn render_page<T: fmt::Display + ?Sized>(
    page_type: &T,
    details: Option<&ErrorDetails>,
    urls: Option<&mut Urls>,
) -> Result<RenderedPage, Error> {
    ErrorPages::bundled().render_page(page_type, details, urls)
}
