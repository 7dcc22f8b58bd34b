//! [`RenderErrorPage`] Implementation and Utilities
use std::sync::Arc;

use crate::{
    error::Error,
    page::{ErrorDetails, ErrorPages, PageType, RenderedPage, Urls},
};

/// Produces the page returned by [`ErrorHandler`](crate::ErrorHandler)
/// for a captured error.
pub trait RenderErrorPage {
    fn render(&self, err: &actix_web::Error) -> Result<RenderedPage, Error>;
}

impl<F> RenderErrorPage for F
where
    F: Fn(&actix_web::Error) -> Result<RenderedPage, Error>,
{
    #[inline]
    fn render(&self, err: &actix_web::Error) -> Result<RenderedPage, Error> {
        self(err)
    }
}

/// `500` page renderer bound to a fixed set of [`Urls`].
///
/// Error details are only passed to the templates when explicitly
/// enabled with `show_error_details`.
///
/// # Example
///
/// ```
/// use actix_web::error::ErrorBadGateway;
/// use actix_errorpage::{ErrorPageRenderer, RenderErrorPage, Urls};
///
/// let renderer = ErrorPageRenderer::new(Urls::new(), false);
/// let page = renderer.render(&ErrorBadGateway("upstream secret")).unwrap();
/// assert!(!page.content.contains("upstream secret"));
/// ```
#[derive(Clone)]
pub struct ErrorPageRenderer {
    urls: Option<Urls>,
    show_error_details: bool,
    pages: Option<Arc<ErrorPages>>,
}

impl ErrorPageRenderer {
    /// Creates a renderer using the bundled templates.
    #[inline]
    pub fn new<U: Into<Option<Urls>>>(urls: U, show_error_details: bool) -> Self {
        Self {
            urls: urls.into(),
            show_error_details,
            pages: None,
        }
    }

    /// Render with a custom template set instead of the bundled one.
    pub fn pages(mut self, pages: Arc<ErrorPages>) -> Self {
        self.pages = Some(pages);
        self
    }

    #[inline]
    fn templates(&self) -> &ErrorPages {
        self.pages.as_deref().unwrap_or_else(|| ErrorPages::bundled())
    }
}

impl RenderErrorPage for ErrorPageRenderer {
    fn render(&self, err: &actix_web::Error) -> Result<RenderedPage, Error> {
        let details = self.show_error_details.then(|| ErrorDetails::from(err));
        let mut urls = self.urls.clone();
        self.templates().render_page(
            &PageType::InternalServerError,
            details.as_ref(),
            urls.as_mut(),
        )
    }
}

#[cfg(test)]
mod tests {
    use actix_web::error::ErrorInternalServerError;

    use super::*;

    #[test]
    fn hides_details_by_default() {
        let renderer = ErrorPageRenderer::new(Urls::new(), false);
        let page = renderer
            .render(&ErrorInternalServerError("connection refused"))
            .unwrap();
        assert_eq!(page.content_type, "html");
        assert!(!page.content.contains("connection refused"));
    }

    #[test]
    fn shows_details_when_enabled() {
        let renderer = ErrorPageRenderer::new(Urls::new(), true);
        let page = renderer
            .render(&ErrorInternalServerError("connection refused"))
            .unwrap();
        assert!(page.content.contains("connection refused"));
    }

    #[test]
    fn bound_urls_are_not_mutated() {
        let renderer = ErrorPageRenderer::new(Urls::new().link("help", "/help"), false);
        renderer.render(&ErrorInternalServerError("x")).unwrap();
        assert_eq!(renderer.urls.as_ref().unwrap().assets_version, None);
    }

    #[test]
    fn custom_pages() {
        let pages = ErrorPages::from_sources("{{ body|safe }}", "custom").unwrap();
        let renderer = ErrorPageRenderer::new(Urls::new(), false).pages(Arc::new(pages));
        let page = renderer.render(&ErrorInternalServerError("x")).unwrap();
        assert_eq!(page.content, "custom");
    }
}
