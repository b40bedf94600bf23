//! HTTP surface serving pages from the template tree.
//!
//! Two pages are served, both rendered from the loaded templates with the
//! site-wide context from `tplcheck.toml`:
//!
//! - `GET /terms/` - `zerver/terms.html`, with the custom terms markdown when
//!   `site.terms_of_service` is configured and the built-in text otherwise
//! - `GET /help/:article` - `zerver/help/main.html` around
//!   `zerver/help/<article>.md`
//!
//! Render failures are logged and answered with 500.

use anyhow::{Context, Result};
use axum::Router;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use serde_json::{Value, json};
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::SiteConfig;
use crate::templating::{RenderContext, TemplateRenderer};

const TERMS_TEMPLATE: &str = "zerver/terms.html";
const HELP_TEMPLATE: &str = "zerver/help/main.html";
const HELP_ARTICLE_DIR: &str = "zerver/help";

/// Shared state for the handlers.
#[derive(Debug)]
pub struct WebState {
    renderer: TemplateRenderer,
    site: SiteConfig,
    markdown_root: PathBuf,
}

impl WebState {
    pub fn new(renderer: TemplateRenderer, site: SiteConfig, markdown_root: impl Into<PathBuf>) -> Self {
        Self {
            renderer,
            site,
            markdown_root: markdown_root.into(),
        }
    }

    /// Values every page can use: `product_name`, `external_host`, `terms_of_service`.
    pub fn common_context(&self) -> RenderContext {
        let terms = self.site.terms_of_service.as_ref().map_or(Value::Null, |path| json!(path));
        RenderContext::new()
            .with("product_name", json!(self.site.product_name))
            .with("external_host", json!(self.site.external_host))
            .with("terms_of_service", terms)
    }

    fn render_page(&self, template: &str, context: &RenderContext) -> Response {
        match self.renderer.render(template, context) {
            Ok(html) => Html(html).into_response(),
            Err(e) => {
                tracing::error!("Exception while rendering '{}': {}", template, e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

/// Build the router.
pub fn router(state: Arc<WebState>) -> Router {
    Router::new()
        .route("/terms/", get(terms_handler))
        .route("/help/:article", get(help_handler))
        .with_state(state)
}

async fn terms_handler(State(state): State<Arc<WebState>>) -> Response {
    let context = state.common_context();
    state.render_page(TERMS_TEMPLATE, &context)
}

async fn help_handler(
    State(state): State<Arc<WebState>>,
    Path(article): Path<String>,
) -> Response {
    if !is_valid_article_name(&article) {
        return StatusCode::NOT_FOUND.into_response();
    }

    let relative = format!("{}/{}.md", HELP_ARTICLE_DIR, article);
    if !state.markdown_root.join(&relative).is_file() {
        tracing::debug!("Help article '{}' not found", article);
        return StatusCode::NOT_FOUND.into_response();
    }

    let context = state.common_context().with("article", json!(relative));
    state.render_page(HELP_TEMPLATE, &context)
}

fn is_valid_article_name(article: &str) -> bool {
    !article.is_empty()
        && article.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Serve the router on `addr` until the process is stopped.
pub async fn serve(state: Arc<WebState>, addr: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    let local = listener.local_addr().context("Failed to read bound address")?;
    tracing::info!("Serving templates on http://{}", local);

    axum::serve(listener, router(state)).await.context("HTTP server failed")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_article_names() {
        assert!(is_valid_article_name("index"));
        assert!(is_valid_article_name("message-formatting_2"));
        assert!(!is_valid_article_name(""));
        assert!(!is_valid_article_name("..%2Fsecret"));
        assert!(!is_valid_article_name("a.b"));
    }

    #[test]
    fn test_common_context() {
        let state = WebState::new(
            TemplateRenderer::from_tera(tera::Tera::default()),
            SiteConfig::default(),
            "templates",
        );
        let json = state.common_context().to_json().unwrap();
        assert_eq!(json["product_name"], "Zulip");
        assert_eq!(json["external_host"], "localhost:9991");
        assert!(json["terms_of_service"].is_null());
    }

    #[tokio::test]
    async fn test_terms_route() {
        use axum::body::{Body, to_bytes};
        use axum::http::Request;
        use tower::ServiceExt;

        let mut tera = tera::Tera::default();
        tera.add_raw_template(TERMS_TEMPLATE, "{{ product_name }} terms").unwrap();
        let state =
            Arc::new(WebState::new(TemplateRenderer::from_tera(tera), SiteConfig::default(), "templates"));

        let response = router(state)
            .oneshot(Request::builder().uri("/terms/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"Zulip terms");
    }

    #[tokio::test]
    async fn test_missing_help_article() {
        use axum::body::Body;
        use axum::http::Request;
        use tower::ServiceExt;

        let temp = tempfile::tempdir().unwrap();
        let state = Arc::new(WebState::new(
            TemplateRenderer::from_tera(tera::Tera::default()),
            SiteConfig::default(),
            temp.path(),
        ));

        let response = router(state)
            .oneshot(Request::builder().uri("/help/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
