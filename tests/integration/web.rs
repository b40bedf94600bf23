//! The terms and help pages served through the axum router.

use anyhow::Result;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use std::sync::Arc;
use tower::ServiceExt;

use tplcheck_cli::config::SiteConfig;
use tplcheck_cli::templating::TemplateLoader;
use tplcheck_cli::test_utils::{TemplateWorkspace, repo_templates_dir};
use tplcheck_cli::web::{WebState, router};

fn repo_state(site: SiteConfig) -> Result<Arc<WebState>> {
    let renderer = TemplateLoader::new(vec![repo_templates_dir()]).load()?;
    Ok(Arc::new(WebState::new(renderer, site, repo_templates_dir())))
}

async fn get(state: Arc<WebState>, uri: &str) -> Result<(StatusCode, String)> {
    let response = router(state).oneshot(Request::builder().uri(uri).body(Body::empty())?).await?;
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await?;
    Ok((status, String::from_utf8(body.to_vec())?))
}

#[tokio::test]
async fn test_terms_page_default_text() -> Result<()> {
    let (status, body) = get(repo_state(SiteConfig::default())?, "/terms/").await?;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Thanks for using our products and services (\"Services\"), "));
    assert!(body.contains("By using our Services, you are agreeing to these terms"));
    assert!(body.contains("provided by Zulip at localhost:9991"));
    Ok(())
}

#[tokio::test]
async fn test_terms_page_custom_markdown() -> Result<()> {
    let site = SiteConfig {
        terms_of_service: Some("zerver/tests/markdown/test_markdown.md".to_string()),
        ..SiteConfig::default()
    };
    let (status, body) = get(repo_state(site)?, "/terms/").await?;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<h1 id=\"hello\">Hello!</h1>"));
    assert!(!body.contains("By using our Services"));
    Ok(())
}

#[tokio::test]
async fn test_help_article() -> Result<()> {
    let state = repo_state(SiteConfig::default())?;

    let (status, body) = get(state.clone(), "/help/index").await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<h1 id=\"help-center\">Help center</h1>"));

    let (status, body) = get(state, "/help/message-formatting").await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<h2 id=\"code-blocks\">Code blocks</h2>"));
    Ok(())
}

#[tokio::test]
async fn test_unknown_help_article_is_404() -> Result<()> {
    let state = repo_state(SiteConfig::default())?;

    let (status, _) = get(state.clone(), "/help/does-not-exist").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get(state, "/help/..%2Fterms").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn test_render_failure_is_500() -> Result<()> {
    let ws = TemplateWorkspace::new()?;
    ws.write_template("zerver/terms.html", "{{ undefined_variable }}")?;
    let state = Arc::new(WebState::new(ws.loader().load()?, SiteConfig::default(), ws.templates_dir()));

    let (status, body) = get(state, "/terms/").await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!body.contains("undefined_variable"));
    Ok(())
}
