//! Smoke rendering of a template tree.
//!
//! The smoke pass renders every enumerated template that is not skipped with
//! the shared dummy context, then renders the `defer` partition a second time
//! with a list-shaped `data`. It stops at the first failure and logs the name
//! of the template that broke.

use anyhow::Result;
use serde::Serialize;

use super::context::{DummyContextFactory, RenderContext, deferred_overrides};
use super::error::TemplateError;
use super::renderer::TemplateRenderer;
use super::skip::{SkipList, SkipReason};

/// Render each identifier in order with `context`.
///
/// Returns how many templates rendered. On the first failure the error is
/// logged with the template name and returned unchanged; the remaining
/// identifiers are not rendered.
pub fn render_templates<I, S>(
    renderer: &TemplateRenderer,
    identifiers: I,
    context: &RenderContext,
) -> Result<usize, TemplateError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut rendered = 0;
    for identifier in identifiers {
        let identifier = identifier.as_ref();
        let result = renderer.get_template(identifier).and_then(|template| template.render(context));
        if let Err(e) = result {
            tracing::error!("Exception while rendering '{}'", identifier);
            return Err(e);
        }
        rendered += 1;
    }

    tracing::debug!("Rendered {} templates", rendered);
    Ok(rendered)
}

/// Render one template and return its text.
pub fn render_single(
    renderer: &TemplateRenderer,
    identifier: &str,
    context: &RenderContext,
) -> Result<String, TemplateError> {
    renderer.get_template(identifier)?.render(context)
}

/// Counts from a completed smoke pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SmokeReport {
    /// Templates rendered with the default dummy context
    pub rendered: usize,
    /// Deferred templates rendered with list-shaped `data`
    pub deferred_rendered: usize,
    /// Enumerated templates excluded by the skip list
    pub skipped: usize,
}

/// Run the full smoke pass over `templates`.
///
/// # Errors
///
/// The first [`TemplateError`], or a context construction error.
pub fn smoke_pass(
    renderer: &TemplateRenderer,
    templates: &[String],
    skip_list: &SkipList,
    contexts: &DummyContextFactory,
) -> Result<SmokeReport> {
    let selected = skip_list.filter(templates);
    let skipped = templates.len() - selected.len();
    tracing::info!(
        "Rendering {} templates ({} skipped) as {}",
        selected.len(),
        skipped,
        contexts.email()
    );

    let context = contexts.build(RenderContext::new())?;
    let rendered = render_templates(renderer, &selected, &context)?;

    let deferred = skip_list.partition(SkipReason::Defer);
    let deferred_context = contexts.build(deferred_overrides())?;
    let deferred_rendered = render_templates(renderer, deferred, &deferred_context)?;

    Ok(SmokeReport {
        rendered,
        deferred_rendered,
        skipped,
    })
}
