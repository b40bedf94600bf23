//! Template rendering engine with Tera.
//!
//! [`TemplateRenderer`] owns a Tera instance holding the whole template tree
//! (built by [`super::TemplateLoader`]). Every render works on a clone of that
//! instance, so functions registered for one context's callables never leak
//! into the next render.

use regex::Regex;
use std::collections::HashMap;
use std::sync::Arc;
use strsim::levenshtein;
use tera::Tera;

use super::context::RenderContext;
use super::coverage::RenderRecorder;
use super::error::TemplateError;

/// Maximum allowed Levenshtein distance as a percentage of target length for suggestions.
const SIMILARITY_THRESHOLD_PERCENT: usize = 50;

/// Number of suggestions offered for a misspelled name.
const MAX_SUGGESTIONS: usize = 3;

/// Loaded template tree plus rendering configuration.
#[derive(Clone)]
pub struct TemplateRenderer {
    tera: Tera,
    recorder: Option<Arc<RenderRecorder>>,
}

impl std::fmt::Debug for TemplateRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateRenderer")
            .field("templates", &self.tera.get_template_names().count())
            .field("recording", &self.recorder.is_some())
            .finish()
    }
}

/// A template resolved by name, ready to render.
#[derive(Debug, Clone, Copy)]
pub struct LoadedTemplate<'a> {
    renderer: &'a TemplateRenderer,
    name: &'a str,
}

impl LoadedTemplate<'_> {
    pub fn name(&self) -> &str {
        self.name
    }

    pub fn render(&self, context: &RenderContext) -> Result<String, TemplateError> {
        self.renderer.render_loaded(self.name, context)
    }
}

impl TemplateRenderer {
    pub(crate) fn from_tera(tera: Tera) -> Self {
        Self {
            tera,
            recorder: None,
        }
    }

    /// Record every successful render in `recorder`.
    #[must_use]
    pub fn with_recorder(mut self, recorder: Arc<RenderRecorder>) -> Self {
        self.recorder = Some(recorder);
        self
    }

    pub fn recorder(&self) -> Option<&Arc<RenderRecorder>> {
        self.recorder.as_ref()
    }

    /// Names of all loaded templates, sorted.
    pub fn template_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tera.get_template_names().map(str::to_string).collect();
        names.sort();
        names
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.tera.get_template_names().any(|loaded| loaded == name)
    }

    /// Resolve `name` to a loaded template.
    ///
    /// # Errors
    ///
    /// [`TemplateError::NotFound`] with near-miss suggestions.
    pub fn get_template<'a>(&'a self, name: &str) -> Result<LoadedTemplate<'a>, TemplateError> {
        match self.tera.get_template_names().find(|loaded| *loaded == name) {
            Some(loaded) => Ok(LoadedTemplate {
                renderer: self,
                name: loaded,
            }),
            None => {
                let available = self.template_names();
                Err(TemplateError::NotFound {
                    template: name.to_string(),
                    suggestions: find_similar_names(name, &available),
                })
            }
        }
    }

    /// Resolve and render in one step.
    pub fn render(&self, name: &str, context: &RenderContext) -> Result<String, TemplateError> {
        self.get_template(name)?.render(context)
    }

    fn render_loaded(&self, name: &str, context: &RenderContext) -> Result<String, TemplateError> {
        tracing::debug!("Rendering template '{}' with {} context variables", name, context.len());

        let mut tera = self.tera.clone();
        for (function_name, callable) in context.callables() {
            let callable = callable.clone();
            tera.register_function(
                function_name,
                move |_args: &HashMap<String, tera::Value>| -> tera::Result<tera::Value> {
                    Ok(callable.call())
                },
            );
        }

        let tera_context = context.to_tera().map_err(|e| TemplateError::RenderFailed {
            template: name.to_string(),
            message: format!("{:#}", e),
        })?;

        let rendered =
            tera.render(name, &tera_context).map_err(|e| parse_tera_error(&e, name, context))?;

        if let Some(recorder) = &self.recorder {
            recorder.record(name, context.is_shallow());
        }

        Ok(rendered)
    }
}

/// Parse a Tera render error into a structured [`TemplateError`].
fn parse_tera_error(error: &tera::Error, template: &str, context: &RenderContext) -> TemplateError {
    let message = format_tera_error(error);

    if let Some(variable) = extract_variable_name(&message) {
        let available_variables = context.variable_names();
        let suggestions = find_similar_names(&variable, &available_variables);
        return TemplateError::VariableNotFound {
            template: template.to_string(),
            variable,
            available_variables,
            suggestions,
        };
    }

    TemplateError::RenderFailed {
        template: template.to_string(),
        message,
    }
}

/// Extract variable name from a "Variable `foo` not found" message.
pub(crate) fn extract_variable_name(error_msg: &str) -> Option<String> {
    let re = Regex::new(r"Variable `([^`]+)` not found").ok()?;
    re.captures(error_msg).and_then(|caps| caps.get(1)).map(|m| m.as_str().to_string())
}

/// Extract the line number from the `line:column` marker Tera puts in parse errors.
pub(crate) fn extract_line_from_tera_error(error: &tera::Error) -> Option<usize> {
    use std::error::Error;

    let re = Regex::new(r"(\d+):(\d+)").ok()?;
    let mut current: Option<&dyn Error> = error.source();
    while let Some(err) = current {
        if let Some(line) = re
            .captures(&err.to_string())
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<usize>().ok())
        {
            return Some(line);
        }
        current = err.source();
    }
    None
}

/// Find similar names using Levenshtein distance, closest first.
pub(crate) fn find_similar_names(target: &str, available: &[String]) -> Vec<String> {
    let mut scored: Vec<_> =
        available.iter().map(|name| (name.clone(), levenshtein(target, name))).collect();

    scored.sort_by_key(|(_, dist)| *dist);

    scored
        .into_iter()
        .filter(|(_, dist)| *dist <= target.len() * SIMILARITY_THRESHOLD_PERCENT / 100)
        .take(MAX_SUGGESTIONS)
        .map(|(name, _)| name)
        .collect()
}

/// Format a Tera error by walking its whole chain.
///
/// Tera wraps the root cause ("Variable `foo` not found ...", "Filter call
/// failed", parse errors) in generic "Failed to render" layers; those layers are
/// dropped when a more specific message follows.
pub fn format_tera_error(error: &tera::Error) -> String {
    use std::error::Error;

    let mut all_messages = vec![error.to_string()];
    let mut current_error: Option<&dyn Error> = error.source();
    while let Some(err) = current_error {
        all_messages.push(err.to_string());
        current_error = err.source();
    }

    let specific: Vec<String> = all_messages
        .iter()
        .map(|msg| msg.trim().to_string())
        .filter(|msg| !msg.is_empty() && !msg.starts_with("Failed to render '"))
        .collect();

    if specific.is_empty() {
        all_messages.join("\n  → ")
    } else {
        specific.join("\n  → ")
    }
}
