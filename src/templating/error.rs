//! Structured template errors for tplcheck
//!
//! Every variant names the template that failed. `Display` gives the one-line
//! form used in logs, [`TemplateError::format_with_context`] the multi-line
//! report printed by the CLI.

/// Errors raised while loading or rendering a template
#[derive(Debug)]
pub enum TemplateError {
    /// The identifier does not resolve to a loaded template
    NotFound {
        template: String,
        /// Loaded identifiers close to the requested one
        suggestions: Vec<String>,
    },

    /// The template tree could not be parsed
    LoadFailed {
        template: String,
        message: String,
        line: Option<usize>,
    },

    /// A variable referenced by the template is absent from the context
    VariableNotFound {
        template: String,
        variable: String,
        available_variables: Vec<String>,
        suggestions: Vec<String>,
    },

    /// Any other render failure (wrong value shape, filter errors, ...)
    RenderFailed {
        template: String,
        message: String,
    },
}

impl std::fmt::Display for TemplateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemplateError::NotFound {
                template,
                ..
            } => {
                write!(f, "Template not found: '{}'", template)
            }
            TemplateError::LoadFailed {
                template,
                message,
                ..
            } => {
                write!(f, "Failed to load template '{}': {}", template, message)
            }
            TemplateError::VariableNotFound {
                template,
                variable,
                ..
            } => {
                write!(f, "Template variable not found in '{}': '{}'", template, variable)
            }
            TemplateError::RenderFailed {
                template,
                message,
            } => {
                write!(f, "Failed to render template '{}': {}", template, message)
            }
        }
    }
}

impl std::error::Error for TemplateError {}

impl TemplateError {
    /// Identifier of the template the error belongs to
    pub fn template(&self) -> &str {
        match self {
            TemplateError::NotFound {
                template,
                ..
            }
            | TemplateError::LoadFailed {
                template,
                ..
            }
            | TemplateError::VariableNotFound {
                template,
                ..
            }
            | TemplateError::RenderFailed {
                template,
                ..
            } => template,
        }
    }

    /// Whether the error happened while resolving or loading, before any render
    pub fn is_load_error(&self) -> bool {
        matches!(self, TemplateError::NotFound { .. } | TemplateError::LoadFailed { .. })
    }

    /// Generate user-friendly error message with context and suggestions
    pub fn format_with_context(&self) -> String {
        match self {
            TemplateError::NotFound {
                template,
                suggestions,
            } => format_not_found_error(template, suggestions),
            TemplateError::LoadFailed {
                template,
                message,
                line,
            } => format_load_error(template, message, *line),
            TemplateError::VariableNotFound {
                template,
                variable,
                available_variables,
                suggestions,
            } => format_variable_not_found_error(
                template,
                variable,
                available_variables,
                suggestions,
            ),
            TemplateError::RenderFailed {
                template,
                message,
            } => format_render_error(template, message),
        }
    }
}

fn format_not_found_error(template: &str, suggestions: &[String]) -> String {
    let mut msg = String::new();

    msg.push_str("ERROR: Template Not Found\n\n");
    msg.push_str(&format!("Template: {}\n\n", template));

    if !suggestions.is_empty() {
        msg.push_str("Did you mean one of these?\n");
        for suggestion in suggestions {
            msg.push_str(&format!("  - {}\n", suggestion));
        }
        msg.push('\n');
    }

    msg
}

fn format_load_error(template: &str, message: &str, line: Option<usize>) -> String {
    let mut msg = String::new();

    msg.push_str("ERROR: Template Syntax Error\n\n");
    msg.push_str(&format!("Error: {}\n", message));
    msg.push_str(&format!("Template: {}\n", template));

    if let Some(line) = line {
        msg.push_str(&format!("Line: {}\n", line));
    }

    msg.push_str("\nSUGGESTION: Check template syntax for unclosed tags or invalid expressions.\n");
    msg.push_str("Common issues:\n");
    msg.push_str("  - Unclosed {{ }} or {% %} delimiters\n");
    msg.push_str("  - Invalid filter names\n");
    msg.push_str("  - Blocks that do not match the parent template\n\n");

    msg
}

fn format_variable_not_found_error(
    template: &str,
    variable: &str,
    available_variables: &[String],
    suggestions: &[String],
) -> String {
    let mut msg = String::new();

    msg.push_str("ERROR: Template Variable Not Found\n\n");
    msg.push_str(&format!("Variable: {}\n", variable));
    msg.push_str(&format!("Template: {}\n\n", template));

    if !suggestions.is_empty() {
        msg.push_str("Did you mean one of these?\n");
        for suggestion in suggestions {
            msg.push_str(&format!("  - {}\n", suggestion));
        }
        msg.push('\n');
    }

    if !available_variables.is_empty() {
        msg.push_str("Available variables in this context:\n");

        let shown = 10;
        for var in available_variables.iter().take(shown) {
            msg.push_str(&format!("  {}\n", var));
        }

        if available_variables.len() > shown {
            msg.push_str(&format!("  ... and {} more\n", available_variables.len() - shown));
        }
        msg.push('\n');
    }

    msg.push_str(
        "SUGGESTION: Add the variable to the dummy context with a placeholder value.\n\n",
    );

    msg
}

fn format_render_error(template: &str, message: &str) -> String {
    let mut msg = String::new();

    msg.push_str("ERROR: Template Rendering Failed\n\n");
    msg.push_str(&format!("Error: {}\n", message));
    msg.push_str(&format!("Template: {}\n", template));

    msg.push_str("\nSUGGESTION: A context value probably has the wrong shape for this template.\n");
    msg.push_str("Loops need lists, attribute access needs objects.\n\n");

    msg
}
