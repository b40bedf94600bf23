//! Error handling for tplcheck
//!
//! This module provides the application error type and user-friendly error
//! reporting for the `tplcheck` binary. Two layers work together:
//! 1. [`TplcheckError`] - strongly-typed failures outside of template rendering
//!    (configuration, template directories, fixture lookups, I/O)
//! 2. [`ErrorContext`] - wrapper that adds details and a suggestion for CLI output
//!
//! Template rendering failures use [`crate::templating::TemplateError`], which
//! carries its own multi-line report. [`user_friendly_error`] recognises both
//! anywhere in an [`anyhow::Error`] chain.
//!
//! # Examples
//!
//! ```rust,no_run
//! use tplcheck_cli::core::{ErrorContext, TplcheckError};
//!
//! let context = ErrorContext::new(TplcheckError::ConfigNotFound {
//!     path: "tplcheck.toml".to_string(),
//! })
//! .with_suggestion("Create a tplcheck.toml in the project root")
//! .with_details("tplcheck searches the current directory and its parents");
//!
//! context.display();
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

use crate::templating::TemplateError;

/// The main error type for tplcheck operations.
#[derive(Error, Debug)]
pub enum TplcheckError {
    /// No `tplcheck.toml` was found.
    ///
    /// Raised when the config path given with `--config` does not exist, or
    /// when the upward search from the working directory reaches the
    /// filesystem root.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The explicit path, or the directory the search started from
        path: String,
    },

    /// Configuration content is invalid
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration error
        message: String,
    },

    /// None of the configured template directories exist
    #[error("No template directory found (looked in: {searched})")]
    TemplateDirMissing {
        /// Comma separated list of directories that were tried
        searched: String,
    },

    /// The user lookup collaborator has no profile for the email
    #[error("No user profile for email '{email}'")]
    UserNotFound {
        /// The email that was looked up
        email: String,
    },

    /// A markdown path handed to the `render_markdown_path` filter was rejected
    #[error("Invalid markdown path '{path}': {reason}")]
    MarkdownPath {
        /// The path as written in the template context
        path: String,
        /// Why the path was rejected
        reason: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// Other error
    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}

/// Error context wrapper that provides user-friendly error information.
///
/// Displayed by `main` when a command fails: the error in red, details in
/// yellow and the suggestion in green.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: TplcheckError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub const fn new(error: TplcheckError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into a user-friendly format with contextual suggestions.
///
/// Walks the whole error chain so that errors wrapped with
/// `anyhow::Context` are still recognised.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let mut current: &dyn std::error::Error = error.as_ref();
    loop {
        if let Some(app_error) = current.downcast_ref::<TplcheckError>() {
            return create_error_context(app_error);
        }

        if let Some(template_error) = current.downcast_ref::<TemplateError>() {
            let formatted = template_error.format_with_context();
            return ErrorContext::new(TplcheckError::Other {
                message: template_error.to_string(),
            })
            .with_details(formatted)
            .with_suggestion(template_error_suggestion(template_error));
        }

        match current.source() {
            Some(source) => current = source,
            None => break,
        }
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        if io_error.kind() == std::io::ErrorKind::PermissionDenied {
            return ErrorContext::new(TplcheckError::Other {
                message: error.to_string(),
            })
            .with_suggestion("Check file permissions on the template and config directories");
        }
    }

    // Generic error - keep the full chain for diagnostics
    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(ToString::to_string).collect();
    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(TplcheckError::Other {
        message,
    })
}

fn template_error_suggestion(error: &TemplateError) -> &'static str {
    match error {
        TemplateError::NotFound {
            ..
        } => "Check the template name against 'tplcheck list'",
        TemplateError::LoadFailed {
            ..
        } => "Fix the template syntax; every template is parsed when the tree is loaded",
        TemplateError::VariableNotFound {
            ..
        } => {
            "Add the variable to the dummy context, or move the template to a skip partition with a reason"
        }
        TemplateError::RenderFailed {
            ..
        } => "Check that the dummy context values have the shape the template expects",
    }
}

fn create_error_context(error: &TplcheckError) -> ErrorContext {
    match error {
        TplcheckError::ConfigNotFound {
            path,
        } => ErrorContext::new(TplcheckError::ConfigNotFound {
            path: path.clone(),
        })
        .with_suggestion("Create a tplcheck.toml next to your templates directory, or pass --config")
        .with_details("tplcheck looks for tplcheck.toml in the current directory and its parents"),

        TplcheckError::ConfigError {
            message,
        } => ErrorContext::new(TplcheckError::ConfigError {
            message: message.clone(),
        })
        .with_suggestion("Check the keys and value types in tplcheck.toml"),

        TplcheckError::TemplateDirMissing {
            searched,
        } => ErrorContext::new(TplcheckError::TemplateDirMissing {
            searched: searched.clone(),
        })
        .with_suggestion("Point template_dirs in tplcheck.toml at an existing directory"),

        TplcheckError::UserNotFound {
            email,
        } => ErrorContext::new(TplcheckError::UserNotFound {
            email: email.clone(),
        })
        .with_suggestion("Set default_user in tplcheck.toml to one of the fixture users")
        .with_details("The dummy context needs a user profile for user_profile and user"),

        TplcheckError::MarkdownPath {
            path,
            reason,
        } => ErrorContext::new(TplcheckError::MarkdownPath {
            path: path.clone(),
            reason: reason.clone(),
        })
        .with_suggestion("Markdown paths must be relative .md files inside the markdown root"),

        other => ErrorContext::new(TplcheckError::Other {
            message: other.to_string(),
        }),
    }
}
