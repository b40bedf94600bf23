//! Template render verification.
//!
//! This module loads an application's server-side templates into one Tera
//! engine and renders them with synthetic data, failing when any render raises.
//! Output is never inspected; the point is to catch templates that are broken
//! enough not to render at all.
//!
//! # Overview
//!
//! ```text
//! enumerate_templates ──► SkipList::filter ──► render_templates(dummy context)
//!                                   │
//!                                   └── defer partition ──► render_templates(data = [["one", "two"]])
//! ```
//!
//! - [`loader`] - walks template directories and parses the tree
//! - [`renderer`] - resolves identifiers and renders with a [`RenderContext`]
//! - [`context`] - context values, forms, callables and the dummy context
//! - [`skip`] - skip partitions and their audit
//! - [`verifier`] - `render_templates`, `render_single` and the smoke pass
//! - [`coverage`] - shallow vs. functional render recording
//! - [`filters`] - the `render_markdown_path` filter
//! - [`error`] - [`TemplateError`]
//!
//! # Template Context
//!
//! The dummy context holds plain values (`uid`, `messages`, `referrer.realm.name`,
//! ...), a form whose fields are read as `form.email.value`, and the
//! `current_url()` callable. It always carries `shallow_tested = true`, which
//! the [`RenderRecorder`] uses to tell smoke renders from real tests.
//!
//! # Custom Filters
//!
//! - `render_markdown_path`: render a markdown file below the markdown root
//!   (e.g. `{{ article | render_markdown_path | safe }}`)
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::PathBuf;
//! use std::sync::Arc;
//! use tplcheck_cli::templating::{DummyContextFactory, SkipList, TemplateLoader, smoke_pass};
//! use tplcheck_cli::users::FixtureUsers;
//!
//! # fn example() -> anyhow::Result<()> {
//! let loader = TemplateLoader::new(vec![PathBuf::from("templates")]);
//! let renderer = loader.load()?;
//! let templates = loader.enumerate()?;
//! let contexts = DummyContextFactory::new(Arc::new(FixtureUsers::new()), "hamlet@zulip.com");
//!
//! let report = smoke_pass(&renderer, &templates, &SkipList::builtin(), &contexts)?;
//! println!("{} rendered, {} skipped", report.rendered, report.skipped);
//! # Ok(())
//! # }
//! ```

pub mod context;
pub mod coverage;
pub mod error;
pub mod filters;
pub mod loader;
pub mod renderer;
pub mod skip;
pub mod verifier;

pub use context::{
    Callable, ContextValue, DummyContextFactory, DummyForm, FormField, RenderContext,
    build_dummy_context, deferred_overrides,
};
pub use coverage::{CoverageReport, RenderRecorder};
pub use error::TemplateError;
pub use loader::{TemplateLoader, enumerate_templates, is_template_file};
pub use renderer::{LoadedTemplate, TemplateRenderer, format_tera_error};
pub use skip::{SkipAudit, SkipList, SkipReason, build_skip_list};
pub use verifier::{SmokeReport, render_single, render_templates, smoke_pass};
