//! tplcheck - render-verification for server-side templates
//!
//! Web applications accumulate hundreds of templates, and many of them are
//! only rendered on rarely exercised paths. A typo in a variable name or a
//! broken tag then surfaces as a 500 in production. tplcheck loads every
//! template under the configured directories, renders each one with a
//! synthetic "dummy" context, and fails on the first one that cannot render.
//!
//! # Architecture Overview
//!
//! - Templates are discovered by walking the template directories; every
//!   regular file except `.md` content, hidden files and `__init__*` files is
//!   a template, named by its path relative to its directory.
//! - A skip list partitions the templates that are exercised elsewhere, need
//!   special context, or need a logged-in or logged-out session.
//! - Everything else is rendered with the dummy context. Templates in the
//!   `defer` partition are then rendered with extra variables.
//! - A small HTTP surface serves the terms-of-service and help pages from the
//!   same templates.
//!
//! # Core Modules
//!
//! - [`cli`] - command-line interface (`verify`, `list`, `render`, `skips`, `serve`)
//! - [`config`] - `tplcheck.toml` project configuration
//! - [`core`] - error types and user-facing error formatting
//! - [`templating`] - loading, rendering, dummy context, skip list, smoke pass
//! - [`markdown`] - Markdown to HTML with heading anchors
//! - [`users`] - fixture user directory for the dummy context
//! - [`pattern`] - glob filters for `verify --only`
//! - [`web`] - `/terms/` and `/help/<article>` handlers
//!
//! # Configuration (tplcheck.toml)
//!
//! ```toml
//! template_dirs = ["templates"]
//! default_user = "hamlet@zulip.com"
//!
//! [site]
//! product_name = "Zulip"
//! external_host = "localhost:9991"
//!
//! [skip]
//! logged_out = ["zerver/compose.html"]
//! ```
//!
//! Every key is optional; the skip list falls back to the builtin partitions
//! when the `[skip]` table is absent.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tplcheck_cli::templating::{DummyContextFactory, TemplateLoader, smoke_pass, SkipList};
//! use tplcheck_cli::users::FixtureUsers;
//!
//! # fn main() -> anyhow::Result<()> {
//! let loader = TemplateLoader::new(vec!["templates".into()]);
//! let templates = loader.enumerate()?;
//! let renderer = loader.load()?;
//! let contexts = DummyContextFactory::new(Arc::new(FixtureUsers::new()), "hamlet@zulip.com");
//!
//! let report = smoke_pass(&renderer, &templates, &SkipList::builtin(), &contexts)?;
//! println!("rendered {} templates", report.rendered);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod markdown;
pub mod pattern;
pub mod templating;
pub mod users;
pub mod web;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
