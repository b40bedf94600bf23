//! Test utilities for tplcheck
//!
//! Helpers for writing throwaway template trees and for turning on logging
//! inside tests. Available to unit tests and, through the `test-utils`
//! feature, to the integration suite.
//!
//! # Example
//!
//! ```rust,ignore
//! use tplcheck_cli::test_utils::TemplateWorkspace;
//!
//! let ws = TemplateWorkspace::new().unwrap();
//! ws.write_template("zerver/login.html", "Log in to {{ product_name }}").unwrap();
//! let renderer = ws.loader().load().unwrap();
//! assert!(renderer.has_template("zerver/login.html"));
//! ```

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Once};
use tempfile::TempDir;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::constants::{CONFIG_FILE_NAME, DEFAULT_TEMPLATE_DIR, DEFAULT_USER_EMAIL};
use crate::templating::{DummyContextFactory, TemplateLoader};
use crate::users::FixtureUsers;

static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has any effect. With `None` the subscriber is only
/// installed when `RUST_LOG` is set.
///
/// ```bash
/// RUST_LOG=tplcheck_cli=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}

/// The template tree shipped with the repository.
pub fn repo_templates_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(DEFAULT_TEMPLATE_DIR)
}

/// The repository's own `tplcheck.toml`.
pub fn repo_config_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(CONFIG_FILE_NAME)
}

/// Dummy contexts for the default fixture user.
pub fn dummy_contexts() -> DummyContextFactory {
    DummyContextFactory::new(Arc::new(FixtureUsers::new()), DEFAULT_USER_EMAIL)
}

/// A temporary project with a `templates/` directory.
///
/// The directory is removed when the workspace is dropped.
pub struct TemplateWorkspace {
    temp_dir: TempDir,
}

impl TemplateWorkspace {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new().context("Failed to create temp dir")?;
        fs::create_dir_all(temp_dir.path().join(DEFAULT_TEMPLATE_DIR))?;
        Ok(Self { temp_dir })
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn templates_dir(&self) -> PathBuf {
        self.root().join(DEFAULT_TEMPLATE_DIR)
    }

    /// Write a file under `templates/`, creating parent directories.
    pub fn write_template(&self, identifier: &str, content: &str) -> Result<PathBuf> {
        let path = self.templates_dir().join(identifier);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    /// Write `tplcheck.toml` at the workspace root.
    pub fn write_config(&self, content: &str) -> Result<PathBuf> {
        let path = self.root().join(CONFIG_FILE_NAME);
        fs::write(&path, content)?;
        Ok(path)
    }

    /// A loader over `templates/` with default settings.
    pub fn loader(&self) -> TemplateLoader {
        TemplateLoader::new(vec![self.templates_dir()])
    }
}
