//! Helpers shared by the CLI commands.

use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

use crate::config::Project;
use crate::templating::{DummyContextFactory, TemplateLoader};
use crate::users::FixtureUsers;

/// Output format for commands that support machine-readable output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text with colored ✓/✗ markers
    Text,
    /// Pretty-printed JSON on stdout
    Json,
}

/// Everything a command needs about the project it runs in.
#[derive(Debug)]
pub struct CommandContext {
    pub project: Project,
    pub users: Arc<FixtureUsers>,
}

impl CommandContext {
    /// Load the project from `config_path`, or search upward for `tplcheck.toml`.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let project = Project::locate(config_path)?;
        tracing::debug!("Project root: {}", project.root().display());

        Ok(Self {
            project,
            users: Arc::new(FixtureUsers::new()),
        })
    }

    pub fn loader(&self) -> TemplateLoader {
        self.project.loader()
    }

    /// Dummy contexts for the configured default user.
    pub fn contexts(&self) -> DummyContextFactory {
        DummyContextFactory::new(self.users.clone(), self.project.config().default_user.clone())
    }
}

/// Parse a `key=value` assignment. The value is read as JSON when it parses,
/// and as a plain string otherwise.
pub fn parse_assignment(assignment: &str) -> Result<(String, Value)> {
    let (key, raw) = assignment
        .split_once('=')
        .with_context(|| format!("Expected KEY=VALUE, got '{}'", assignment))?;

    let key = key.trim();
    if key.is_empty() {
        anyhow::bail!("Empty key in assignment '{}'", assignment);
    }

    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}
