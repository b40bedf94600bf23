//! Template discovery and loading.
//!
//! Template identifiers are `/`-separated paths relative to a template
//! directory, on every platform. Directories are searched in configured order
//! and the first directory holding an identifier wins.

use anyhow::{Context, Result};
use regex::Regex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tera::Tera;
use walkdir::WalkDir;

use super::error::TemplateError;
use super::filters;
use super::renderer::{TemplateRenderer, extract_line_from_tera_error, format_tera_error};
use crate::constants::{DEFAULT_MAX_CONTENT_FILE_SIZE, MARKDOWN_EXTENSION};
use crate::core::TplcheckError;

/// Whether a file name counts as a template.
///
/// Hidden files, `__init__*` files and markdown sources are not templates.
pub fn is_template_file(file_name: &str) -> bool {
    !(file_name.starts_with('.')
        || file_name.starts_with("__init__")
        || file_name.ends_with(&format!(".{}", MARKDOWN_EXTENSION)))
}

fn identifier_for(dir: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(dir).ok()?;
    let parts: Option<Vec<&str>> =
        relative.components().map(|component| component.as_os_str().to_str()).collect();
    Some(parts?.join("/"))
}

fn enumerate_with_paths(dirs: &[PathBuf]) -> Result<Vec<(String, PathBuf)>> {
    let mut seen = HashSet::new();
    let mut templates = Vec::new();

    for dir in dirs {
        if !dir.is_dir() {
            tracing::debug!("Skipping missing template directory {}", dir.display());
            continue;
        }

        let mut found = Vec::new();
        for entry in WalkDir::new(dir).follow_links(true) {
            let entry = entry
                .with_context(|| format!("Failed to walk template directory {}", dir.display()))?;
            if !entry.file_type().is_file() {
                continue;
            }

            let Some(file_name) = entry.file_name().to_str() else {
                tracing::warn!("Ignoring non UTF-8 file name {}", entry.path().display());
                continue;
            };
            if !is_template_file(file_name) {
                continue;
            }

            match identifier_for(dir, entry.path()) {
                Some(identifier) => found.push((identifier, entry.path().to_path_buf())),
                None => tracing::warn!("Ignoring non UTF-8 path {}", entry.path().display()),
            }
        }

        found.sort_by(|a, b| a.0.cmp(&b.0));
        for (identifier, path) in found {
            if seen.insert(identifier.clone()) {
                templates.push((identifier, path));
            } else {
                tracing::debug!("'{}' shadowed by an earlier template directory", identifier);
            }
        }
    }

    Ok(templates)
}

/// Every template identifier in `dirs`, without skip filtering.
///
/// Sorted per directory, directories in the given order, each identifier once.
/// Directories that do not exist are ignored.
pub fn enumerate_templates(dirs: &[PathBuf]) -> Result<Vec<String>> {
    Ok(enumerate_with_paths(dirs)?.into_iter().map(|(identifier, _)| identifier).collect())
}

/// Loads a template tree into a [`TemplateRenderer`].
#[derive(Debug, Clone)]
pub struct TemplateLoader {
    template_dirs: Vec<PathBuf>,
    markdown_root: Option<PathBuf>,
    max_content_file_size: Option<u64>,
}

impl TemplateLoader {
    /// Loader over `template_dirs` with the default markdown root (the first
    /// directory) and the default 1 MiB markdown size limit.
    pub fn new(template_dirs: Vec<PathBuf>) -> Self {
        Self {
            template_dirs,
            markdown_root: None,
            max_content_file_size: Some(DEFAULT_MAX_CONTENT_FILE_SIZE),
        }
    }

    #[must_use]
    pub fn with_markdown_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.markdown_root = Some(root.into());
        self
    }

    /// `None` disables the size limit.
    #[must_use]
    pub fn with_max_content_file_size(mut self, max: Option<u64>) -> Self {
        self.max_content_file_size = max;
        self
    }

    pub fn template_dirs(&self) -> &[PathBuf] {
        &self.template_dirs
    }

    pub fn markdown_root(&self) -> PathBuf {
        self.markdown_root
            .clone()
            .or_else(|| self.template_dirs.first().cloned())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn enumerate(&self) -> Result<Vec<String>> {
        enumerate_templates(&self.template_dirs)
    }

    /// Parse every template into one engine.
    ///
    /// # Errors
    ///
    /// - [`TplcheckError::TemplateDirMissing`] when no template directory exists
    /// - [`TemplateError::LoadFailed`] when any template fails to parse or
    ///   extends a template that is not loaded
    pub fn load(&self) -> Result<TemplateRenderer> {
        if !self.template_dirs.iter().any(|dir| dir.is_dir()) {
            return Err(TplcheckError::TemplateDirMissing {
                searched: self
                    .template_dirs
                    .iter()
                    .map(|dir| dir.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
            }
            .into());
        }

        let mut sources = Vec::new();
        for (identifier, path) in enumerate_with_paths(&self.template_dirs)? {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read template {}", path.display()))?;
            sources.push((identifier, content));
        }

        let mut tera = Tera::default();
        tera.register_filter(
            "render_markdown_path",
            filters::create_markdown_filter(self.markdown_root(), self.max_content_file_size),
        );
        tera.add_raw_templates(sources).map_err(|e| load_error(&e))?;

        let renderer = TemplateRenderer::from_tera(tera);
        tracing::debug!(
            "Loaded {} templates from {} directories",
            renderer.template_names().len(),
            self.template_dirs.len()
        );
        Ok(renderer)
    }
}

fn load_error(error: &tera::Error) -> TemplateError {
    let template = Regex::new(r"'([^']+)'")
        .ok()
        .and_then(|re| {
            re.captures(&error.to_string()).and_then(|caps| caps.get(1)).map(|m| m.as_str().to_string())
        })
        .unwrap_or_else(|| "<template tree>".to_string());

    TemplateError::LoadFailed {
        template,
        message: format_tera_error(error),
        line: extract_line_from_tera_error(error),
    }
}
