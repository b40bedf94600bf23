//! The `tplcheck.toml` project configuration.
//!
//! ```toml
//! template_dirs = ["templates"]
//! # markdown_root = "templates"
//! max_content_file_size = 1048576
//! default_user = "hamlet@zulip.com"
//!
//! [site]
//! product_name = "Zulip"
//! external_host = "localhost:9991"
//! # terms_of_service = "corporate/terms.md"
//!
//! # [skip]
//! # covered = ["zerver/portico.html"]
//! ```
//!
//! Every key is optional. Relative paths resolve against the directory that
//! holds the config file, except `site.terms_of_service`, which is a markdown
//! path relative to the markdown root (it is rendered through the
//! `render_markdown_path` filter).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::parse_config;
use crate::constants::{
    CONFIG_FILE_NAME, DEFAULT_EXTERNAL_HOST, DEFAULT_MAX_CONTENT_FILE_SIZE, DEFAULT_PRODUCT_NAME,
    DEFAULT_TEMPLATE_DIR, DEFAULT_USER_EMAIL,
};
use crate::core::TplcheckError;
use crate::templating::{SkipList, TemplateLoader};

/// Raw contents of `tplcheck.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Directories searched for templates, in resolution order
    #[serde(default = "default_template_dirs")]
    pub template_dirs: Vec<PathBuf>,

    /// Root for markdown paths; defaults to the first template directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markdown_root: Option<PathBuf>,

    /// Size limit in bytes for embedded markdown files; 0 disables the limit
    #[serde(default = "default_max_content_file_size")]
    pub max_content_file_size: u64,

    /// Fixture user whose profile fills the dummy context
    #[serde(default = "default_user")]
    pub default_user: String,

    #[serde(default)]
    pub site: SiteConfig,

    /// Replacement skip list, keyed by reason name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip: Option<BTreeMap<String, Vec<String>>>,
}

/// Site-wide values exposed to the web surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    #[serde(default = "default_product_name")]
    pub product_name: String,

    #[serde(default = "default_external_host")]
    pub external_host: String,

    /// Custom terms of service markdown, relative to the markdown root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terms_of_service: Option<String>,
}

fn default_template_dirs() -> Vec<PathBuf> {
    vec![PathBuf::from(DEFAULT_TEMPLATE_DIR)]
}

const fn default_max_content_file_size() -> u64 {
    DEFAULT_MAX_CONTENT_FILE_SIZE
}

fn default_user() -> String {
    DEFAULT_USER_EMAIL.to_string()
}

fn default_product_name() -> String {
    DEFAULT_PRODUCT_NAME.to_string()
}

fn default_external_host() -> String {
    DEFAULT_EXTERNAL_HOST.to_string()
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            template_dirs: default_template_dirs(),
            markdown_root: None,
            max_content_file_size: DEFAULT_MAX_CONTENT_FILE_SIZE,
            default_user: default_user(),
            site: SiteConfig::default(),
            skip: None,
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            product_name: default_product_name(),
            external_host: default_external_host(),
            terms_of_service: None,
        }
    }
}

impl ProjectConfig {
    /// Check values serde cannot check.
    pub fn validate(&self) -> Result<(), TplcheckError> {
        if self.template_dirs.is_empty() {
            return Err(TplcheckError::ConfigError {
                message: "template_dirs must list at least one directory".to_string(),
            });
        }

        if self.default_user.trim().is_empty() {
            return Err(TplcheckError::ConfigError {
                message: "default_user must not be empty".to_string(),
            });
        }

        if let Some(skip) = &self.skip {
            SkipList::from_partitions(skip)?;
        }

        Ok(())
    }
}

/// A configuration together with the directory it was loaded from.
#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
    config: ProjectConfig,
}

impl Project {
    /// Build a project from an in-memory configuration rooted at `root`.
    pub fn new(root: impl Into<PathBuf>, config: ProjectConfig) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    /// Load and validate the configuration file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let config: ProjectConfig = parse_config(path)?;
        config.validate().with_context(|| format!("Invalid configuration in {}", path.display()))?;

        let root = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);

        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(Self::new(root, config))
    }

    /// Use `explicit` when given, otherwise search upward from the current directory.
    pub fn locate(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(TplcheckError::ConfigNotFound {
                        path: path.display().to_string(),
                    }
                    .into());
                }
                path.to_path_buf()
            }
            None => {
                let current = std::env::current_dir()
                    .context("Cannot determine current working directory")?;
                find_config_from(&current)?
            }
        };

        Self::load(&path)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    /// Template directories, resolved against the project root.
    pub fn template_dirs(&self) -> Vec<PathBuf> {
        self.config.template_dirs.iter().map(|dir| self.resolve(dir)).collect()
    }

    /// Directory that markdown paths are relative to.
    pub fn markdown_root(&self) -> PathBuf {
        match &self.config.markdown_root {
            Some(root) => self.resolve(root),
            None => self.template_dirs().into_iter().next().unwrap_or_else(|| self.root.clone()),
        }
    }

    pub fn max_content_file_size(&self) -> Option<u64> {
        match self.config.max_content_file_size {
            0 => None,
            size => Some(size),
        }
    }

    /// The configured skip list, or the built-in partitions.
    pub fn skip_list(&self) -> Result<SkipList, TplcheckError> {
        match &self.config.skip {
            Some(partitions) => SkipList::from_partitions(partitions),
            None => Ok(SkipList::builtin()),
        }
    }

    /// A loader over this project's template directories.
    pub fn loader(&self) -> TemplateLoader {
        TemplateLoader::new(self.template_dirs())
            .with_markdown_root(self.markdown_root())
            .with_max_content_file_size(self.max_content_file_size())
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

/// Search `start` and its ancestors for `tplcheck.toml`.
pub fn find_config_from(start: &Path) -> Result<PathBuf, TplcheckError> {
    let mut current = start;

    loop {
        let candidate = current.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            return Ok(candidate);
        }

        match current.parent() {
            Some(parent) => current = parent,
            None => {
                return Err(TplcheckError::ConfigNotFound {
                    path: start.display().to_string(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templating::SkipReason;

    #[test]
    fn test_defaults() {
        let config: ProjectConfig = toml::from_str("").unwrap();
        assert_eq!(config, ProjectConfig::default());
        assert_eq!(config.template_dirs, vec![PathBuf::from("templates")]);
        assert_eq!(config.max_content_file_size, 1024 * 1024);
        assert_eq!(config.default_user, "hamlet@zulip.com");
        assert_eq!(config.site.product_name, "Zulip");
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result: Result<ProjectConfig, _> = toml::from_str("templates = [\"x\"]");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_empty_dirs() {
        let config = ProjectConfig {
            template_dirs: Vec::new(),
            ..ProjectConfig::default()
        };
        assert!(matches!(config.validate(), Err(TplcheckError::ConfigError { .. })));
    }

    #[test]
    fn test_validate_rejects_unknown_skip_reason() {
        let config: ProjectConfig = toml::from_str(
            r#"
            [skip]
            forgotten = ["zerver/home.html"]
            "#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_paths_resolve_against_root() {
        let config: ProjectConfig = toml::from_str(
            r#"
            template_dirs = ["templates", "/abs/templates"]
            max_content_file_size = 0
            "#,
        )
        .unwrap();
        let project = Project::new("/srv/app", config);

        assert_eq!(
            project.template_dirs(),
            vec![PathBuf::from("/srv/app/templates"), PathBuf::from("/abs/templates")]
        );
        assert_eq!(project.markdown_root(), PathBuf::from("/srv/app/templates"));
        assert_eq!(project.max_content_file_size(), None);
    }

    #[test]
    fn test_configured_skip_list_replaces_builtin() {
        let config: ProjectConfig = toml::from_str(
            r#"
            [skip]
            defer = ["analytics/activity.html"]
            "#,
        )
        .unwrap();
        let project = Project::new(".", config);
        let skips = project.skip_list().unwrap();

        assert_eq!(skips.identifiers().len(), 1);
        assert_eq!(skips.partition(SkipReason::Defer), ["analytics/activity.html".to_string()]);
        assert!(skips.partition(SkipReason::LoggedIn).is_empty());
    }

    #[test]
    fn test_find_config_walks_upward() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::write(temp.path().join(CONFIG_FILE_NAME), "").unwrap();
        let nested = temp.path().join("a/b/c");
        std::fs::create_dir_all(&nested).unwrap();

        let found = find_config_from(&nested).unwrap();
        assert_eq!(found, temp.path().join(CONFIG_FILE_NAME));
    }

    #[test]
    fn test_locate_explicit_missing() {
        let temp = tempfile::tempdir().unwrap();
        let missing = temp.path().join("nope.toml");
        let err = Project::locate(Some(&missing)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TplcheckError>(),
            Some(TplcheckError::ConfigNotFound { .. })
        ));
    }

    #[test]
    fn test_load_sets_root_to_config_dir() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "default_user = \"iago@zulip.com\"\n").unwrap();

        let project = Project::load(&path).unwrap();
        assert_eq!(project.root(), temp.path());
        assert_eq!(project.config().default_user, "iago@zulip.com");
    }
}
