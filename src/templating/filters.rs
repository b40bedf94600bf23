//! Custom Tera filters.
//!
//! `render_markdown_path` embeds a markdown file as HTML:
//!
//! ```text
//! {{ article | render_markdown_path | safe }}
//! ```
//!
//! # Security
//!
//! File access is restricted to the markdown root:
//! - Only relative paths are allowed
//! - `..` components may not climb above the root
//! - Only `.md` files are read
//! - Missing files are hard errors
//! - Files larger than the configured limit are rejected

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use crate::constants::MARKDOWN_EXTENSION;
use crate::core::TplcheckError;
use crate::markdown::render_markdown;

fn rejected(path_str: &str, reason: impl Into<String>) -> TplcheckError {
    TplcheckError::MarkdownPath {
        path: path_str.to_string(),
        reason: reason.into(),
    }
}

/// Validate a markdown path from a template and return its canonical location.
///
/// # Errors
///
/// [`TplcheckError::MarkdownPath`] when the path is absolute, escapes `root`,
/// is not a `.md` file, does not exist, or exceeds `max_size` bytes.
///
/// ```rust,no_run
/// # use std::path::Path;
/// # use tplcheck_cli::templating::filters::validate_markdown_path;
/// let root = Path::new("templates");
/// assert!(validate_markdown_path("zerver/help/index.md", root, None).is_ok());
/// assert!(validate_markdown_path("/etc/passwd", root, None).is_err());
/// assert!(validate_markdown_path("../../secrets.md", root, None).is_err());
/// assert!(validate_markdown_path("zerver/home.html", root, None).is_err());
/// ```
pub fn validate_markdown_path(
    path_str: &str,
    root: &Path,
    max_size: Option<u64>,
) -> Result<PathBuf, TplcheckError> {
    let path = Path::new(path_str);

    if path.is_absolute() {
        return Err(rejected(path_str, "absolute paths are not allowed"));
    }

    let mut depth: i32 = 0;
    for component in path.components() {
        match component {
            Component::Normal(_) => depth += 1,
            Component::ParentDir => {
                depth -= 1;
                if depth < 0 {
                    return Err(rejected(path_str, "path escapes the markdown root"));
                }
            }
            Component::CurDir => {}
            _ => return Err(rejected(path_str, "only relative paths are allowed")),
        }
    }

    let is_markdown = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(MARKDOWN_EXTENSION));
    if !is_markdown {
        return Err(rejected(path_str, "only .md files can be rendered"));
    }

    let full_path = root.join(path);
    if !full_path.is_file() {
        return Err(rejected(
            path_str,
            format!("file not found (looked for {})", full_path.display()),
        ));
    }

    let canonical_path = full_path
        .canonicalize()
        .map_err(|e| rejected(path_str, format!("cannot resolve path: {e}")))?;
    let canonical_root = root
        .canonicalize()
        .map_err(|e| rejected(path_str, format!("cannot resolve markdown root: {e}")))?;

    if !canonical_path.starts_with(&canonical_root) {
        return Err(rejected(
            path_str,
            format!("resolves to {} outside the markdown root", canonical_path.display()),
        ));
    }

    if let Some(max_bytes) = max_size {
        let size = canonical_path
            .metadata()
            .map_err(|e| rejected(path_str, format!("cannot read metadata: {e}")))?
            .len();
        if size > max_bytes {
            return Err(rejected(
                path_str,
                format!("file is {} bytes, limit is {} bytes", size, max_bytes),
            ));
        }
    }

    Ok(canonical_path)
}

/// Read and render one markdown file from the markdown root.
pub fn render_markdown_file(
    path_str: &str,
    root: &Path,
    max_size: Option<u64>,
) -> Result<String, TplcheckError> {
    let file_path = validate_markdown_path(path_str, root, max_size)?;
    let source = std::fs::read_to_string(&file_path)?;
    Ok(render_markdown(&source))
}

/// Creates the `render_markdown_path` filter bound to a markdown root.
pub fn create_markdown_filter(root: PathBuf, max_size: Option<u64>) -> impl tera::Filter + 'static {
    move |value: &tera::Value, _args: &HashMap<String, tera::Value>| -> tera::Result<tera::Value> {
        let path_str = value
            .as_str()
            .ok_or_else(|| tera::Error::msg("render_markdown_path requires a string path"))?;

        let html = render_markdown_file(path_str, &root, max_size)
            .map_err(|e| tera::Error::msg(format!("render_markdown_path: {}", e)))?;

        tracing::debug!("Rendered markdown '{}' ({} bytes of HTML)", path_str, html.len());
        Ok(tera::Value::String(html))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;
    use tera::Filter;

    fn create_markdown_root() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path();

        fs::create_dir_all(root.join("zerver/help")).unwrap();
        fs::write(root.join("zerver/help/index.md"), "# Help center\n\nWelcome.\n").unwrap();
        fs::write(root.join("zerver/help/notes.txt"), "plain").unwrap();

        temp
    }

    #[test]
    fn test_validate_valid_path() {
        let temp = create_markdown_root();
        let path = validate_markdown_path("zerver/help/index.md", temp.path(), None).unwrap();
        assert!(path.ends_with("zerver/help/index.md"));
        assert!(path.is_absolute());
    }

    #[test]
    fn test_validate_allows_inner_parent_dir() {
        let temp = create_markdown_root();
        let result = validate_markdown_path("zerver/../zerver/help/index.md", temp.path(), None);
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_rejects_absolute_path() {
        let temp = create_markdown_root();
        let err = validate_markdown_path("/etc/passwd.md", temp.path(), None).unwrap_err();
        assert!(err.to_string().contains("absolute"));
    }

    #[test]
    fn test_validate_rejects_traversal() {
        let temp = create_markdown_root();
        let err = validate_markdown_path("../../etc/secret.md", temp.path(), None).unwrap_err();
        assert!(err.to_string().contains("escapes"));
    }

    #[test]
    fn test_validate_rejects_other_extensions() {
        let temp = create_markdown_root();
        let err = validate_markdown_path("zerver/help/notes.txt", temp.path(), None).unwrap_err();
        assert!(err.to_string().contains(".md"));
    }

    #[test]
    fn test_validate_rejects_missing_file() {
        let temp = create_markdown_root();
        let err = validate_markdown_path("zerver/help/missing.md", temp.path(), None).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_validate_size_limit() {
        let temp = create_markdown_root();
        let err = validate_markdown_path("zerver/help/index.md", temp.path(), Some(4)).unwrap_err();
        assert!(err.to_string().contains("limit"));
        assert!(validate_markdown_path("zerver/help/index.md", temp.path(), Some(1024)).is_ok());
    }

    #[test]
    fn test_filter_renders_html() {
        let temp = create_markdown_root();
        let filter = create_markdown_filter(temp.path().to_path_buf(), None);

        let value = tera::Value::String("zerver/help/index.md".to_string());
        let html = filter.filter(&value, &HashMap::new()).unwrap();
        assert_eq!(
            html.as_str().unwrap(),
            "<h1 id=\"help-center\">Help center</h1>\n<p>Welcome.</p>\n"
        );
    }

    #[test]
    fn test_filter_requires_string() {
        let temp = create_markdown_root();
        let filter = create_markdown_filter(temp.path().to_path_buf(), None);
        assert!(filter.filter(&tera::Value::Bool(true), &HashMap::new()).is_err());
    }
}
