//! Glob selection of template identifiers.
//!
//! `tplcheck verify --only <glob>` narrows the smoke pass to matching
//! identifiers. Patterns use [`glob::Pattern`] syntax against the
//! `/`-separated identifier, so `zerver/*.html` matches `zerver/login.html`
//! and `**/*.txt` matches every text template.

use anyhow::{Context, Result};
use glob::{MatchOptions, Pattern};
use tracing::debug;

/// Options shared by every identifier match: `*` does not cross `/`.
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// A single compiled glob pattern.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    pattern: Pattern,
    original_pattern: String,
}

impl PatternMatcher {
    pub fn new(pattern_str: &str) -> Result<Self> {
        validate_pattern_safety(pattern_str)?;
        let pattern = Pattern::new(pattern_str)
            .with_context(|| format!("Invalid glob pattern: {pattern_str}"))?;

        Ok(Self {
            pattern,
            original_pattern: pattern_str.to_string(),
        })
    }

    pub fn matches(&self, identifier: &str) -> bool {
        self.pattern.matches_with(identifier, MATCH_OPTIONS)
    }

    pub fn pattern(&self) -> &str {
        &self.original_pattern
    }
}

/// Any-of selection over several patterns. An empty filter selects everything.
#[derive(Debug, Clone, Default)]
pub struct TemplateFilter {
    matchers: Vec<PatternMatcher>,
}

impl TemplateFilter {
    pub fn new(patterns: &[String]) -> Result<Self> {
        let matchers =
            patterns.iter().map(|p| PatternMatcher::new(p)).collect::<Result<Vec<_>>>()?;
        Ok(Self {
            matchers,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }

    pub fn matches(&self, identifier: &str) -> bool {
        self.matchers.is_empty() || self.matchers.iter().any(|m| m.matches(identifier))
    }

    /// Matching identifiers, in input order.
    pub fn apply(&self, identifiers: &[String]) -> Vec<String> {
        let selected: Vec<String> =
            identifiers.iter().filter(|id| self.matches(id)).cloned().collect();
        if !self.is_empty() {
            debug!(
                "Pattern filter [{}] selected {} of {} templates",
                self.matchers.iter().map(PatternMatcher::pattern).collect::<Vec<_>>().join(", "),
                selected.len(),
                identifiers.len()
            );
        }
        selected
    }
}

/// Reject patterns that could never match a relative identifier.
pub fn validate_pattern_safety(pattern: &str) -> Result<()> {
    if pattern.contains("..") {
        anyhow::bail!("Pattern contains path traversal (..): {pattern}");
    }

    if pattern.starts_with('/') || pattern.contains('\\') {
        anyhow::bail!("Pattern must be a relative, '/'-separated identifier glob: {pattern}");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_star_does_not_cross_separator() {
        let matcher = PatternMatcher::new("zerver/*.html").unwrap();
        assert!(matcher.matches("zerver/login.html"));
        assert!(!matcher.matches("zerver/help/main.html"));
        assert!(!matcher.matches("analytics/stats.html"));
    }

    #[test]
    fn test_double_star() {
        let matcher = PatternMatcher::new("**/*.txt").unwrap();
        assert!(matcher.matches("zerver/emails/invitation.txt"));
        assert!(!matcher.matches("zerver/login.html"));
    }

    #[test]
    fn test_filter_any_of() {
        let filter = TemplateFilter::new(&ids(&["analytics/*", "zerver/terms.html"])).unwrap();
        let all = ids(&["analytics/activity.html", "zerver/login.html", "zerver/terms.html"]);
        assert_eq!(filter.apply(&all), ids(&["analytics/activity.html", "zerver/terms.html"]));
    }

    #[test]
    fn test_empty_filter_selects_all() {
        let filter = TemplateFilter::new(&[]).unwrap();
        let all = ids(&["a.html", "b.txt"]);
        assert_eq!(filter.apply(&all), all);
    }

    #[test]
    fn test_rejects_unsafe_patterns() {
        assert!(PatternMatcher::new("../*.html").is_err());
        assert!(PatternMatcher::new("/etc/*").is_err());
        assert!(PatternMatcher::new("zerver/[").is_err());
    }
}
