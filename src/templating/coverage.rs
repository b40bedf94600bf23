//! Render coverage recording.
//!
//! A smoke render only proves that a template does not crash. The recorder
//! tells those renders (context carries `shallow_tested = true`) apart from
//! functional ones, so templates that never had a real test can be listed.

use dashmap::DashMap;
use serde::Serialize;

/// Counts renders per template, split by kind. Safe to share across threads.
#[derive(Debug, Default)]
pub struct RenderRecorder {
    shallow: DashMap<String, usize>,
    functional: DashMap<String, usize>,
}

impl RenderRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one successful render of `template`.
    pub fn record(&self, template: &str, shallow: bool) {
        let target = if shallow {
            &self.shallow
        } else {
            &self.functional
        };
        *target.entry(template.to_string()).or_insert(0) += 1;
    }

    pub fn shallow_count(&self, template: &str) -> usize {
        self.shallow.get(template).map_or(0, |count| *count)
    }

    pub fn functional_count(&self, template: &str) -> usize {
        self.functional.get(template).map_or(0, |count| *count)
    }

    /// Templates from `all` that never had a functional render, in input order.
    pub fn untested(&self, all: &[String]) -> Vec<String> {
        all.iter().filter(|t| !self.functional.contains_key(t.as_str())).cloned().collect()
    }

    pub fn clear(&self) {
        self.shallow.clear();
        self.functional.clear();
    }

    /// Summarize coverage over `all`.
    pub fn report(&self, all: &[String]) -> CoverageReport {
        let mut report = CoverageReport {
            total: all.len(),
            ..CoverageReport::default()
        };

        for template in all {
            if self.functional.contains_key(template.as_str()) {
                report.functional.push(template.clone());
            } else if self.shallow.contains_key(template.as_str()) {
                report.shallow_only.push(template.clone());
            } else {
                report.never_rendered.push(template.clone());
            }
        }

        report
    }
}

/// Coverage summary produced by [`RenderRecorder::report`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CoverageReport {
    pub total: usize,
    pub functional: Vec<String>,
    pub shallow_only: Vec<String>,
    pub never_rendered: Vec<String>,
}
