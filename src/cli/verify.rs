//! `tplcheck verify` - smoke-render the template tree.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

use super::common::{CommandContext, OutputFormat};
use crate::pattern::TemplateFilter;
use crate::templating::{
    CoverageReport, RenderRecorder, SkipList, SkipReason, SmokeReport, TemplateError, smoke_pass,
};

/// Render every non-skipped template with the dummy context.
#[derive(Args, Debug)]
pub struct VerifyCommand {
    /// Only render templates matching this glob (repeatable)
    #[arg(long = "only", value_name = "GLOB")]
    pub only: Vec<String>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Report which templates only ever had shallow renders
    #[arg(long)]
    pub coverage: bool,
}

/// JSON output of `verify`.
#[derive(Debug, Default, Serialize)]
pub struct VerifyResults {
    pub valid: bool,
    pub total: usize,
    pub rendered: usize,
    pub deferred_rendered: usize,
    pub skipped: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_template: Option<String>,
    pub errors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coverage: Option<CoverageReport>,
}

impl VerifyCommand {
    pub async fn execute_with_config_path(self, config_path: Option<PathBuf>) -> Result<()> {
        let ctx = CommandContext::load(config_path.as_deref())?;
        let loader = ctx.loader();

        let filter = TemplateFilter::new(&self.only)?;
        let templates = filter.apply(&loader.enumerate()?);

        let mut skip_list = ctx.project.skip_list()?;
        if !filter.is_empty() {
            skip_list = narrow_deferred(&skip_list, &filter);
        }

        let recorder = Arc::new(RenderRecorder::new());
        let mut renderer = loader.load()?;
        if self.coverage {
            renderer = renderer.with_recorder(recorder.clone());
        }

        let outcome = smoke_pass(&renderer, &templates, &skip_list, &ctx.contexts());
        let coverage = self.coverage.then(|| recorder.report(&templates));

        match outcome {
            Ok(report) => {
                self.print_success(&report, templates.len(), coverage)?;
                Ok(())
            }
            Err(e) => {
                if self.format == OutputFormat::Json {
                    let results = VerifyResults {
                        valid: false,
                        total: templates.len(),
                        failed_template: e
                            .downcast_ref::<TemplateError>()
                            .map(|te| te.template().to_string()),
                        errors: vec![format!("{:#}", e)],
                        coverage,
                        ..VerifyResults::default()
                    };
                    println!("{}", serde_json::to_string_pretty(&results)?);
                } else {
                    println!("{} Template verification failed", "✗".red());
                }
                Err(e)
            }
        }
    }

    fn print_success(
        &self,
        report: &SmokeReport,
        total: usize,
        coverage: Option<CoverageReport>,
    ) -> Result<()> {
        match self.format {
            OutputFormat::Json => {
                let results = VerifyResults {
                    valid: true,
                    total,
                    rendered: report.rendered,
                    deferred_rendered: report.deferred_rendered,
                    skipped: report.skipped,
                    failed_template: None,
                    errors: Vec::new(),
                    coverage,
                };
                println!("{}", serde_json::to_string_pretty(&results)?);
            }
            OutputFormat::Text => {
                println!(
                    "{} Rendered {} templates ({} deferred, {} skipped)",
                    "✓".green(),
                    report.rendered,
                    report.deferred_rendered,
                    report.skipped
                );

                if let Some(coverage) = coverage {
                    print_coverage(&coverage);
                }
            }
        }
        Ok(())
    }
}

/// Keep only the deferred entries the filter selects; other partitions are untouched.
fn narrow_deferred(skip_list: &SkipList, filter: &TemplateFilter) -> SkipList {
    let mut narrowed = SkipList::new();
    for reason in SkipReason::ALL {
        let entries = skip_list.partition(reason);
        if reason == SkipReason::Defer {
            narrowed.extend(reason, entries.iter().map(String::as_str).filter(|t| filter.matches(t)));
        } else {
            narrowed.extend(reason, entries.iter().map(String::as_str));
        }
    }
    narrowed
}

fn print_coverage(coverage: &CoverageReport) {
    println!(
        "\nCoverage: {} functional, {} shallow only, {} never rendered (of {})",
        coverage.functional.len(),
        coverage.shallow_only.len(),
        coverage.never_rendered.len(),
        coverage.total
    );
    for template in &coverage.shallow_only {
        println!("  {} {} (shallow only)", "⚠".yellow(), template);
    }
    for template in &coverage.never_rendered {
        println!("  {} {} (never rendered)", "-".dimmed(), template);
    }
}
