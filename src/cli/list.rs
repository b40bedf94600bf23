//! `tplcheck list` - show enumerated templates and their skip status.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;

use super::common::{CommandContext, OutputFormat};
use crate::templating::SkipReason;

/// List every template the loader finds.
#[derive(Args, Debug)]
pub struct ListCommand {
    /// Only show skipped templates
    #[arg(long)]
    pub skipped: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Debug, Serialize)]
struct TemplateEntry {
    name: String,
    skipped: bool,
    reasons: Vec<SkipReason>,
}

impl ListCommand {
    pub async fn execute_with_config_path(self, config_path: Option<PathBuf>) -> Result<()> {
        let ctx = CommandContext::load(config_path.as_deref())?;
        let skip_list = ctx.project.skip_list()?;

        let entries: Vec<TemplateEntry> = ctx
            .loader()
            .enumerate()?
            .into_iter()
            .map(|name| {
                let reasons = skip_list.reasons_for(&name);
                TemplateEntry {
                    skipped: !reasons.is_empty(),
                    name,
                    reasons,
                }
            })
            .filter(|entry| !self.skipped || entry.skipped)
            .collect();

        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            }
            OutputFormat::Text => {
                if entries.is_empty() {
                    println!("No templates found.");
                    return Ok(());
                }
                for entry in &entries {
                    if entry.skipped {
                        let reasons: Vec<&str> =
                            entry.reasons.iter().map(|reason| reason.as_str()).collect();
                        println!("  {} {} [{}]", "-".dimmed(), entry.name, reasons.join(", ").yellow());
                    } else {
                        println!("  {} {}", "✓".green(), entry.name);
                    }
                }
                let skipped = entries.iter().filter(|entry| entry.skipped).count();
                println!("\n{} templates, {} skipped", entries.len(), skipped);
            }
        }

        Ok(())
    }
}
