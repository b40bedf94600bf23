//! `tplcheck skips` - audit the skip list against the template tree.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use super::common::{CommandContext, OutputFormat};
use crate::templating::{SkipAudit, SkipList, SkipReason};

/// Show the skip partitions and report stale or conflicting entries.
#[derive(Args, Debug)]
pub struct SkipsCommand {
    /// Treat warnings as errors
    #[arg(long)]
    pub strict: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

impl SkipsCommand {
    pub async fn execute_with_config_path(self, config_path: Option<PathBuf>) -> Result<()> {
        let ctx = CommandContext::load(config_path.as_deref())?;
        let skip_list = ctx.project.skip_list()?;
        let templates = ctx.loader().enumerate()?;
        let audit = skip_list.audit(&templates);

        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&audit)?),
            OutputFormat::Text => print_text(&skip_list, &audit),
        }

        if self.strict && audit.has_warnings() {
            anyhow::bail!("Strict mode: {} skip list warning(s) treated as errors", audit.warning_count());
        }
        Ok(())
    }
}

fn print_text(skip_list: &SkipList, audit: &SkipAudit) {
    for reason in SkipReason::ALL {
        let entries = skip_list.partition(reason);
        if entries.is_empty() {
            continue;
        }
        println!("{} ({}): {}", reason.as_str().bold(), entries.len(), reason.description());
        for entry in entries {
            println!("  {}", entry);
        }
    }

    for entry in &audit.stale {
        println!("⚠ Warning: '{}' ({}) does not exist", entry.template, entry.reason);
    }
    for entry in &audit.multi_reason {
        let reasons: Vec<&str> = entry.reasons.iter().map(|reason| reason.as_str()).collect();
        println!("⚠ Warning: '{}' is listed under {}", entry.template, reasons.join(", "));
    }
    for entry in &audit.repeated {
        println!("  note: '{}' is listed twice under {}", entry.template, entry.reason);
    }

    if audit.has_warnings() {
        println!("{} {} warning(s)", "✗".red(), audit.warning_count());
    } else {
        println!("{} {} templates skipped, no warnings", "✓".green(), skip_list.identifiers().len());
    }
}
