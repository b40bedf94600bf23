//! `tplcheck render` - render one template and print the result.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use super::common::{CommandContext, parse_assignment};
use crate::templating::{RenderContext, render_single};

/// Render a single template with the dummy context.
#[derive(Args, Debug)]
pub struct RenderCommand {
    /// Template identifier, e.g. `zerver/login.html`
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Override a context variable; VALUE is JSON, or a plain string (repeatable)
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,

    /// Render without `shallow_tested`, as a functional test would
    #[arg(long)]
    pub functional: bool,
}

impl RenderCommand {
    pub async fn execute_with_config_path(self, config_path: Option<PathBuf>) -> Result<()> {
        let ctx = CommandContext::load(config_path.as_deref())?;

        let mut overrides = RenderContext::new();
        for assignment in &self.set {
            let (key, value) = parse_assignment(assignment)?;
            overrides.insert(key, value);
        }
        if self.functional {
            overrides.insert("shallow_tested", serde_json::Value::Bool(false));
        }

        let context = ctx.contexts().build(overrides)?;
        let renderer = ctx.loader().load()?;
        let output = render_single(&renderer, &self.name, &context)?;

        print!("{}", output);
        if !output.ends_with('\n') {
            println!();
        }
        Ok(())
    }
}
