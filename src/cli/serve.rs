//! `tplcheck serve` - serve the terms and help pages.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;

use super::common::CommandContext;
use crate::constants::DEFAULT_BIND_ADDR;
use crate::web::{self, WebState};

/// Run the HTTP surface until interrupted.
#[derive(Args, Debug)]
pub struct ServeCommand {
    /// Address to listen on
    #[arg(long, default_value = DEFAULT_BIND_ADDR)]
    pub bind: String,
}

impl ServeCommand {
    pub async fn execute_with_config_path(self, config_path: Option<PathBuf>) -> Result<()> {
        let ctx = CommandContext::load(config_path.as_deref())?;
        let renderer = ctx.loader().load()?;

        let state = Arc::new(WebState::new(
            renderer,
            ctx.project.config().site.clone(),
            ctx.project.markdown_root(),
        ));
        web::serve(state, &self.bind).await
    }
}
