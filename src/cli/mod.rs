//! Command-line interface for tplcheck.
//!
//! Each command lives in its own module with a clap `Args` struct and an
//! `execute_with_config_path` method. [`Cli`] parses the global flags, sets up
//! logging and dispatches.
//!
//! # Available Commands
//!
//! - `verify` - smoke-render every non-skipped template, then the deferred ones
//! - `list` - list enumerated templates and their skip reasons
//! - `render` - render one template with the dummy context and print it
//! - `skips` - show the skip partitions and audit them against the tree
//! - `serve` - serve `/terms/` and `/help/<article>` from the templates
//!
//! # Global Options
//!
//! - `--verbose` - debug logging
//! - `--quiet` - errors only
//! - `--config` - path to `tplcheck.toml` (default: search upward)
//!
//! `RUST_LOG` overrides the level chosen by the flags.
//!
//! # Example
//!
//! ```bash
//! tplcheck verify
//! tplcheck verify --only 'zerver/*' --format json
//! tplcheck render zerver/login.html --set product_name=Zulip
//! tplcheck skips --strict
//! ```

pub mod common;
mod list;
mod render;
mod serve;
mod skips;
mod verify;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

pub use common::OutputFormat;
pub use verify::VerifyResults;

/// Runtime configuration derived from the global flags.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Log level filter; `RUST_LOG` takes precedence when set
    pub log_level: String,

    /// Explicit path to `tplcheck.toml`
    pub config_path: Option<PathBuf>,
}

impl CliConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            log_level: "info".to_string(),
            config_path: None,
        }
    }

    /// Install the global tracing subscriber, writing to stderr.
    ///
    /// Does nothing when a subscriber is already installed.
    pub fn init_logging(&self) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&self.log_level));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "tplcheck",
    about = "Render-verify every server-side template with dummy context",
    version,
    long_about = "tplcheck loads an application's templates, renders each one with synthetic \
                  context data and fails on the first template that cannot render."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Path to tplcheck.toml
    #[arg(short, long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Smoke-render every non-skipped template
    Verify(verify::VerifyCommand),

    /// List templates and their skip status
    List(list::ListCommand),

    /// Render one template and print it
    Render(render::RenderCommand),

    /// Show and audit the skip list
    Skips(skips::SkipsCommand),

    /// Serve the terms and help pages
    Serve(serve::ServeCommand),
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "info"
        };

        CliConfig {
            log_level: log_level.to_string(),
            config_path: self.config.clone(),
        }
    }

    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        config.init_logging();
        let config_path = config.config_path;

        match self.command {
            Commands::Verify(cmd) => cmd.execute_with_config_path(config_path).await,
            Commands::List(cmd) => cmd.execute_with_config_path(config_path).await,
            Commands::Render(cmd) => cmd.execute_with_config_path(config_path).await,
            Commands::Skips(cmd) => cmd.execute_with_config_path(config_path).await,
            Commands::Serve(cmd) => cmd.execute_with_config_path(config_path).await,
        }
    }
}
