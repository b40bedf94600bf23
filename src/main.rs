//! tplcheck CLI entry point
//!
//! Parses arguments, runs the selected command and turns any error into a
//! colored message with a suggestion before exiting with status 1.

use anyhow::Result;
use clap::Parser;
use tplcheck_cli::cli;
use tplcheck_cli::core::error::user_friendly_error;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            user_friendly_error(e).display();
            std::process::exit(1);
        }
    }
}
