//! Generic TOML parsing with file path context.
//!
//! ```rust,no_run
//! use tplcheck_cli::config::parse_config;
//! use serde::Deserialize;
//! use std::path::Path;
//!
//! #[derive(Deserialize)]
//! struct Settings {
//!     template_dirs: Vec<String>,
//! }
//!
//! # fn example() -> anyhow::Result<()> {
//! let settings: Settings = parse_config(Path::new("tplcheck.toml"))?;
//! println!("{} template directories", settings.template_dirs.len());
//! # Ok(())
//! # }
//! ```
//!
//! Errors carry two levels of context, the operation and the file, with the
//! underlying I/O or TOML error preserved as the cause:
//!
//! ```text
//! Failed to parse config file: /path/to/tplcheck.toml
//! Caused by:
//!     invalid type: string "yes", expected a boolean
//! ```

use anyhow::{Context, Result};
use std::path::Path;

/// Parse a TOML configuration file into the specified type.
///
/// # Errors
///
/// - the file cannot be read ("Failed to read config file: ...")
/// - the content is not valid TOML or does not match `T`
///   ("Failed to parse config file: ...")
pub fn parse_config<T>(path: &Path) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: T = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    Ok(config)
}
