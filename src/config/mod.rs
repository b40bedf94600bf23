//! Configuration for tplcheck.
//!
//! A project is described by a `tplcheck.toml` file (see [`project`]) that
//! names the template directories, the markdown root, the fixture user for the
//! dummy context, site-wide values for the web surface and optionally a
//! replacement skip list. The CLI finds the file by searching upward from the
//! working directory unless `--config` is given.
//!
//! # Modules
//!
//! - `parser` - generic TOML parsing with file path context
//! - `project` - the `tplcheck.toml` schema and path resolution

mod parser;
pub mod project;

pub use parser::parse_config;
pub use project::{Project, ProjectConfig, SiteConfig, find_config_from};
