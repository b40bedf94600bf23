//! Integration test suite for tplcheck
//!
//! End-to-end tests against the template tree shipped in `templates/`.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **templates**: smoke pass over the whole tree, the deferred pass,
//!   markdown embedding and render error behavior
//! - **web**: `/terms/` and `/help/<article>` through the axum router
//! - **cli**: the `tplcheck` binary run against the repository config

mod cli;
mod templates;
mod web;
