//! Core types for tplcheck
//!
//! Application-level errors and their user-facing presentation. Template
//! rendering errors live in [`crate::templating::error`]; everything else that
//! can go wrong (configuration, template directories, fixture users, I/O) is a
//! [`TplcheckError`].

pub mod error;

pub use error::{ErrorContext, TplcheckError, user_friendly_error};
