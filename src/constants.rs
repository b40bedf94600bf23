//! Constants shared across tplcheck modules.
//!
//! File names, defaults for `tplcheck.toml`, and the fixed values used by the
//! dummy template context.

/// Name of the project configuration file searched for by the CLI.
pub const CONFIG_FILE_NAME: &str = "tplcheck.toml";

/// Template directory used when the configuration does not list any.
pub const DEFAULT_TEMPLATE_DIR: &str = "templates";

/// Maximum size of a markdown file embedded through `render_markdown_path` (1 MiB).
pub const DEFAULT_MAX_CONTENT_FILE_SIZE: u64 = 1024 * 1024;

/// Email of the fixture user whose profile fills `user` and `user_profile`.
pub const DEFAULT_USER_EMAIL: &str = "hamlet@zulip.com";

/// Product name configured for the site-wide context.
pub const DEFAULT_PRODUCT_NAME: &str = "Zulip";

/// Host name configured for the site-wide context.
pub const DEFAULT_EXTERNAL_HOST: &str = "localhost:9991";

/// Address `tplcheck serve` binds to.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:9991";

/// Marker key set in every dummy context. A render whose context carries
/// `shallow_tested = true` only proves the template does not crash.
pub const SHALLOW_TESTED_KEY: &str = "shallow_tested";

/// Help article rendered when a dummy context is used.
pub const DEFAULT_HELP_ARTICLE: &str = "zerver/help/index.md";

/// Value returned by the `current_url()` callable in the dummy context.
pub const DUMMY_CURRENT_URL: &str = "www.zulip.com";

/// Extension of markdown sources; never enumerated as templates.
pub const MARKDOWN_EXTENSION: &str = "md";
