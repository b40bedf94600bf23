//! Markdown to HTML rendering for help articles and terms pages.
//!
//! Templates embed markdown through the `render_markdown_path` filter (see
//! [`crate::templating::filters`]); this module only turns markdown source into
//! HTML. The output follows CommonMark with tables and strikethrough enabled,
//! and every heading gets an `id` anchor derived from its text:
//!
//! ```rust
//! use tplcheck_cli::markdown::render_markdown;
//!
//! let html = render_markdown("# Hello!\n\nThis is some *bold text*.\n");
//! assert!(html.starts_with("<h1 id=\"hello\">Hello!</h1>"));
//! ```
//!
//! Headings that already carry an explicit id (`# Title {#custom}`) keep it.
//! Repeated slugs within one document are suffixed with `-1`, `-2`, ...

use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, TagEnd, html};
use std::collections::HashMap;

fn parser_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_HEADING_ATTRIBUTES);
    options
}

/// Render markdown source to an HTML fragment.
pub fn render_markdown(source: &str) -> String {
    let mut events: Vec<Event<'_>> = Parser::new_ext(source, parser_options()).collect();
    assign_heading_ids(&mut events);

    let mut output = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut output, events.into_iter());
    output
}

/// Turn heading text into an anchor id.
///
/// Lowercases, keeps alphanumerics, collapses runs of whitespace, `-` and `_`
/// into a single `-`, and drops everything else.
///
/// ```rust
/// use tplcheck_cli::markdown::slugify;
///
/// assert_eq!(slugify("Hello!"), "hello");
/// assert_eq!(slugify("Message  formatting_rules"), "message-formatting-rules");
/// ```
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_separator = false;

    for ch in text.chars() {
        if ch.is_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.extend(ch.to_lowercase());
        } else if ch.is_whitespace() || ch == '-' || ch == '_' {
            pending_separator = true;
        }
    }

    slug
}

fn assign_heading_ids(events: &mut [Event<'_>]) {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut index = 0;

    while index < events.len() {
        if !matches!(&events[index], Event::Start(Tag::Heading { id: None, .. })) {
            index += 1;
            continue;
        }

        let mut text = String::new();
        let mut end = index + 1;
        while end < events.len() {
            match &events[end] {
                Event::End(TagEnd::Heading(_)) => break,
                Event::Text(t) | Event::Code(t) => text.push_str(t),
                _ => {}
            }
            end += 1;
        }

        let base = slugify(&text);
        if !base.is_empty() {
            let count = seen.entry(base.clone()).or_insert(0);
            let slug = if *count == 0 {
                base
            } else {
                format!("{}-{}", base, count)
            };
            *count += 1;

            if let Event::Start(Tag::Heading {
                id,
                ..
            }) = &mut events[index]
            {
                *id = Some(CowStr::from(slug));
            }
        }

        index = end + 1;
    }
}
