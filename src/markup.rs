//! HTML rendering for transcript content.
//!
//! Assistant messages are markdown and go through pulldown-cmark. User
//! messages are literal text and are only escaped, never parsed.

use pulldown_cmark::{CowStr, Event, Options, Parser, html};

/// Render markdown to HTML.
#[must_use]
pub fn markdown_to_html(input: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    let parser = Parser::new_ext(input, options);
    let mut output = String::new();
    html::push_html(&mut output, parser);
    output
}

/// Render literal text as escaped HTML.
///
/// The text is fed to the HTML writer as a single text event, so markdown
/// syntax and tags come out verbatim.
#[must_use]
pub fn text_to_html(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    html::push_html(
        &mut output,
        std::iter::once(Event::Text(CowStr::Borrowed(input))),
    );
    output
}

/// Wrap `body` in a fenced code block tagged with `lang`.
#[must_use]
pub fn fenced_block(lang: &str, body: &str) -> String {
    format!("```{lang}\n{body}\n```")
}
