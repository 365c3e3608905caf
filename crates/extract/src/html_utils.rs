// ABOUTME: HTML text helpers shared by the extractor, combiner and query output.
// ABOUTME: Provides fragment text extraction, tag stripping, first-line summaries and escaping.

use scraper::Html;

/// Returns the text content of an HTML fragment with entities decoded.
/// Line breaks in the source text are preserved.
pub fn fragment_text(html: &str) -> String {
    if html.is_empty() {
        return String::new();
    }
    let fragment = Html::parse_fragment(html);
    fragment.root_element().text().collect()
}

/// Strips HTML tags from a fragment, returning whitespace-collapsed plain text.
pub fn strip_html(html: &str) -> String {
    collapse_whitespace(&fragment_text(html))
}

/// First line of a text block (split on `\n`), trimmed.
pub fn first_line(text: &str) -> &str {
    text.split('\n').next().unwrap_or("").trim()
}

/// Flattened one-line summary of a description fragment.
pub fn summary_line(description_html: &str) -> String {
    first_line(&fragment_text(description_html)).to_string()
}

/// Escapes text for use as element content.
pub fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escapes text for use inside a double-quoted attribute value.
pub fn escape_attr(s: &str) -> String {
    escape_text(s).replace('"', "&quot;")
}

/// Collapses multiple whitespace characters into single spaces.
pub fn collapse_whitespace(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut last_was_space = false;

    for c in s.chars() {
        if c.is_whitespace() {
            if !last_was_space {
                result.push(' ');
                last_was_space = true;
            }
        } else {
            result.push(c);
            last_was_space = false;
        }
    }

    result.trim().to_string()
}
