//! Best-effort parser for web-search citation blocks.
//!
//! Search tool results are plain text made of blocks like:
//!
//! ```text
//! [1] Rust 1.80 released - https://blog.rust-lang.org/2024/07/25/Rust-1.80.0.html
//! LazyCell and LazyLock are now stable...
//! ```
//!
//! Text that does not match yields no results; parsing never fails.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// One cited search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub content: String,
}

fn header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)\[(\d+)\]\s+(.+?)\s+-\s+(https?://\S+)\s*\n").expect("Invalid regex")
    })
}

/// Extracts every `[N] Title - URL` block and the content that follows it.
///
/// A block's content runs up to the next line starting with `[`, the next blank
/// line, or the end of the text.
pub fn parse_citations(text: &str) -> Vec<SearchResult> {
    let mut results = Vec::new();
    let mut pos = 0;

    while let Some(caps) = header_re().captures_at(text, pos) {
        let (Some(header), Some(title), Some(url)) = (caps.get(0), caps.get(2), caps.get(3)) else {
            break;
        };
        let content_start = header.end();
        let Some(content_end) = content_end(text, content_start) else {
            break;
        };

        results.push(SearchResult {
            title: title.as_str().trim().to_string(),
            url: url.as_str().trim().to_string(),
            content: text[content_start..content_end].trim().to_string(),
        });
        pos = content_end;
    }

    results
}

/// End of a content block starting at `start`; `None` if nothing follows the header.
///
/// Content holds at least one character.
fn content_end(text: &str, start: usize) -> Option<usize> {
    let first = text[start..].chars().next()?;
    let min_end = start + first.len_utf8();

    let boundary = ["\n[", "\n\n"]
        .iter()
        .filter_map(|pat| text[min_end..].find(pat))
        .min()
        .map(|offset| min_end + offset);

    // end of text, or just before a single trailing newline
    let end_of_text = if text.ends_with('\n') && text.len() - 1 >= min_end {
        text.len() - 1
    } else {
        text.len()
    };

    Some(boundary.map_or(end_of_text, |b| b.min(end_of_text)))
}
