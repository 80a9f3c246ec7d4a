//! Title/body extraction from free-form model text.
//!
//! Models are asked to put the title in bold. The first `**...**` span on a
//! single line is the title; everything else is the body. Nothing here
//! depends on script or language.

use std::sync::LazyLock;

use regex::Regex;

static BOLD_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("literal pattern compiles"));

/// Where a parsed title came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleSource {
    /// A bold span in the model text.
    Marker,
    /// No bold span; the caller's fallback was used.
    Fallback,
}

/// A title/body pair extracted from model text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedStory {
    /// Story title.
    pub title: String,
    /// Story body.
    pub content: String,
    /// Whether the title was found or defaulted.
    pub title_source: TitleSource,
}

/// Splits model text into a title and body.
///
/// With a bold span, the span's inner text is the title and the body is the
/// input with that span removed, trimmed. Without one, the title is
/// `fallback_title` and the body is the input unchanged.
#[must_use]
pub fn extract_titled_story(text: &str, fallback_title: &str) -> ParsedStory {
    match BOLD_SPAN.captures(text) {
        Some(captures) => {
            let span = captures.get(0).map_or(0..0, |m| m.range());
            let title = captures.get(1).map_or("", |m| m.as_str());
            let mut content = String::with_capacity(text.len());
            content.push_str(&text[..span.start]);
            content.push_str(&text[span.end..]);
            ParsedStory {
                title: title.to_owned(),
                content: content.trim().to_owned(),
                title_source: TitleSource::Marker,
            }
        }
        None => ParsedStory {
            title: fallback_title.to_owned(),
            content: text.to_owned(),
            title_source: TitleSource::Fallback,
        },
    }
}

/// Unwraps every bold span, keeping its inner text.
#[must_use]
pub fn strip_bold_markers(text: &str) -> String {
    BOLD_SPAN.replace_all(text, "$1").into_owned()
}
