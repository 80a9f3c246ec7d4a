//! The story currently being read.

use std::fmt;

use apnatoon_core::rng::{DeterministicRng, next_uuid};
use serde::{Deserialize, Serialize};

/// Opaque story identifier.
///
/// Repository stories keep their repository key; generated stories get a
/// synthesized `<prefix>-<uuid>` id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoryId(String);

impl StoryId {
    /// Wraps an existing key.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Synthesizes a fresh id from the RNG.
    #[must_use]
    pub fn synthesized(prefix: &str, rng: &mut dyn DeterministicRng) -> Self {
        Self(format!("{prefix}-{}", next_uuid(rng)))
    }

    /// The id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Cosmetic presentation keys. Passed through untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Styling {
    /// Cover gradient.
    pub gradient: Option<String>,
    /// Category badge accent.
    pub accent: Option<String>,
    /// Estimated read time label.
    pub read_time: Option<String>,
    /// Cover icon key.
    pub icon: Option<String>,
}

impl Styling {
    /// The styling given to stories written by the generative service.
    #[must_use]
    pub fn magic() -> Self {
        Self {
            gradient: Some("from-pink-400 to-purple-500".to_owned()),
            accent: Some("bg-purple-100 text-purple-700".to_owned()),
            read_time: Some("2 min".to_owned()),
            icon: Some("magic".to_owned()),
        }
    }
}

/// A story as stored in the content repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryRecord {
    /// Repository key.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Display author.
    pub author: String,
    /// Category name.
    pub category: String,
    /// Story text, paragraphs separated by newlines.
    #[serde(default)]
    pub content: String,
    /// Cover gradient.
    #[serde(default)]
    pub gradient: Option<String>,
    /// Category badge accent.
    #[serde(default)]
    pub accent: Option<String>,
    /// Estimated read time label.
    #[serde(default)]
    pub read_time: Option<String>,
    /// Cover icon key.
    #[serde(default)]
    pub icon_type: Option<String>,
}

/// The story being read, with at most one cached translation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorySession {
    /// Story identifier.
    pub id: StoryId,
    /// Display title.
    pub title: String,
    /// Display author.
    pub author: String,
    /// Category name.
    pub category: String,
    /// Cosmetic keys.
    pub styling: Styling,
    content: Vec<String>,
    original_content: Option<Vec<String>>,
}

impl StorySession {
    /// Creates an untranslated session from newline-separated text.
    #[must_use]
    pub fn new(
        id: StoryId,
        title: impl Into<String>,
        author: impl Into<String>,
        category: impl Into<String>,
        text: &str,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            author: author.into(),
            category: category.into(),
            styling: Styling::default(),
            content: split_paragraphs(text),
            original_content: None,
        }
    }

    /// Replaces the cosmetic keys.
    #[must_use]
    pub fn with_styling(mut self, styling: Styling) -> Self {
        self.styling = styling;
        self
    }

    /// The displayed paragraphs, possibly a translation.
    #[must_use]
    pub fn paragraphs(&self) -> &[String] {
        &self.content
    }

    /// The displayed text, paragraphs joined by newlines.
    #[must_use]
    pub fn text(&self) -> String {
        self.content.join("\n")
    }

    /// The pre-translation paragraphs, present iff a translation is shown.
    #[must_use]
    pub fn original_paragraphs(&self) -> Option<&[String]> {
        self.original_content.as_deref()
    }

    /// Whether the displayed text is a translation.
    #[must_use]
    pub fn is_translated(&self) -> bool {
        self.original_content.is_some()
    }

    /// Shows `translated` and caches the current text for revert.
    ///
    /// The cache always holds the untranslated text; applying over an
    /// existing translation replaces the shown text but keeps the cache.
    pub fn apply_translation(&mut self, translated: &str) {
        let shown = std::mem::replace(&mut self.content, split_paragraphs(translated));
        if self.original_content.is_none() {
            self.original_content = Some(shown);
        }
    }

    /// Restores the cached text. Returns `false` if nothing was cached.
    pub fn revert_translation(&mut self) -> bool {
        match self.original_content.take() {
            Some(original) => {
                self.content = original;
                true
            }
            None => false,
        }
    }

    /// Drops any cached original, keeping the displayed text.
    pub fn discard_translation(&mut self) {
        self.original_content = None;
    }

    /// The last `max_chars` characters of the displayed text.
    #[must_use]
    pub fn trailing_excerpt(&self, max_chars: usize) -> String {
        let text = self.text();
        if max_chars == 0 {
            return String::new();
        }
        match text.char_indices().rev().nth(max_chars - 1) {
            Some((start, _)) => text[start..].to_owned(),
            None => text,
        }
    }
}

impl From<StoryRecord> for StorySession {
    fn from(record: StoryRecord) -> Self {
        Self::new(
            StoryId::new(record.id),
            record.title,
            record.author,
            record.category,
            &record.content,
        )
        .with_styling(Styling {
            gradient: record.gradient,
            accent: record.accent,
            read_time: record.read_time,
            icon: record.icon_type,
        })
    }
}

fn split_paragraphs(text: &str) -> Vec<String> {
    text.split('\n').map(str::to_owned).collect()
}
