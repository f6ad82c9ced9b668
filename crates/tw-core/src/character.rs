//! Characters and languages picked before a story starts.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The protagonist the story is told for.
///
/// Picked once before the story starts and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    /// Display name, also used as the generator's protagonist.
    pub name: String,
    /// One-line flavour description.
    pub description: String,
    /// Optional portrait URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Character {
    /// Create a character without a portrait.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            image_url: None,
        }
    }

    /// Attach a portrait URL.
    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }
}

impl fmt::Display for Character {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.name, self.description)
    }
}

/// A language the story can be told in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    /// Short code passed to the generator (e.g. `en`).
    pub code: String,
    /// English name of the language.
    pub name: String,
    /// Name of the language in the language itself.
    pub native_name: String,
}

impl Language {
    /// Create a language entry.
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        native_name: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            native_name: native_name.into(),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.native_name, self.name)
    }
}
