use serde::{Deserialize, Serialize};

/// A movie as shown on the result card
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Movie {
    pub title: String,
    pub year: String,
    pub desc: String,
    pub emoji: String,
    /// Why the AI picked this movie; only set for mood-based picks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Movie {
    pub fn new(
        title: impl Into<String>,
        year: impl Into<String>,
        desc: impl Into<String>,
        emoji: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            year: year.into(),
            desc: desc.into(),
            emoji: emoji.into(),
            reason: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Text shown under the title: the AI reason wins over the catalog blurb
    pub fn blurb(&self) -> &str {
        self.reason.as_deref().unwrap_or(&self.desc)
    }
}

/// A genre tile on the home screen
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Genre {
    /// Unique key, also used to look up candidates
    pub name: String,
    pub icon: String,
    pub color: String,
    pub gradient: String,
    pub desc: String,
}
