use serde::{Deserialize, Serialize};
use std::fmt::Display;

mod movie;

pub use movie::{Genre, Movie};

/// Label shown in place of a genre for mood-based picks
pub const AI_PICK_LABEL: &str = "AI Pick";

/// Kind of supplementary content that can be unlocked for a movie
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Quote,
    Trivia,
}

impl Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentKind::Quote => write!(f, "quote"),
            ContentKind::Trivia => write!(f, "trivia"),
        }
    }
}

/// Supplementary content unlocked for the displayed movie
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExtraContent {
    pub kind: ContentKind,
    pub text: String,
}

/// Lifecycle of the single active selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Animating,
    Settled,
}

/// Read-only view of the selection handed to the presentation layer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SelectionSnapshot {
    pub phase: Phase,
    pub active_genre: Option<String>,
    /// Whatever the slot machine is currently showing
    pub displayed_movie: Option<Movie>,
    /// Only revealed once the selection has settled
    pub final_movie: Option<Movie>,
    /// A mood-based recommendation is in flight
    pub mood_pending: bool,
    pub loading_extra: Option<ContentKind>,
    pub extra: Option<ExtraContent>,
    pub trailer_url: Option<String>,
}

/// Whether a command changed the selection or was dropped as a duplicate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandOutcome {
    Applied,
    Ignored,
}

/// Body returned by every selection command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResponse {
    pub outcome: CommandOutcome,
    pub selection: SelectionSnapshot,
}
