/// Generative-AI provider abstraction
///
/// The app talks to the model for two things: a single movie matching a free-text
/// mood, and short supplementary text (an iconic quote or a trivia fact) about a
/// movie that is already on screen. Both are behind traits so the controller and
/// cache can be exercised without the network.
use crate::{
    error::AppResult,
    models::{ContentKind, Movie},
};

pub mod gemini;

pub use gemini::GeminiProvider;

/// Turns a mood description into one movie recommendation
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RecommendationProvider: Send + Sync {
    /// Recommend one movie for a non-empty mood
    ///
    /// The returned movie always carries a `reason`. Any transport, parse or schema
    /// problem is reported as an error.
    async fn recommend(&self, mood: &str) -> AppResult<Movie>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}

/// Produces short supplementary text about a movie
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ContentProvider: Send + Sync {
    async fn fetch_content(&self, title: &str, year: &str, kind: ContentKind)
        -> AppResult<String>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}
