/// Selection and reveal controller
///
/// Owns the single active selection. A genre pick draws the final movie up front,
/// then runs a slot-machine reveal: a fixed number of frames at a fixed cadence,
/// each showing an independent uniform draw from the same candidates, before the
/// pre-drawn movie is put on screen. A mood pick goes to the recommendation
/// provider instead and settles directly.
///
/// Every selection change bumps a generation counter. The reveal task, mood
/// responses and extra-content responses all check it before writing, so work
/// that belongs to a superseded selection is dropped.
use std::sync::Arc;
use std::time::Duration;

use rand::{rngs::StdRng, Rng};
use tokio::sync::Mutex;
use tokio::task::AbortHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::{
    error::{AppError, AppResult},
    models::{
        CommandOutcome, ContentKind, ExtraContent, Movie, Phase, SelectionSnapshot,
        AI_PICK_LABEL,
    },
    services::{
        catalog::CatalogProvider, extra_cache::ExtraContentCache,
        providers::RecommendationProvider,
    },
};

/// Shown in place of a quote or trivia fact when the provider fails
pub const EXTRA_FALLBACK_TEXT: &str = "AI is taking a nap. Try again later.";

const YOUTUBE_SEARCH_URL: &str = "https://www.youtube.com/results";

#[derive(Debug, Clone)]
pub struct SelectionSettings {
    /// Intermediate frames before the final pick is shown
    pub reveal_steps: u32,
    pub reveal_interval: Duration,
    /// Genre suggested to the user when a mood pick fails
    pub fallback_genre: String,
}

impl Default for SelectionSettings {
    fn default() -> Self {
        Self {
            reveal_steps: 12,
            reveal_interval: Duration::from_millis(80),
            fallback_genre: "Feel Good".to_string(),
        }
    }
}

/// Cancellation handle for a running reveal
///
/// Created when a reveal starts. Cancelling is immediate and may be repeated.
#[derive(Debug)]
pub struct RevealHandle {
    generation: u64,
    abort: AbortHandle,
}

impl RevealHandle {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn cancel(&self) {
        self.abort.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.abort.is_finished()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Origin {
    Genre(String),
    Mood,
}

struct SelectionState {
    phase: Phase,
    origin: Option<Origin>,
    displayed: Option<Movie>,
    final_movie: Option<Movie>,
    generation: u64,
    reveal: Option<RevealHandle>,
    mood_request: Option<u64>,
    next_request: u64,
    loading_extra: Option<ContentKind>,
    extra: Option<ExtraContent>,
    rng: StdRng,
}

impl SelectionState {
    fn new(rng: StdRng) -> Self {
        Self {
            phase: Phase::Idle,
            origin: None,
            displayed: None,
            final_movie: None,
            generation: 0,
            reveal: None,
            mood_request: None,
            next_request: 0,
            loading_extra: None,
            extra: None,
            rng,
        }
    }

    /// Ends whatever the previous selection was doing and opens a new generation
    fn supersede(&mut self) -> u64 {
        if let Some(reveal) = self.reveal.take() {
            reveal.cancel();
            tracing::debug!(generation = reveal.generation(), "Reveal cancelled");
        }
        self.generation += 1;
        self.mood_request = None;
        self.loading_extra = None;
        self.extra = None;
        self.generation
    }

    fn clear(&mut self) {
        self.phase = Phase::Idle;
        self.origin = None;
        self.displayed = None;
        self.final_movie = None;
    }

    fn snapshot(&self) -> SelectionSnapshot {
        let settled = self.phase == Phase::Settled;
        let final_movie = if settled { self.final_movie.clone() } else { None };
        let trailer_url = final_movie.as_ref().and_then(trailer_url);

        SelectionSnapshot {
            phase: self.phase,
            active_genre: self.origin.as_ref().map(|origin| match origin {
                Origin::Genre(name) => name.clone(),
                Origin::Mood => AI_PICK_LABEL.to_string(),
            }),
            displayed_movie: self.displayed.clone(),
            final_movie,
            mood_pending: self.mood_request.is_some(),
            loading_extra: self.loading_extra,
            extra: self.extra.clone(),
            trailer_url,
        }
    }
}

/// YouTube search link for "<title> <year> trailer"
pub fn trailer_url(movie: &Movie) -> Option<String> {
    let query = format!("{} {} trailer", movie.title, movie.year);
    reqwest::Url::parse_with_params(YOUTUBE_SEARCH_URL, &[("search_query", query)])
        .ok()
        .map(String::from)
}

pub struct SelectionController {
    catalog: Arc<dyn CatalogProvider>,
    recommender: Arc<dyn RecommendationProvider>,
    extras: Arc<ExtraContentCache>,
    settings: SelectionSettings,
    state: Arc<Mutex<SelectionState>>,
}

impl SelectionController {
    pub fn new(
        catalog: Arc<dyn CatalogProvider>,
        recommender: Arc<dyn RecommendationProvider>,
        extras: Arc<ExtraContentCache>,
        settings: SelectionSettings,
        rng: StdRng,
    ) -> Self {
        Self {
            catalog,
            recommender,
            extras,
            settings,
            state: Arc::new(Mutex::new(SelectionState::new(rng))),
        }
    }

    pub async fn snapshot(&self) -> SelectionSnapshot {
        self.state.lock().await.snapshot()
    }

    /// Starts a slot-machine reveal over the genre's candidates
    ///
    /// The final movie is drawn before the first frame and never re-rolled. Any
    /// reveal already running is cancelled first. An unknown or empty genre leaves
    /// the selection idle.
    pub async fn pick_from_genre(&self, genre: &str) -> AppResult<CommandOutcome> {
        let candidates: Arc<[Movie]> = self.catalog.candidates_for(genre).into();

        let mut state = self.state.lock().await;
        let generation = state.supersede();

        if candidates.is_empty() {
            state.clear();
            tracing::warn!(genre = %genre, "No candidates for genre");
            return Err(AppError::NoCandidates(genre.to_string()));
        }

        let index = state.rng.gen_range(0..candidates.len());
        let final_movie = candidates[index].clone();

        tracing::info!(
            genre = %genre,
            generation,
            candidates = candidates.len(),
            steps = self.settings.reveal_steps,
            "Reveal started"
        );

        state.phase = Phase::Animating;
        state.origin = Some(Origin::Genre(genre.to_string()));
        state.displayed = None;
        state.final_movie = Some(final_movie);

        let task = tokio::spawn(run_reveal(
            self.state.clone(),
            candidates,
            generation,
            self.settings.reveal_steps,
            self.settings.reveal_interval,
        ));
        state.reveal = Some(RevealHandle {
            generation,
            abort: task.abort_handle(),
        });

        Ok(CommandOutcome::Applied)
    }

    /// Asks the recommendation provider for a movie matching the mood
    ///
    /// Only one mood request may be outstanding; a second call while it is pending
    /// is ignored. A response that arrives after the selection moved on is dropped.
    /// On failure the current selection is left as it was.
    pub async fn pick_from_mood(&self, mood: &str) -> AppResult<CommandOutcome> {
        let mood = mood.trim();
        if mood.is_empty() {
            return Err(AppError::InvalidInput("Mood cannot be empty".to_string()));
        }

        let request = {
            let mut state = self.state.lock().await;
            if state.mood_request.is_some() {
                tracing::debug!("Mood pick already pending, ignoring");
                return Ok(CommandOutcome::Ignored);
            }
            state.next_request += 1;
            state.mood_request = Some(state.next_request);
            state.next_request
        };

        tracing::info!(request, provider = self.recommender.name(), "Mood pick requested");

        let result = self
            .recommender
            .recommend(mood)
            .await
            .and_then(|movie| match movie.reason {
                Some(_) => Ok(movie),
                None => Err(AppError::ExternalApi(
                    "Recommendation is missing a reason".to_string(),
                )),
            });

        let mut state = self.state.lock().await;
        if state.mood_request != Some(request) {
            tracing::info!(request, "Discarding stale mood response");
            return Ok(CommandOutcome::Ignored);
        }
        state.mood_request = None;

        match result {
            Ok(movie) => {
                let generation = state.supersede();
                tracing::info!(
                    request,
                    generation,
                    title = %movie.title,
                    "Mood pick settled"
                );

                state.phase = Phase::Settled;
                state.origin = Some(Origin::Mood);
                state.displayed = Some(movie.clone());
                state.final_movie = Some(movie);
                Ok(CommandOutcome::Applied)
            }
            Err(e) => {
                tracing::warn!(request, error = %e, "Mood pick failed");
                Err(AppError::RecommendationUnavailable {
                    reason: e.to_string(),
                    fallback_genre: self.settings.fallback_genre.clone(),
                })
            }
        }
    }

    /// Re-runs the reveal for the active genre
    ///
    /// Ignored while a reveal or mood request is in flight, and for mood picks,
    /// which have no genre to draw from.
    pub async fn replay(&self) -> AppResult<CommandOutcome> {
        let genre = {
            let state = self.state.lock().await;
            if state.phase == Phase::Animating || state.mood_request.is_some() {
                tracing::debug!("Replay ignored while busy");
                return Ok(CommandOutcome::Ignored);
            }
            match &state.origin {
                Some(Origin::Genre(name)) => name.clone(),
                _ => return Ok(CommandOutcome::Ignored),
            }
        };

        self.pick_from_genre(&genre).await
    }

    /// Cancels any reveal and returns to idle
    pub async fn reset(&self) {
        let mut state = self.state.lock().await;
        let generation = state.supersede();
        state.clear();
        tracing::info!(generation, "Selection reset");
    }

    /// Unlocks a quote or trivia fact for the settled movie
    ///
    /// Ignored unless a movie has settled and no other extra is loading. Provider
    /// failures are shown as a fallback message rather than an error.
    pub async fn fetch_extra(&self, kind: ContentKind) -> AppResult<CommandOutcome> {
        let (movie, generation) = {
            let mut state = self.state.lock().await;
            if state.phase != Phase::Settled || state.loading_extra.is_some() {
                tracing::debug!(kind = %kind, "Extra request ignored");
                return Ok(CommandOutcome::Ignored);
            }
            let Some(movie) = state.final_movie.clone() else {
                return Ok(CommandOutcome::Ignored);
            };
            state.loading_extra = Some(kind);
            state.extra = None;
            (movie, state.generation)
        };

        let text = match self.extras.fetch(&movie.title, &movie.year, kind).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, title = %movie.title, kind = %kind, "Showing extra fallback");
                EXTRA_FALLBACK_TEXT.to_string()
            }
        };

        let mut state = self.state.lock().await;
        if state.generation != generation {
            tracing::debug!(kind = %kind, "Discarding extra for superseded selection");
            return Ok(CommandOutcome::Ignored);
        }
        state.loading_extra = None;
        state.extra = Some(ExtraContent { kind, text });

        Ok(CommandOutcome::Applied)
    }
}

/// Drives one reveal: `steps` random frames, then the pre-drawn movie
///
/// Each frame re-checks the generation under the lock, so nothing is written once
/// the reveal has been superseded even if the abort has not landed yet.
async fn run_reveal(
    state: Arc<Mutex<SelectionState>>,
    candidates: Arc<[Movie]>,
    generation: u64,
    steps: u32,
    interval: Duration,
) {
    let interval = interval.max(Duration::from_millis(1));
    let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    for step in 1..=steps {
        ticker.tick().await;

        let mut state = state.lock().await;
        if state.generation != generation {
            return;
        }
        let index = state.rng.gen_range(0..candidates.len());
        state.displayed = Some(candidates[index].clone());
        tracing::trace!(generation, step, title = %candidates[index].title, "Reveal frame");
    }

    ticker.tick().await;

    let mut state = state.lock().await;
    if state.generation != generation {
        return;
    }
    state.displayed = state.final_movie.clone();
    state.phase = Phase::Settled;
    state.reveal = None;

    tracing::info!(
        generation,
        title = state.displayed.as_ref().map(|m| m.title.as_str()).unwrap_or_default(),
        "Reveal settled"
    );
}
