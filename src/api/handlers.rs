use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    error::AppResult,
    middleware::RequestId,
    models::{CommandOutcome, CommandResponse, ContentKind, Genre, Movie, SelectionSnapshot},
};

use super::AppState;

// Request types

#[derive(Debug, Deserialize)]
pub struct PickGenreRequest {
    pub genre: String,
}

#[derive(Debug, Deserialize)]
pub struct PickMoodRequest {
    pub mood: String,
}

#[derive(Debug, Deserialize)]
pub struct ExtraRequest {
    pub kind: ContentKind,
}

async fn respond(state: &AppState, outcome: CommandOutcome) -> Json<CommandResponse> {
    Json(CommandResponse {
        outcome,
        selection: state.controller.snapshot().await,
    })
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Genre tiles in display order
pub async fn list_genres(State(state): State<AppState>) -> Json<Vec<Genre>> {
    Json(state.catalog.list_genres())
}

/// Candidate movies for one genre; unknown genres give an empty list
pub async fn genre_movies(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Json<Vec<Movie>> {
    Json(state.catalog.candidates_for(&name))
}

/// Current selection snapshot, polled by the UI during a reveal
pub async fn get_selection(State(state): State<AppState>) -> Json<SelectionSnapshot> {
    Json(state.controller.snapshot().await)
}

/// Start a slot-machine reveal for a genre
pub async fn pick_genre(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<PickGenreRequest>,
) -> AppResult<Json<CommandResponse>> {
    tracing::info!(request_id = %request_id, genre = %request.genre, "Genre pick");

    let outcome = state.controller.pick_from_genre(&request.genre).await?;
    Ok(respond(&state, outcome).await)
}

/// Ask the AI for a movie matching a mood
pub async fn pick_mood(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<PickMoodRequest>,
) -> AppResult<Json<CommandResponse>> {
    tracing::info!(
        request_id = %request_id,
        mood_len = request.mood.len(),
        "Mood pick"
    );

    let outcome = state.controller.pick_from_mood(&request.mood).await?;

    tracing::info!(request_id = %request_id, outcome = ?outcome, "Mood pick finished");
    Ok(respond(&state, outcome).await)
}

/// Spin the active genre again
pub async fn replay(State(state): State<AppState>) -> AppResult<Json<CommandResponse>> {
    let outcome = state.controller.replay().await?;
    Ok(respond(&state, outcome).await)
}

/// Back to the home screen
pub async fn reset(State(state): State<AppState>) -> Json<CommandResponse> {
    state.controller.reset().await;
    respond(&state, CommandOutcome::Applied).await
}

/// Unlock a quote or trivia fact for the settled movie
pub async fn fetch_extra(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<ExtraRequest>,
) -> AppResult<Json<CommandResponse>> {
    tracing::info!(request_id = %request_id, kind = %request.kind, "Extra requested");

    let outcome = state.controller.fetch_extra(request.kind).await?;
    Ok(respond(&state, outcome).await)
}
