use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("No movies available for genre: {0}")]
    NoCandidates(String),

    /// Carries the genre the user is pointed at instead of the AI pick
    #[error("Recommendation unavailable: {reason}")]
    RecommendationUnavailable {
        reason: String,
        fallback_genre: String,
    },

    #[error("Content unavailable: {0}")]
    ContentUnavailable(String),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("External API error: {0}")]
    ExternalApi(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::NoCandidates(_) => (
                StatusCode::NOT_FOUND,
                json!({ "error": self.to_string() }),
            ),
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            AppError::RecommendationUnavailable { fallback_genre, .. } => (
                StatusCode::SERVICE_UNAVAILABLE,
                json!({
                    "error": format!(
                        "Network issue. Let's watch something '{}' instead!",
                        fallback_genre
                    ),
                    "fallback_genre": fallback_genre,
                }),
            ),
            AppError::ExternalApi(msg) | AppError::ContentUnavailable(msg) => {
                (StatusCode::BAD_GATEWAY, json!({ "error": msg }))
            }
            AppError::HttpClient(_) => {
                (StatusCode::BAD_GATEWAY, json!({ "error": self.to_string() }))
            }
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": self.to_string() }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
