/// Gemini provider
///
/// Calls the Gemini `generateContent` REST endpoint for both mood recommendations
/// and supplementary content.
///
/// API Flow:
/// 1. Recommendation: prompt + JSON response schema → one movie object
/// 2. Extras: plain prompt → free text (quote or trivia)
use crate::{
    error::{AppError, AppResult},
    models::{ContentKind, Movie},
    services::providers::{ContentProvider, RecommendationProvider},
};
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use serde_json::json;

const PROVIDER_NAME: &str = "gemini";

/// Returned when the model answers an extra request with no text
pub const EMPTY_CONTENT_TEXT: &str = "Could not retrieve info.";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<RequestContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
struct RequestPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateResponse {
    /// Text of the first candidate, parts joined; `None` when the model said nothing
    fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();

        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

/// Shape the model must return for a mood recommendation
#[derive(Debug, Deserialize)]
struct AiRecommendation {
    title: String,
    year: String,
    desc: String,
    emoji: String,
    reason: String,
}

#[derive(Clone)]
pub struct GeminiProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    model: String,
}

impl GeminiProvider {
    pub fn new(api_key: String, api_url: String, model: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url,
            model,
        }
    }

    /// Sends one prompt and returns the model's text, if any
    async fn generate(
        &self,
        prompt: String,
        generation_config: Option<GenerationConfig>,
    ) -> AppResult<Option<String>> {
        if self.api_key.is_empty() {
            return Err(AppError::ExternalApi(
                "Gemini API key is not configured".to_string(),
            ));
        }

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_url.trim_end_matches('/'),
            self.model
        );

        let request = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config,
        };

        let response = self
            .http_client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Gemini API returned status {}: {}",
                status, body
            )));
        }

        let response_text = response.text().await?;
        let generated: GenerateResponse = serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                response = %response_text,
                "Failed to deserialize Gemini response"
            );
            AppError::ExternalApi(format!("Failed to parse Gemini response: {}", e))
        })?;

        Ok(generated.text())
    }
}

/// Builds the mood prompt sent to the model
pub fn build_mood_prompt(mood: &str) -> String {
    format!(
        "You are a movie recommendation expert specializing in Indian Cinema \
         (Bollywood, Tollywood, Kollywood, Mollywood, etc). I am feeling: \"{}\". \
         Recommend ONE INDIAN movie that fits this mood perfectly.",
        mood
    )
}

/// Builds the prompt for a quote or trivia fact
pub fn build_extra_prompt(title: &str, year: &str, kind: ContentKind) -> String {
    match kind {
        ContentKind::Quote => format!(
            "For the Indian movie \"{}\" ({}), give me one ICONIC dialogue. \
             Format: \"Dialogue in original language (or transliteration)\" - Character Name. \
             Then a brief English translation. Keep it under 2 sentences.",
            title, year
        ),
        ContentKind::Trivia => format!(
            "Tell me one fascinating, obscure behind-the-scenes fact about the Indian movie \
             \"{}\" ({}). Keep it under 2 sentences.",
            title, year
        ),
    }
}

fn recommendation_config() -> GenerationConfig {
    GenerationConfig {
        response_mime_type: "application/json".to_string(),
        response_schema: json!({
            "type": "OBJECT",
            "properties": {
                "title": { "type": "STRING" },
                "year": { "type": "STRING" },
                "desc": { "type": "STRING" },
                "emoji": { "type": "STRING" },
                "reason": { "type": "STRING" },
            },
            "required": ["title", "year", "desc", "emoji", "reason"],
        }),
    }
}

/// Parses the model's recommendation JSON, tolerating markdown code fences
pub fn parse_recommendation(text: &str) -> AppResult<Movie> {
    let text = text.trim();
    let text = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .unwrap_or(text);
    let text = text.strip_suffix("```").unwrap_or(text).trim();

    let pick: AiRecommendation = serde_json::from_str(text)
        .map_err(|e| AppError::ExternalApi(format!("Failed to parse recommendation: {}", e)))?;

    if pick.title.trim().is_empty() || pick.reason.trim().is_empty() {
        return Err(AppError::ExternalApi(
            "Recommendation is missing a title or reason".to_string(),
        ));
    }

    Ok(Movie::new(pick.title, pick.year, pick.desc, pick.emoji).with_reason(pick.reason))
}

#[async_trait::async_trait]
impl RecommendationProvider for GeminiProvider {
    async fn recommend(&self, mood: &str) -> AppResult<Movie> {
        let text = self
            .generate(build_mood_prompt(mood), Some(recommendation_config()))
            .await?
            .ok_or_else(|| AppError::ExternalApi("No response from AI".to_string()))?;

        let movie = parse_recommendation(&text)?;

        tracing::info!(
            title = %movie.title,
            year = %movie.year,
            provider = PROVIDER_NAME,
            "Mood recommendation received"
        );

        Ok(movie)
    }

    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }
}

#[async_trait::async_trait]
impl ContentProvider for GeminiProvider {
    async fn fetch_content(
        &self,
        title: &str,
        year: &str,
        kind: ContentKind,
    ) -> AppResult<String> {
        let text = self.generate(build_extra_prompt(title, year, kind), None).await?;

        tracing::debug!(
            title = %title,
            kind = %kind,
            empty = text.is_none(),
            provider = PROVIDER_NAME,
            "Extra content generated"
        );

        Ok(text.unwrap_or_else(|| EMPTY_CONTENT_TEXT.to_string()))
    }

    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }
}
