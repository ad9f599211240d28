use std::time::Duration;

use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Gemini API key; an empty key makes every AI call fall back
    #[serde(default)]
    pub gemini_api_key: String,

    /// Gemini REST API base URL
    #[serde(default = "default_gemini_api_url")]
    pub gemini_api_url: String,

    /// Model used for recommendations and extras
    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Number of intermediate frames shown before the final pick
    #[serde(default = "default_reveal_steps")]
    pub reveal_steps: u32,

    /// Delay between reveal frames, in milliseconds
    #[serde(default = "default_reveal_interval_ms")]
    pub reveal_interval_ms: u64,

    /// How long a quote or trivia answer stays fresh, in seconds
    #[serde(default = "default_extra_cache_ttl_secs")]
    pub extra_cache_ttl_secs: u64,

    /// Maximum number of cached quote/trivia answers
    #[serde(default = "default_extra_cache_capacity")]
    pub extra_cache_capacity: usize,

    /// Genre suggested when the AI recommendation fails
    #[serde(default = "default_fallback_genre")]
    pub fallback_genre: String,

    /// Optional JSON catalog replacing the built-in one
    #[serde(default)]
    pub catalog_path: Option<String>,
}

fn default_gemini_api_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_gemini_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_reveal_steps() -> u32 {
    12
}

fn default_reveal_interval_ms() -> u64 {
    80
}

fn default_extra_cache_ttl_secs() -> u64 {
    300
}

fn default_extra_cache_capacity() -> usize {
    50
}

fn default_fallback_genre() -> String {
    "Feel Good".to_string()
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn reveal_interval(&self) -> Duration {
        Duration::from_millis(self.reveal_interval_ms)
    }

    pub fn extra_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.extra_cache_ttl_secs)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
