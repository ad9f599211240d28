use std::sync::Arc;

use rand::{rngs::StdRng, SeedableRng};

use crate::{
    config::Config,
    error::AppResult,
    services::{
        providers::GeminiProvider, CatalogProvider, ExtraContentCache, SelectionController,
        SelectionSettings, StaticCatalog, SystemClock,
    },
};

/// Shared application state
///
/// There is exactly one selection per running app, so the controller is shared
/// by every request.
#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<SelectionController>,
    pub catalog: Arc<dyn CatalogProvider>,
}

impl AppState {
    pub fn new(controller: Arc<SelectionController>, catalog: Arc<dyn CatalogProvider>) -> Self {
        Self {
            controller,
            catalog,
        }
    }

    /// Wires the catalog, Gemini provider, extra cache and controller from config
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let catalog: Arc<dyn CatalogProvider> = match &config.catalog_path {
            Some(path) => Arc::new(StaticCatalog::from_path(path)?),
            None => Arc::new(StaticCatalog::builtin()),
        };

        if config.gemini_api_key.is_empty() {
            tracing::warn!("GEMINI_API_KEY is not set; mood picks and extras will fall back");
        }

        let gemini = Arc::new(GeminiProvider::new(
            config.gemini_api_key.clone(),
            config.gemini_api_url.clone(),
            config.gemini_model.clone(),
        ));

        let extras = Arc::new(ExtraContentCache::new(
            gemini.clone(),
            Arc::new(SystemClock),
            config.extra_cache_ttl(),
            config.extra_cache_capacity,
        ));

        let controller = Arc::new(SelectionController::new(
            catalog.clone(),
            gemini,
            extras,
            SelectionSettings {
                reveal_steps: config.reveal_steps,
                reveal_interval: config.reveal_interval(),
                fallback_genre: config.fallback_genre.clone(),
            },
            StdRng::from_entropy(),
        ));

        Ok(Self::new(controller, catalog))
    }
}
