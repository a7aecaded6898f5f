//! Market Analyzer
//!
//! HTTP service behind the marketing site's "analyze market" feature.

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

rust_i18n::i18n!("locales", fallback = "en");

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

#[cfg(test)]
mod tests;

use config::Config;
use handlers::analyze;
use services::market::{
    AnalyzerSettings, GeminiClient, GenerativeApi, MarketAnalysisService, ModelCache, ModelSelector,
};

/// Shared state of the HTTP handlers
pub struct AppState {
    pub analysis_service: Arc<MarketAnalysisService>,
}

impl AppState {
    pub fn new(analysis_service: MarketAnalysisService) -> Self {
        Self { analysis_service: Arc::new(analysis_service) }
    }

    /// Wire the production Gemini client from configuration
    pub fn from_config(config: &Config) -> Self {
        let api: Arc<dyn GenerativeApi> = Arc::new(GeminiClient::new(&config.gemini));
        Self::with_api(config, api)
    }

    pub fn with_api(config: &Config, api: Arc<dyn GenerativeApi>) -> Self {
        let cache = ModelCache::new(Duration::from_secs(config.gemini.model_cache_ttl_secs));
        let selector = ModelSelector::new(cache, config.gemini.fallback_model.clone());
        let settings = AnalyzerSettings {
            api_key: config.gemini.api_key.clone(),
            forced_model: config.gemini.model.clone(),
        };
        Self::new(MarketAnalysisService::new(api, selector, settings))
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(analyze::analyze, analyze::health),
    components(schemas(
        models::AnalysisRequest,
        models::AnalysisResponse,
        models::ResponseMeta
    )),
    tags(
        (name = "Analysis", description = "Market analysis through Gemini"),
        (name = "Health", description = "Liveness")
    )
)]
pub struct ApiDoc;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(analyze::health).fallback(analyze::not_found))
        .route("/analyze", post(analyze::analyze).fallback(analyze::method_not_allowed))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .fallback(analyze::not_found)
        .with_state(state)
        .layer(axum::middleware::from_fn(middleware::locale_middleware))
        .layer(axum::middleware::from_fn(middleware::cors_middleware))
        .layer(TraceLayer::new_for_http())
}
