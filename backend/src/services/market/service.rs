//! Market analysis pipeline
//!
//! `select_model → generate_primary → repair_if_needed → fallback_if_needed`
//!
//! Only a failed primary generation aborts the request. The repair pass is
//! best-effort and the fallback table is consulted last.

use std::sync::Arc;
use tracing::Instrument;

use super::client::GenerativeApi;
use super::country::expected_local_language;
use super::fallback::fallback_for;
use super::keywords::{is_compliant, normalize_keywords};
use super::model_selector::ModelSelector;
use super::payload::parse_payload;
use super::prompt::{build_primary_prompt, build_repair_prompt};
use crate::models::{AnalysisRequest, AnalysisResponse, ResponseMeta};
use crate::utils::{ApiError, ApiResult};

pub const ANALYZER_VERSION: &str = "2026-02-19-bilingual-v4";

pub const PRIMARY_TEMPERATURE: f32 = 0.2;
pub const REPAIR_TEMPERATURE: f32 = 0.1;
pub const MAX_KEYWORDS: usize = 10;
pub const MAX_PLATFORMS: usize = 10;

/// Credentials and model override, read from configuration
#[derive(Clone, Default)]
pub struct AnalyzerSettings {
    pub api_key: Option<String>,
    pub forced_model: Option<String>,
}

impl AnalyzerSettings {
    fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }

    fn forced_model(&self) -> Option<&str> {
        self.forced_model.as_deref().map(str::trim).filter(|m| !m.is_empty())
    }
}

pub struct MarketAnalysisService {
    api: Arc<dyn GenerativeApi>,
    selector: ModelSelector,
    settings: AnalyzerSettings,
}

impl MarketAnalysisService {
    pub fn new(api: Arc<dyn GenerativeApi>, selector: ModelSelector, settings: AnalyzerSettings) -> Self {
        Self { api, selector, settings }
    }

    pub async fn analyze(&self, req: &AnalysisRequest) -> ApiResult<AnalysisResponse> {
        let analysis_id = uuid::Uuid::new_v4();
        let span = tracing::info_span!("analysis", id = %analysis_id, country = %req.country);
        self.run(req).instrument(span).await
    }

    async fn run(&self, req: &AnalysisRequest) -> ApiResult<AnalysisResponse> {
        let api_key = self.settings.api_key().ok_or_else(|| {
            tracing::error!("GEMINI_API_KEY is not configured");
            ApiError::MissingCredential
        })?;

        let forced = self.settings.forced_model();
        let model = self
            .selector
            .select(self.api.as_ref(), api_key, forced)
            .await
            .ok_or(ApiError::NoModelAvailable)?;

        // Primary generation
        let prompt = build_primary_prompt(&req.product, &req.country);
        let first = self.api.generate(api_key, &model, &prompt, PRIMARY_TEMPERATURE).await?;
        if !first.ok {
            return Err(ApiError::upstream_call(first.status, model, first.details));
        }

        let payload = parse_payload(&first.raw_text, first.parsed_json.as_ref());
        let mut keywords = normalize_keywords(&payload.keywords, &req.country);
        let platforms: Vec<String> = payload.platforms.into_iter().take(MAX_PLATFORMS).collect();
        let strategy = payload.strategy.trim().to_string();

        // Repair pass
        if !is_compliant(&keywords, &req.country) {
            tracing::info!("Keywords not bilingual ({} usable), requesting repair", keywords.len());
            if let Some(repaired) = self.repair(api_key, &model, &keywords, &req.country).await {
                keywords = repaired;
            }
        }

        // Fallback table
        if !is_compliant(&keywords, &req.country) {
            let fallback = fallback_for(&req.product, &req.country);
            if !fallback.is_empty() {
                tracing::info!("Using curated keywords for {}", req.product);
                keywords = fallback;
            }
        }

        let complete = is_compliant(&keywords, &req.country);
        keywords.truncate(MAX_KEYWORDS);

        tracing::info!(
            "Analysis finished with {} keywords, {} platforms (bilingual: {})",
            keywords.len(),
            platforms.len(),
            complete
        );

        Ok(AnalysisResponse {
            keywords,
            platforms,
            strategy,
            meta: ResponseMeta {
                model_used: model,
                forced_model: forced.is_some(),
                worker_version: ANALYZER_VERSION.to_string(),
                keyword_bilingual_complete: complete,
                keyword_local_language: expected_local_language(&req.country).to_string(),
            },
        })
    }

    /// One repair attempt; `None` when it failed or produced nothing usable
    async fn repair(
        &self,
        api_key: &str,
        model: &str,
        keywords: &[String],
        country: &str,
    ) -> Option<Vec<String>> {
        let prompt = build_repair_prompt(keywords, country);
        let result = match self.api.generate(api_key, model, &prompt, REPAIR_TEMPERATURE).await {
            Ok(result) if result.ok => result,
            Ok(result) => {
                tracing::warn!("Repair pass returned status {}, keeping keywords", result.status);
                return None;
            },
            Err(e) => {
                tracing::warn!("Repair pass failed: {}, keeping keywords", e);
                return None;
            },
        };

        let payload = parse_payload(&result.raw_text, result.parsed_json.as_ref());
        let repaired = normalize_keywords(&payload.keywords, country);
        if repaired.is_empty() { None } else { Some(repaired) }
    }
}
