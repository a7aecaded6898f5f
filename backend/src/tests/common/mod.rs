// Common test utilities and helpers

use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::AppState;
use crate::services::market::{
    AnalyzerSettings, Clock, DEFAULT_FALLBACK_MODEL, GenerativeApi, MarketAnalysisService,
    ModelCache, ModelSelector, UpstreamResult,
};
use crate::utils::ApiResult;

/// Scripted upstream: answers are popped in call order, and every call is recorded
#[derive(Default)]
pub struct ScriptedApi {
    listing: Mutex<VecDeque<ApiResult<UpstreamResult>>>,
    generations: Mutex<VecDeque<ApiResult<UpstreamResult>>>,
    list_calls: AtomicUsize,
    prompts: Mutex<Vec<(String, String, f32)>>,
}

impl ScriptedApi {
    pub fn with_generations(answers: Vec<ApiResult<UpstreamResult>>) -> Self {
        Self { generations: Mutex::new(answers.into()), ..Self::default() }
    }

    pub fn push_listing(&self, answer: ApiResult<UpstreamResult>) {
        self.listing.lock().unwrap().push_back(answer);
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// (model, prompt, temperature) of every generation call
    pub fn generate_calls(&self) -> Vec<(String, String, f32)> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn total_calls(&self) -> usize {
        self.list_calls() + self.generate_calls().len()
    }
}

#[async_trait]
impl GenerativeApi for ScriptedApi {
    async fn list_models(&self, _api_key: &str) -> ApiResult<UpstreamResult> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.listing
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(status_only(500, "no listing scripted")))
    }

    async fn generate(
        &self,
        _api_key: &str,
        model: &str,
        prompt: &str,
        temperature: f32,
    ) -> ApiResult<UpstreamResult> {
        self.prompts
            .lock()
            .unwrap()
            .push((model.to_string(), prompt.to_string(), temperature));
        self.generations
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(status_only(500, "no generation scripted")))
    }
}

fn json_result(body: Value) -> UpstreamResult {
    UpstreamResult {
        ok: true,
        status: 200,
        raw_text: body.to_string(),
        parsed_json: Some(body.clone()),
        details: body.to_string(),
    }
}

/// Successful Gemini answer whose candidate text is `payload` serialized
pub fn gemini_ok(payload: Value) -> UpstreamResult {
    gemini_text(&payload.to_string())
}

/// Successful Gemini answer whose candidate text is `text`
pub fn gemini_text(text: &str) -> UpstreamResult {
    json_result(json!({
        "candidates": [{ "content": { "parts": [{ "text": text }] } }]
    }))
}

/// Successful model listing with generation support for every name
pub fn listing_ok(names: &[&str]) -> UpstreamResult {
    let models: Vec<Value> = names
        .iter()
        .map(|n| {
            json!({ "name": format!("models/{}", n), "supportedGenerationMethods": ["generateContent"] })
        })
        .collect();
    json_result(json!({ "models": models }))
}

/// Non-success answer with a plain-text body
pub fn status_only(status: u16, details: &str) -> UpstreamResult {
    UpstreamResult {
        ok: false,
        status,
        raw_text: details.to_string(),
        parsed_json: None,
        details: details.to_string(),
    }
}

pub fn keyed() -> AnalyzerSettings {
    AnalyzerSettings { api_key: Some("test-key".to_string()), forced_model: None }
}

pub fn forced(model: &str) -> AnalyzerSettings {
    AnalyzerSettings { api_key: Some("test-key".to_string()), forced_model: Some(model.to_string()) }
}

/// Service over `api` with a frozen clock and a 30 minute model cache
pub fn build_service_with_fallback(
    api: Arc<ScriptedApi>,
    settings: AnalyzerSettings,
    fallback_model: &str,
) -> MarketAnalysisService {
    let clock_ms = Arc::new(AtomicI64::new(0));
    let clock: Clock = Arc::new(move || clock_ms.load(Ordering::SeqCst));
    let cache = ModelCache::with_clock(Duration::from_secs(30 * 60), clock);
    MarketAnalysisService::new(api, ModelSelector::new(cache, fallback_model), settings)
}

pub fn build_service(api: Arc<ScriptedApi>, settings: AnalyzerSettings) -> MarketAnalysisService {
    build_service_with_fallback(api, settings, DEFAULT_FALLBACK_MODEL)
}

pub fn build_state(api: Arc<ScriptedApi>, settings: AnalyzerSettings) -> Arc<AppState> {
    Arc::new(AppState::new(build_service(api, settings)))
}
