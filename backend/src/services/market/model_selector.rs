//! Generation model selection with a time-bounded cache
//!
//! A forced model from configuration always wins. Otherwise the model list
//! of the API key's project is fetched at most once per TTL window and the
//! best candidate is picked by a fixed preference order.

use serde_json::Value;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use super::client::GenerativeApi;

/// Most preferred first
pub const PREFERRED_MODELS: &[&str] = &[
    "gemini-1.5-flash",
    "gemini-1.5-flash-002",
    "gemini-1.5-flash-001",
    "gemini-1.5-flash-8b",
    "gemini-1.5-pro",
    "gemini-1.5-pro-002",
    "gemini-1.5-pro-001",
    "gemini-1.0-pro",
    "gemini-pro",
];

pub const DEFAULT_FALLBACK_MODEL: &str = "gemini-1.5-flash";

const MODEL_RESOURCE_PREFIX: &str = "models/";
const GENERATE_METHOD: &str = "generateContent";
const NEWEST_FAMILY_PREFIX: &str = "gemini-2.0";

/// Epoch milliseconds
pub type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

pub fn system_clock() -> Clock {
    Arc::new(|| chrono::Utc::now().timestamp_millis())
}

#[derive(Debug, Clone)]
struct CachedModel {
    name: String,
    cached_at_ms: i64,
}

/// Last selected model name, valid for one TTL window.
///
/// Concurrent writers are last-write-wins; a stale read only costs an extra
/// list-models call.
pub struct ModelCache {
    entry: RwLock<Option<CachedModel>>,
    ttl: Duration,
    clock: Clock,
}

impl ModelCache {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, system_clock())
    }

    pub fn with_clock(ttl: Duration, clock: Clock) -> Self {
        Self { entry: RwLock::new(None), ttl, clock }
    }

    pub fn now_ms(&self) -> i64 {
        (self.clock)()
    }

    /// Cached name, if younger than the TTL
    pub fn get(&self) -> Option<String> {
        let now = self.now_ms();
        let ttl_ms = i64::try_from(self.ttl.as_millis()).unwrap_or(i64::MAX);

        let guard = self.entry.read().ok()?;
        guard
            .as_ref()
            .filter(|cached| now - cached.cached_at_ms < ttl_ms)
            .map(|cached| cached.name.clone())
    }

    pub fn set(&self, name: impl Into<String>, cached_at_ms: i64) {
        if let Ok(mut guard) = self.entry.write() {
            *guard = Some(CachedModel { name: name.into(), cached_at_ms });
        }
    }
}

/// Model identifiers (prefix stripped) that support single-shot generation
pub fn generation_candidates(models_response: &Value) -> Vec<String> {
    models_response
        .get("models")
        .and_then(Value::as_array)
        .map(|models| {
            models
                .iter()
                .filter(|m| {
                    m.get("supportedGenerationMethods")
                        .and_then(Value::as_array)
                        .is_some_and(|methods| {
                            methods.iter().any(|x| x.as_str() == Some(GENERATE_METHOD))
                        })
                })
                .filter_map(|m| m.get("name").and_then(Value::as_str))
                .filter_map(|name| name.strip_prefix(MODEL_RESOURCE_PREFIX))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Pick the preferred model among `candidates`
pub fn choose_model(candidates: &[String]) -> Option<String> {
    PREFERRED_MODELS
        .iter()
        .find(|preferred| candidates.iter().any(|c| c == *preferred))
        .map(|p| p.to_string())
        .or_else(|| candidates.iter().find(|c| c.contains("1.5") && c.contains("flash")).cloned())
        .or_else(|| candidates.iter().find(|c| !c.starts_with(NEWEST_FAMILY_PREFIX)).cloned())
        .or_else(|| candidates.first().cloned())
}

pub struct ModelSelector {
    cache: ModelCache,
    fallback_model: String,
}

impl ModelSelector {
    pub fn new(cache: ModelCache, fallback_model: impl Into<String>) -> Self {
        Self { cache, fallback_model: fallback_model.into() }
    }

    fn fallback(&self) -> Option<String> {
        let name = self.fallback_model.trim();
        if name.is_empty() { None } else { Some(name.to_string()) }
    }

    /// Model to use for this request.
    ///
    /// `None` means no model name could be produced at all.
    pub async fn select(
        &self,
        api: &dyn GenerativeApi,
        api_key: &str,
        forced: Option<&str>,
    ) -> Option<String> {
        if let Some(forced) = forced.map(str::trim).filter(|f| !f.is_empty()) {
            return Some(forced.to_string());
        }

        if let Some(cached) = self.cache.get() {
            tracing::debug!("Using cached model {}", cached);
            return Some(cached);
        }

        let now = self.cache.now_ms();
        let listing = match api.list_models(api_key).await {
            Ok(result) if result.ok => result,
            Ok(result) => {
                tracing::warn!(
                    "Model listing returned status {}, using fallback model",
                    result.status
                );
                return self.fallback();
            },
            Err(e) => {
                tracing::warn!("Model listing failed: {}, using fallback model", e);
                return self.fallback();
            },
        };

        let candidates = listing
            .parsed_json
            .as_ref()
            .map(generation_candidates)
            .unwrap_or_default();
        if candidates.is_empty() {
            tracing::warn!("No model supports {}, using fallback model", GENERATE_METHOD);
            return self.fallback();
        }

        let chosen = choose_model(&candidates).or_else(|| self.fallback())?;
        tracing::info!("Selected model {} from {} candidates", chosen, candidates.len());
        self.cache.set(chosen.clone(), now);
        Some(chosen)
    }
}
