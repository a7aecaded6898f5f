//! Market Analysis Module
//!
//! Proxies the "analyze market" feature to the Gemini API and turns the
//! model's answer into a fixed bilingual keyword schema.
//!
//! # Architecture
//! ```text
//! ┌──────────────────────────┐
//! │  MarketAnalysisService   │  ← validate / generate / repair / fallback
//! └────────────┬─────────────┘
//!      ┌───────┼──────────┬─────────────┐
//!      ▼       ▼          ▼             ▼
//! ┌────────┐┌────────┐┌─────────┐┌──────────┐
//! │ Model  ││ Prompt ││ Payload ││ Keywords │
//! │Selector││Builder ││ Parser  ││+Fallback │
//! └───┬────┘└────────┘└─────────┘└──────────┘
//!     ▼
//! ┌──────────────┐
//! │GenerativeApi │  ← Trait (GeminiClient in production)
//! └──────────────┘
//! ```

mod client;
mod country;
mod fallback;
mod keywords;
mod model_selector;
mod models;
mod payload;
mod prompt;
mod service;

pub use client::{
    GeminiClient, GenerativeApi, extract_google_error_message, extract_retry_after_secs,
};
pub use country::{CountryBucket, expected_local_language};
pub use fallback::fallback_for;
pub use keywords::{is_compliant, local_language_valid, normalize_keywords};
pub use model_selector::{
    Clock, DEFAULT_FALLBACK_MODEL, ModelCache, ModelSelector, choose_model, generation_candidates,
    system_clock,
};
pub use models::{AnalysisPayload, RawKeyword, UpstreamResult};
pub use payload::{NotFound, extract_json_object, normalize_list, parse_payload};
pub use prompt::{build_primary_prompt, build_repair_prompt};
pub use service::{ANALYZER_VERSION, AnalyzerSettings, MarketAnalysisService};
