//! Data types shared by the market analysis pipeline

use serde::Serialize;
use serde_json::Value;

/// Outcome of one call to the generative-language API.
///
/// Built for every HTTP response, success or not; only transport failures
/// are reported as errors instead.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamResult {
    /// Whether the HTTP status was 2xx
    pub ok: bool,
    pub status: u16,
    pub raw_text: String,
    /// Best-effort parse of `raw_text`
    pub parsed_json: Option<Value>,
    /// Google error message if the body carried one, otherwise the raw body
    pub details: String,
}

/// A keyword as the model produced it, before validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RawKeyword {
    /// `{ "ko": ..., "local": ... }` (or `korean` / `native`)
    Structured { ko: String, local: String },
    /// Already formatted as `"<ko> (<local>)"`
    Formatted { text: String },
}

/// Parsed but not yet normalized analysis
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisPayload {
    pub keywords: Vec<RawKeyword>,
    pub platforms: Vec<String>,
    pub strategy: String,
}
