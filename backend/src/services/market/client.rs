//! Gemini generative-language API client
//!
//! Responses are never treated as errors by status: every HTTP answer is
//! turned into an [`UpstreamResult`] and the caller decides. Only transport
//! failures surface as `Err`.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

use super::models::UpstreamResult;
use crate::config::GeminiConfig;
use crate::utils::ApiResult;

static RETRY_IN_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)retry in\s+([0-9]+(?:\.[0-9]+)?)\s*s\b").unwrap());
static RETRY_DELAY_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""retryDelay"\s*:\s*"([0-9]+(?:\.[0-9]+)?)s""#).unwrap());

/// Generative-language API operations used by the analysis pipeline
#[async_trait]
pub trait GenerativeApi: Send + Sync {
    /// GET the model catalogue
    async fn list_models(&self, api_key: &str) -> ApiResult<UpstreamResult>;

    /// Single-shot generation asking for a JSON response
    async fn generate(
        &self,
        api_key: &str,
        model: &str,
        prompt: &str,
        temperature: f32,
    ) -> ApiResult<UpstreamResult>;
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "responseMimeType")]
    response_mime_type: &'static str,
}

pub struct GeminiClient {
    http_client: Client,
    api_base: String,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig) -> Self {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();

        Self { http_client, api_base: config.api_base.trim_end_matches('/').to_string() }
    }

    pub fn models_url(&self) -> String {
        format!("{}/models", self.api_base)
    }

    pub fn generate_url(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.api_base, urlencoding::encode(model))
    }

    async fn into_result(response: reqwest::Response) -> UpstreamResult {
        let status = response.status();
        let raw_text = response.text().await.unwrap_or_default();
        let details = extract_google_error_message(&raw_text).unwrap_or_else(|| raw_text.clone());
        let parsed_json = serde_json::from_str::<Value>(&raw_text).ok();

        UpstreamResult {
            ok: status.is_success(),
            status: status.as_u16(),
            raw_text,
            parsed_json,
            details,
        }
    }
}

#[async_trait]
impl GenerativeApi for GeminiClient {
    async fn list_models(&self, api_key: &str) -> ApiResult<UpstreamResult> {
        tracing::debug!("Listing Gemini models");

        let response = self
            .http_client
            .get(self.models_url())
            .query(&[("key", api_key)])
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Model listing request failed: {}", e);
                e
            })?;

        Ok(Self::into_result(response).await)
    }

    async fn generate(
        &self,
        api_key: &str,
        model: &str,
        prompt: &str,
        temperature: f32,
    ) -> ApiResult<UpstreamResult> {
        tracing::debug!("Calling {} at temperature {}", model, temperature);

        let body = GenerateRequest {
            contents: vec![Content { parts: vec![Part { text: prompt }] }],
            generation_config: GenerationConfig {
                temperature,
                response_mime_type: "application/json",
            },
        };

        let response = self
            .http_client
            .post(self.generate_url(model))
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Generation request to {} failed: {}", model, e);
                e
            })?;

        let result = Self::into_result(response).await;
        if !result.ok {
            tracing::warn!("Gemini returned status {} for {}", result.status, model);
        }
        Ok(result)
    }
}

/// `error.message` of a Google API error envelope
pub fn extract_google_error_message(raw: &str) -> Option<String> {
    let value: Value = serde_json::from_str(raw).ok()?;
    value
        .pointer("/error/message")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

/// Seconds to wait before retrying, from a quota error text.
///
/// Understands `Please retry in 37.5s.` and `"retryDelay": "37s"`;
/// fractional seconds are rounded up.
pub fn extract_retry_after_secs(details: &str) -> Option<u64> {
    let caps = RETRY_IN_REGEX
        .captures(details)
        .or_else(|| RETRY_DELAY_REGEX.captures(details))?;
    let secs: f64 = caps[1].parse().ok()?;
    Some(secs.ceil() as u64)
}
