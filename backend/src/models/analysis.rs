use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use validator::Validate;

use crate::utils::json::scalar_text;
use crate::utils::{ApiError, ApiResult};

pub const MAX_PRODUCT_CHARS: u64 = 120;
pub const MAX_COUNTRY_CHARS: u64 = 60;

/// Market analysis request body
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, Validate, PartialEq, Eq)]
pub struct AnalysisRequest {
    /// Product name, as typed by the visitor
    #[validate(length(max = MAX_PRODUCT_CHARS))]
    pub product: String,
    /// Target country, in English or Korean
    #[validate(length(max = MAX_COUNTRY_CHARS))]
    pub country: String,
}

impl AnalysisRequest {
    /// Build a request from a raw body.
    ///
    /// The body is read leniently: invalid JSON counts as an empty object and
    /// scalar fields are taken in their text form. Fields are trimmed before
    /// validation.
    pub fn from_body(body: &[u8]) -> ApiResult<Self> {
        let value: Value = serde_json::from_slice(body).unwrap_or(Value::Null);
        let field = |name: &str| {
            value
                .get(name)
                .and_then(scalar_text)
                .map(|s| s.trim().to_string())
                .unwrap_or_default()
        };

        let req = Self { product: field("product"), country: field("country") };

        if req.product.is_empty() || req.country.is_empty() {
            return Err(ApiError::MissingFields);
        }
        req.validate().map_err(|_| ApiError::InputTooLong)?;

        Ok(req)
    }
}

/// Observability block attached to every analysis response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMeta {
    pub model_used: String,
    pub forced_model: bool,
    pub worker_version: String,
    pub keyword_bilingual_complete: bool,
    pub keyword_local_language: String,
}

/// Market analysis response returned to the front-end
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct AnalysisResponse {
    /// Up to 10 keywords of the form `"<Korean> (<local>)"`
    pub keywords: Vec<String>,
    /// Up to 10 sales platforms
    pub platforms: Vec<String>,
    /// One-sentence strategy, in Korean
    pub strategy: String,
    pub meta: ResponseMeta,
}
