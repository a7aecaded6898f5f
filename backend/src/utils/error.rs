use axum::{
    Json,
    http::{HeaderValue, StatusCode, header::RETRY_AFTER},
    response::{IntoResponse, Response},
};
use rust_i18n::t;
use serde::Serialize;
use thiserror::Error;

use super::i18n::get_locale;
use crate::services::market::extract_retry_after_secs;

/// API Error returned by every handler
///
/// Each variant maps to exactly one HTTP status; variants carrying upstream
/// context expose it in the JSON body so the front-end can show it.
#[derive(Error, Debug)]
pub enum ApiError {
    // Request errors 4xx
    #[error("Missing product or country")]
    MissingFields,

    #[error("Input too long")]
    InputTooLong,

    #[error("Not Found")]
    NotFound,

    #[error("Method Not Allowed")]
    MethodNotAllowed,

    // Configuration errors
    #[error("Missing GEMINI_API_KEY")]
    MissingCredential,

    // Upstream errors
    #[error("No available model for generateContent")]
    NoModelAvailable,

    #[error("Gemini API error (status {status}, model {model}): {details}")]
    UpstreamCall { status: u16, model: String, details: String },

    // System errors
    #[error("Server error: {0}")]
    Internal(String),

    // Generic wrapper for other errors - auto-convert from anyhow::Error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// Helper to create internal error
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Helper to create upstream call error
    pub fn upstream_call(status: u16, model: impl Into<String>, details: impl Into<String>) -> Self {
        Self::UpstreamCall { status, model: model.into(), details: details.into() }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingFields | Self::InputTooLong => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::NoModelAvailable | Self::UpstreamCall { .. } => StatusCode::BAD_GATEWAY,
            Self::MissingCredential | Self::Internal(_) | Self::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            },
        }
    }

    /// Get localized error message based on current locale
    pub fn localized_message(&self) -> String {
        let locale = get_locale();
        match self {
            Self::MissingFields => t!("request.missing_fields", locale = &locale).to_string(),
            Self::InputTooLong => t!("request.input_too_long", locale = &locale).to_string(),
            Self::NotFound => t!("request.not_found", locale = &locale).to_string(),
            Self::MethodNotAllowed => {
                t!("request.method_not_allowed", locale = &locale).to_string()
            },
            Self::MissingCredential => {
                t!("config.missing_credential", locale = &locale).to_string()
            },
            Self::NoModelAvailable => t!("upstream.no_model", locale = &locale).to_string(),
            Self::UpstreamCall { .. } => t!("upstream.call_failed", locale = &locale).to_string(),
            Self::Internal(_) | Self::Other(_) => {
                t!("internal.server_error", locale = &locale).to_string()
            },
        }
    }

    fn hint(&self, retry_after: Option<u64>) -> Option<String> {
        let locale = get_locale();
        match self {
            Self::NoModelAvailable => Some(t!("upstream.no_model_hint", locale = &locale).to_string()),
            Self::UpstreamCall { .. } => Some(match retry_after {
                Some(seconds) => {
                    t!("upstream.retry_after_hint", locale = &locale, seconds = seconds).to_string()
                },
                None => t!("upstream.call_failed_hint", locale = &locale).to_string(),
            }),
            _ => None,
        }
    }
}

/// JSON error body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_seconds: Option<u64>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.localized_message();

        // Routing errors answer in plain text
        if matches!(self, Self::NotFound | Self::MethodNotAllowed) {
            return (status, message).into_response();
        }

        let retry_after = match &self {
            Self::UpstreamCall { details, .. } => extract_retry_after_secs(details),
            _ => None,
        };

        let mut body = ApiErrorResponse {
            error: message,
            status: None,
            model: None,
            details: None,
            hint: self.hint(retry_after),
            retry_after_seconds: retry_after,
        };

        match self {
            Self::UpstreamCall { status, model, details } => {
                tracing::warn!("Upstream generation failed with status {} on {}", status, model);
                body.status = Some(status);
                body.model = Some(model);
                body.details = Some(details);
            },
            Self::Internal(details) => {
                tracing::error!("Server error: {}", details);
                body.details = Some(details);
            },
            Self::Other(err) => {
                tracing::error!("Server error: {:#}", err);
                body.details = Some(err.to_string());
            },
            _ => {},
        }

        let mut response = (status, Json(body)).into_response();
        if let Some(seconds) = retry_after
            && let Ok(value) = HeaderValue::from_str(&seconds.to_string())
        {
            response.headers_mut().insert(RETRY_AFTER, value);
        }
        response
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::internal_error(format!("Upstream request failed: {}", err))
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
